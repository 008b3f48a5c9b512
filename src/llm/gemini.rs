use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::{
    GenerationOutput, GenerationProvider, GenerationRequest, InlineImage, ProviderError,
};
use crate::utils::http::get_http_client;

const SAFETY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

#[derive(Debug, Clone)]
pub struct GeminiImageConfig {
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

#[derive(Debug, Clone)]
enum GeminiModality {
    ImageAndText(Option<GeminiImageConfig>),
    Text {
        temperature: f32,
        max_output_tokens: i32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
        #[serde(default)]
        thought: bool,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    #[allow(dead_code)]
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

/// A single Gemini model bound to one modality.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
    modality: GeminiModality,
    safety_threshold: &'static str,
    timeout: Duration,
}

fn safety_threshold(profile: &str) -> &'static str {
    match profile {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        "permissive" => "OFF",
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}', using standard defaults.",
                profile
            );
            "BLOCK_MEDIUM_AND_ABOVE"
        }
    }
}

fn build_safety_settings(threshold: &str) -> Vec<Value> {
    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
    ]
}

fn build_image_config(config: Option<&GeminiImageConfig>) -> Option<Value> {
    let config = config?;
    let mut map = Map::new();

    if let Some(aspect_ratio) = config.aspect_ratio.as_deref() {
        let trimmed = aspect_ratio.trim();
        if !trimmed.is_empty() {
            map.insert("aspectRatio".to_string(), json!(trimmed));
        }
    }

    if let Some(image_size) = config.image_size.as_deref() {
        let trimmed = image_size.trim();
        if !trimmed.is_empty() {
            map.insert("imageSize".to_string(), json!(trimmed));
        }
    }

    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_gemini_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let mut summarized_contents = Vec::new();
        for content in contents {
            let parts = content
                .get("parts")
                .and_then(|value| value.as_array())
                .map(|parts| {
                    parts
                        .iter()
                        .map(|part| {
                            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                                json!({ "text": truncate_for_log(text, 200) })
                            } else if let Some(inline_data) = part.get("inlineData") {
                                let mime_type = inline_data
                                    .get("mimeType")
                                    .and_then(|value| value.as_str())
                                    .unwrap_or("unknown");
                                let data_len = inline_data
                                    .get("data")
                                    .and_then(|value| value.as_str())
                                    .map(|value| value.len())
                                    .unwrap_or(0);
                                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
                            } else {
                                json!({ "unknownPart": true })
                            }
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            summarized_contents.push(json!({ "parts": parts }));
        }
        summary.insert("contents".to_string(), Value::Array(summarized_contents));
    }

    if let Some(config) = payload.get("generationConfig") {
        summary.insert("generationConfig".to_string(), config.clone());
    }

    if let Some(safety) = payload
        .get("safetySettings")
        .and_then(|value| value.as_array())
    {
        summary.insert("safetySettingsCount".to_string(), json!(safety.len()));
    }

    Value::Object(summary)
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn extract_output(response: GeminiResponse) -> Result<GenerationOutput, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(ProviderError::Blocked(format!("blockReason={reason}")));
    }

    let mut image = None;
    let mut text_parts = Vec::new();
    let mut safety_finish = None;

    for candidate in response.candidates.unwrap_or_default() {
        if let Some(reason) = candidate.finish_reason {
            if SAFETY_FINISH_REASONS.contains(&reason.as_str()) {
                safety_finish.get_or_insert(reason);
            }
        }
        let Some(parts) = candidate.content.and_then(|content| content.parts) else {
            continue;
        };
        for part in parts {
            match part {
                GeminiPart::Text { text, thought } => {
                    if !thought && !text.trim().is_empty() {
                        text_parts.push(text);
                    }
                }
                GeminiPart::InlineData { inline_data } => {
                    if image.is_none() && inline_data.mime_type.starts_with("image/") {
                        image = Some(InlineImage {
                            mime_type: inline_data.mime_type,
                            data: inline_data.data,
                        });
                    }
                }
                GeminiPart::Other(_) => {}
            }
        }
    }

    let output = GenerationOutput {
        image,
        text: if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join("\n"))
        },
    };

    if output.is_empty() {
        if let Some(reason) = safety_finish {
            return Err(ProviderError::Blocked(format!("finishReason={reason}")));
        }
    }

    Ok(output)
}

impl GeminiClient {
    fn new(config: &Config, model: &str, modality: GeminiModality) -> Self {
        GeminiClient {
            http: get_http_client().clone(),
            api_base: config.gemini_api_base.clone(),
            api_key: config.gemini_api_key.clone(),
            model: model.trim().to_string(),
            modality,
            safety_threshold: safety_threshold(&config.gemini_safety_settings),
            timeout: config.stage_timeout(),
        }
    }

    /// Client that asks for an edited image alongside optional text.
    pub fn image_model(
        config: &Config,
        model: &str,
        image_config: Option<GeminiImageConfig>,
    ) -> Self {
        Self::new(config, model, GeminiModality::ImageAndText(image_config))
    }

    /// Client that only asks for text.
    pub fn text_model(config: &Config, model: &str) -> Self {
        Self::new(
            config,
            model,
            GeminiModality::Text {
                temperature: config.gemini_temperature,
                max_output_tokens: config.gemini_max_output_tokens,
            },
        )
    }

    fn redact_api_key(&self, text: &str) -> String {
        if self.api_key.is_empty() {
            return text.to_string();
        }
        text.replace(&self.api_key, "[redacted]")
    }

    fn build_payload(&self, request: &GenerationRequest<'_>) -> Value {
        let generation_config = match &self.modality {
            GeminiModality::ImageAndText(image_config) => {
                let mut generation_config = json!({
                    "responseModalities": ["TEXT", "IMAGE"]
                });
                if let Some(image_config) = build_image_config(image_config.as_ref()) {
                    if let Some(config_object) = generation_config.as_object_mut() {
                        config_object.insert("imageConfig".to_string(), image_config);
                    }
                }
                generation_config
            }
            GeminiModality::Text {
                temperature,
                max_output_tokens,
            } => json!({
                "temperature": temperature,
                "maxOutputTokens": max_output_tokens,
            }),
        };

        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": request.prompt },
                    {
                        "inlineData": {
                            "mimeType": request.image.mime_type,
                            "data": request.image.data
                        }
                    }
                ]
            }],
            "generationConfig": generation_config,
            "safetySettings": build_safety_settings(self.safety_threshold),
        })
    }

    async fn call_api(&self, payload: Value) -> Result<GeminiResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload_summary = summarize_gemini_payload(&payload);
            debug!(target: "llm.gemini", model = %self.model, payload = %payload_summary);
        }

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                let err_text = self.redact_api_key(&err.to_string());
                warn!(
                    "Gemini request failed to send: {} (model={}, timeout={}, connect={})",
                    err_text,
                    self.model,
                    err.is_timeout(),
                    err.is_connect()
                );
                if err.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Request(err_text)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = self.redact_api_key(&body);
            let (message, body_summary) = summarize_error_body(&body);
            warn!(
                "Gemini API error: model={}, status={}, body={}",
                self.model, status, body_summary
            );
            let detail = message.unwrap_or(body_summary);
            return Err(ProviderError::Status { status, detail });
        }

        let body = response
            .text()
            .await
            .map_err(|err| ProviderError::Request(self.redact_api_key(&err.to_string())))?;
        let value = serde_json::from_str::<GeminiResponse>(&body)
            .map_err(|err| ProviderError::Decode(err.to_string()))?;
        Ok(value)
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationOutput, ProviderError> {
        let payload = self.build_payload(request);
        let response = self.call_api(payload).await?;
        let output = extract_output(response)?;
        debug!(
            target: "llm.gemini",
            model = %self.model,
            has_image = output.image.is_some(),
            text_len = output.text.as_ref().map(|text| text.len()).unwrap_or(0)
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImagePayload;

    fn test_config() -> Config {
        Config::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("secret-key".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn image() -> ImagePayload {
        ImagePayload {
            mime_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
            byte_len: 8,
        }
    }

    fn request(image: &ImagePayload) -> GenerationRequest<'_> {
        GenerationRequest {
            prompt: "Add path lights",
            image,
        }
    }

    fn parse(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn image_payload_requests_both_modalities_and_image_config() {
        let client = GeminiClient::image_model(
            &test_config(),
            "gemini-3-pro-image-preview",
            Some(GeminiImageConfig {
                aspect_ratio: Some("16:9".to_string()),
                image_size: Some(" ".to_string()),
            }),
        );
        let payload = client.build_payload(&request(&image()));

        assert_eq!(
            payload.pointer("/generationConfig/responseModalities"),
            Some(&json!(["TEXT", "IMAGE"]))
        );
        assert_eq!(
            payload.pointer("/generationConfig/imageConfig"),
            Some(&json!({ "aspectRatio": "16:9" }))
        );
        assert_eq!(
            payload.pointer("/contents/0/parts/0/text"),
            Some(&json!("Add path lights"))
        );
        assert_eq!(
            payload.pointer("/contents/0/parts/1/inlineData/mimeType"),
            Some(&json!("image/png"))
        );
        assert_eq!(
            payload.pointer("/safetySettings/0/threshold"),
            Some(&json!("BLOCK_MEDIUM_AND_ABOVE"))
        );
    }

    #[test]
    fn text_payload_has_no_response_modalities() {
        let client = GeminiClient::text_model(&test_config(), "gemini-2.5-flash");
        let payload = client.build_payload(&request(&image()));

        assert!(payload.pointer("/generationConfig/responseModalities").is_none());
        assert_eq!(
            payload.pointer("/generationConfig/maxOutputTokens"),
            Some(&json!(2048))
        );
    }

    #[test]
    fn extracts_first_image_and_joins_visible_text() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "planning the layout", "thought": true },
                    { "text": "Here is your home at night." },
                    { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                    { "inlineData": { "mimeType": "image/png", "data": "BBBB" } },
                    { "functionCall": { "name": "noop" } },
                    { "text": "Enjoy!" }
                ]},
                "finishReason": "STOP"
            }]
        }));

        let output = extract_output(response).unwrap();
        assert_eq!(
            output.image,
            Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string()
            })
        );
        assert_eq!(
            output.text.as_deref(),
            Some("Here is your home at night.\nEnjoy!")
        );
    }

    #[test]
    fn ignores_non_image_inline_data() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "audio/wav", "data": "AAAA" } }
            ]}}]
        }));
        assert!(extract_output(response).unwrap().is_empty());
    }

    #[test]
    fn prompt_block_reason_is_a_safety_error() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        let err = extract_output(response).unwrap_err();
        assert!(matches!(err, ProviderError::Blocked(_)));
        assert!(err.to_string().contains("safety"));
    }

    #[test]
    fn empty_safety_finish_is_a_safety_error() {
        let response = parse(json!({
            "candidates": [{ "finishReason": "IMAGE_SAFETY" }]
        }));
        assert!(matches!(
            extract_output(response),
            Err(ProviderError::Blocked(_))
        ));
    }

    #[test]
    fn empty_response_is_not_an_error() {
        let output = extract_output(parse(json!({}))).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn error_body_prefers_provider_message() {
        let (message, summary) = summarize_error_body(
            r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#,
        );
        assert_eq!(
            message.as_deref(),
            Some("Resource has been exhausted (e.g. check quota).")
        );
        assert!(summary.contains("RESOURCE_EXHAUSTED"));

        let (message, summary) = summarize_error_body("  ");
        assert!(message.is_none());
        assert_eq!(summary, "empty response body");
    }

    #[test]
    fn redacts_api_key_from_error_text() {
        let client = GeminiClient::text_model(&test_config(), "gemini-2.5-flash");
        assert_eq!(
            client.redact_api_key("bad key secret-key in url"),
            "bad key [redacted] in url"
        );
    }

    #[test]
    fn payload_summary_hides_image_bytes() {
        let client = GeminiClient::text_model(&test_config(), "gemini-2.5-flash");
        let summary = summarize_gemini_payload(&client.build_payload(&request(&image())));
        assert_eq!(
            summary.pointer("/contents/0/parts/1/inlineData/dataLen"),
            Some(&json!(12))
        );
        assert_eq!(summary.pointer("/safetySettingsCount"), Some(&json!(4)));
    }
}
