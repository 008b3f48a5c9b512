use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::llm::{
    GenerationOutput, GenerationProvider, GenerationRequest, ImagePayload, InlineImage,
    ProviderError,
};
use crate::visualizer::chain::FallbackChain;

pub const STAGE_MODELS: [&str; 3] = ["stage-a-model", "stage-b-model", "stage-c-model"];

#[derive(Debug, Clone, Copy)]
pub enum Script {
    Image(&'static str),
    ImageWithText(&'static str, &'static str),
    Text(&'static str),
    Empty,
    Fail(&'static str),
    Hang,
}

/// Records every provider call, in order, across all stages of a chain.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl CallLog {
    fn record(&self, model: &str, prompt: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
    }

    pub fn models(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }
}

pub struct ScriptedProvider {
    model: String,
    script: Script,
    log: CallLog,
}

fn png(data: &str) -> InlineImage {
    InlineImage {
        mime_type: "image/png".to_string(),
        data: data.to_string(),
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationOutput, ProviderError> {
        self.log.record(&self.model, request.prompt);
        match self.script {
            Script::Image(data) => Ok(GenerationOutput {
                image: Some(png(data)),
                text: None,
            }),
            Script::ImageWithText(data, text) => Ok(GenerationOutput {
                image: Some(png(data)),
                text: Some(text.to_string()),
            }),
            Script::Text(text) => Ok(GenerationOutput {
                image: None,
                text: Some(text.to_string()),
            }),
            Script::Empty => Ok(GenerationOutput::default()),
            Script::Fail(message) => Err(ProviderError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: message.to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(GenerationOutput::default())
            }
        }
    }
}

pub fn scripted_chain(scripts: [Script; 3], log: &CallLog) -> FallbackChain {
    let [a, b, c] = scripts;
    let provider = |model: &str, script: Script| -> Arc<dyn GenerationProvider> {
        Arc::new(ScriptedProvider {
            model: model.to_string(),
            script,
            log: log.clone(),
        })
    };
    FallbackChain::new(
        provider(STAGE_MODELS[0], a),
        provider(STAGE_MODELS[1], b),
        provider(STAGE_MODELS[2], c),
        Duration::from_millis(50),
    )
}

pub fn test_image() -> ImagePayload {
    ImagePayload {
        mime_type: "image/png".to_string(),
        data: "iVBORw0KGgo=".to_string(),
        byte_len: 8,
    }
}
