use serde::Deserialize;
use serde_json::Value;

use crate::llm::media::{decode_image_payload, MediaError};
use crate::llm::ImagePayload;
use crate::visualizer::styles::LightingStyle;
use crate::visualizer::VisualizeError;

/// Inbound body of `POST /api/visualize`. Fields are kept as loose JSON so
/// that missing or mistyped values surface as validation errors rather than
/// parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizeRequest {
    pub image: Option<Value>,
    pub style: Option<Value>,
    pub mime_type: Option<Value>,
}

fn as_text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub style: LightingStyle,
    pub image: ImagePayload,
}

impl VisualizeRequest {
    pub fn validate(&self, max_image_bytes: usize) -> Result<ValidatedRequest, VisualizeError> {
        let image = as_text(self.image.as_ref())
            .filter(|value| !value.trim().is_empty())
            .ok_or(VisualizeError::MissingImage)?;

        let style = match self.style.as_ref() {
            Some(Value::String(key)) => LightingStyle::from_key(key.trim())
                .ok_or_else(|| VisualizeError::InvalidStyle(key.trim().to_string()))?,
            Some(other) => return Err(VisualizeError::InvalidStyle(other.to_string())),
            None => return Err(VisualizeError::InvalidStyle(String::new())),
        };

        let declared_mime = as_text(self.mime_type.as_ref());
        let image = decode_image_payload(image, declared_mime, max_image_bytes)
            .map_err(|err| match err {
                MediaError::TooLarge { limit, .. } => VisualizeError::ImageTooLarge { limit },
                other => VisualizeError::InvalidImage(other),
            })?;

        Ok(ValidatedRequest { style, image })
    }
}
