pub mod chain;
pub mod classify;
pub mod request;
pub mod styles;

#[cfg(test)]
pub mod testing;

use axum::http::StatusCode;
use serde::Serialize;

use crate::llm::media::MediaError;

pub use chain::{ChainOutcome, FallbackChain, Stage};
pub use classify::classify_error_message;
pub use request::VisualizeRequest;
pub use styles::LightingStyle;

const IMAGE_SUCCESS_MESSAGE: &str = "Visualization generated successfully!";
const TEXT_SUCCESS_MESSAGE: &str = "Here's how professional lighting would transform your home.";
const EXHAUSTED_MESSAGE: &str =
    "Unable to generate visualization. Please try again or contact us for a free in-person demonstration.";
const INVALID_IMAGE_MESSAGE: &str = "Invalid image format. Please upload a JPEG, PNG, or WebP image.";

/// Successful body of `POST /api/visualize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizeResult {
    pub success: bool,
    pub result_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_mime_type: Option<String>,
    pub text_description: Option<String>,
    pub message: String,
    pub model: Option<String>,
}

impl From<ChainOutcome> for VisualizeResult {
    fn from(outcome: ChainOutcome) -> Self {
        let message = match outcome.stage {
            Stage::PrimaryImage | Stage::SecondaryImage => IMAGE_SUCCESS_MESSAGE,
            Stage::TextDescription => TEXT_SUCCESS_MESSAGE,
        };
        let (result_image, result_mime_type) = match outcome.image {
            Some(image) => (Some(image.data), Some(image.mime_type)),
            None => (None, None),
        };
        VisualizeResult {
            success: true,
            result_image,
            result_mime_type,
            text_description: outcome.text,
            message: message.to_string(),
            model: Some(outcome.model),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VisualizeError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("request did not include an image")]
    MissingImage,
    #[error("unknown lighting style {0:?}")]
    InvalidStyle(String),
    #[error("invalid image: {0}")]
    InvalidImage(#[source] MediaError),
    #[error("image exceeds the {limit} byte limit")]
    ImageTooLarge { limit: usize },
    #[error("every visualization stage failed")]
    Exhausted,
    #[error("{0}")]
    Unexpected(String),
}

fn format_megabytes(bytes: usize) -> String {
    let megabytes = bytes as f64 / (1024.0 * 1024.0);
    if megabytes.fract() == 0.0 {
        format!("{megabytes:.0}MB")
    } else {
        format!("{megabytes:.1}MB")
    }
}

impl VisualizeError {
    pub fn status(&self) -> StatusCode {
        match self {
            VisualizeError::MissingApiKey | VisualizeError::Exhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            VisualizeError::MissingImage
            | VisualizeError::InvalidStyle(_)
            | VisualizeError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            VisualizeError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            VisualizeError::Unexpected(message) => classify_error_message(message).status(),
        }
    }

    /// Plain-language text shown to the visitor. Raw provider text never
    /// appears here.
    pub fn user_message(&self) -> String {
        match self {
            VisualizeError::MissingApiKey => {
                "Gemini API key not configured. Please add GEMINI_API_KEY to your environment variables."
                    .to_string()
            }
            VisualizeError::MissingImage => "No image provided".to_string(),
            VisualizeError::InvalidStyle(_) => "Invalid lighting style selected".to_string(),
            VisualizeError::InvalidImage(_) => INVALID_IMAGE_MESSAGE.to_string(),
            VisualizeError::ImageTooLarge { limit } => {
                format!("Image must be less than {}.", format_megabytes(*limit))
            }
            VisualizeError::Exhausted => EXHAUSTED_MESSAGE.to_string(),
            VisualizeError::Unexpected(message) => {
                classify_error_message(message).user_message().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::InlineImage;
    use crate::visualizer::classify::ErrorCategory;

    #[test]
    fn image_outcome_maps_to_image_result() {
        let result = VisualizeResult::from(ChainOutcome {
            stage: Stage::SecondaryImage,
            model: "stage-b-model".to_string(),
            image: Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            }),
            text: None,
        });
        assert!(result.success);
        assert_eq!(result.result_image.as_deref(), Some("AAAA"));
        assert_eq!(result.result_mime_type.as_deref(), Some("image/png"));
        assert_eq!(result.message, IMAGE_SUCCESS_MESSAGE);
        assert_eq!(result.model.as_deref(), Some("stage-b-model"));
    }

    #[test]
    fn text_outcome_serializes_null_image() {
        let result = VisualizeResult::from(ChainOutcome {
            stage: Stage::TextDescription,
            model: "stage-c-model".to_string(),
            image: None,
            text: Some("Soft light".to_string()),
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], true);
        assert!(value["resultImage"].is_null());
        assert!(value.get("resultMimeType").is_none());
        assert_eq!(value["textDescription"], "Soft light");
        assert_eq!(value["message"], TEXT_SUCCESS_MESSAGE);
    }

    #[test]
    fn validation_errors_have_fixed_statuses() {
        assert_eq!(VisualizeError::MissingApiKey.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(VisualizeError::MissingImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            VisualizeError::InvalidStyle("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(VisualizeError::Exhausted.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unexpected_errors_are_classified_without_leaking_text() {
        let err = VisualizeError::Unexpected("Quota exceeded for project 1234".to_string());
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(!err.user_message().contains("1234"));

        let err = VisualizeError::Unexpected("expected value at line 1 column 1".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), ErrorCategory::Unknown.user_message());
    }

    #[test]
    fn size_limit_message_uses_megabytes() {
        let err = VisualizeError::ImageTooLarge {
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(err.user_message(), "Image must be less than 10MB.");
        assert_eq!(format_megabytes(1536 * 1024), "1.5MB");
    }
}
