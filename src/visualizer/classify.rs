use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Quota,
    Configuration,
    ModelUnavailable,
    SafetyBlocked,
    Unknown,
}

/// Evaluated top to bottom against the lower-cased message; first hit wins.
const CLASSIFICATION_RULES: &[(&[&str], ErrorCategory)] = &[
    (&["quota", "rate limit"], ErrorCategory::Quota),
    (
        &["api key", "api_key", "invalid key", "unauthorized"],
        ErrorCategory::Configuration,
    ),
    (&["not found", "404"], ErrorCategory::ModelUnavailable),
    (&["safety", "blocked"], ErrorCategory::SafetyBlocked),
];

pub fn classify_error_message(message: &str) -> ErrorCategory {
    let lowered = message.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Unknown)
}

impl ErrorCategory {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCategory::Quota => StatusCode::TOO_MANY_REQUESTS,
            ErrorCategory::SafetyBlocked => StatusCode::BAD_REQUEST,
            ErrorCategory::Configuration
            | ErrorCategory::ModelUnavailable
            | ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            ErrorCategory::Quota => {
                "API quota exceeded. Please try again later or contact us for a free in-person demonstration."
            }
            ErrorCategory::Configuration => {
                "API configuration error. Please contact us so we can fix the visualizer."
            }
            ErrorCategory::ModelUnavailable => {
                "The AI model is temporarily unavailable. Please try again later."
            }
            ErrorCategory::SafetyBlocked => {
                "The image could not be processed due to content safety filters. Please try a different photo of your home exterior."
            }
            ErrorCategory::Unknown => {
                "An error occurred while processing your image. Please try again or contact us for a free demonstration."
            }
        }
    }
}
