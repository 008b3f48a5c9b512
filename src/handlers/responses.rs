use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::visualizer::VisualizeError;

/// Body of every failed `/api/visualize` call.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
}

impl FailureBody {
    pub fn new(message: impl Into<String>) -> Self {
        FailureBody {
            success: false,
            message: message.into(),
        }
    }
}

impl IntoResponse for VisualizeError {
    fn into_response(self) -> Response {
        (self.status(), Json(FailureBody::new(self.user_message()))).into_response()
    }
}
