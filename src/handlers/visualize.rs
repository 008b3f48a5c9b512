use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info, warn};

use crate::state::AppState;
use crate::utils::timing::RequestTimer;
use crate::visualizer::{VisualizeError, VisualizeRequest, VisualizeResult};

pub async fn post_visualize(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<VisualizeResult>, VisualizeError> {
    let mut timer = RequestTimer::start("/api/visualize");
    let result = visualize(&state, body, &mut timer).await;

    match &result {
        Ok(result) => timer.complete("success", result.model.as_deref()),
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                error!("Visualize request failed ({}): {}", status, err);
            } else {
                warn!("Visualize request rejected ({}): {}", status, err);
            }
            timer.complete("error", Some(err.to_string().as_str()));
        }
    }

    result.map(Json)
}

async fn visualize(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
    timer: &mut RequestTimer,
) -> Result<VisualizeResult, VisualizeError> {
    if !state.config.has_gemini_api_key() {
        return Err(VisualizeError::MissingApiKey);
    }

    // Content-Type is not enforced; any body that parses as JSON is accepted.
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            VisualizeError::ImageTooLarge {
                limit: state.config.max_image_bytes,
            }
        } else {
            VisualizeError::Unexpected(rejection.body_text())
        }
    })?;
    let request: VisualizeRequest = serde_json::from_slice(&bytes)
        .map_err(|err| VisualizeError::Unexpected(format!("invalid request body: {err}")))?;

    let validated = request.validate(state.config.max_image_bytes)?;
    timer.set_style(validated.style.key());
    info!(
        "Visualize request: style={}, mime={}, bytes={}",
        validated.style.key(),
        validated.image.mime_type,
        validated.image.byte_len
    );

    let outcome = state
        .chain
        .run(validated.style.prompt(), &validated.image)
        .await
        .ok_or(VisualizeError::Exhausted)?;

    Ok(VisualizeResult::from(outcome))
}
