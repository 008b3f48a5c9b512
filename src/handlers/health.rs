use axum::http::StatusCode;

pub async fn get_health() -> StatusCode {
    StatusCode::OK
}

pub async fn get_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
