use axum::Json;
use serde::Serialize;

use crate::visualizer::LightingStyle;

#[derive(Debug, Serialize)]
pub struct StyleEntry {
    pub id: LightingStyle,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub styles: Vec<StyleEntry>,
}

pub async fn get_styles() -> Json<StylesResponse> {
    let styles = LightingStyle::ALL
        .into_iter()
        .map(|style| StyleEntry {
            id: style,
            name: style.display_name(),
            description: style.description(),
        })
        .collect();
    Json(StylesResponse { styles })
}
