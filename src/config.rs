use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: String,
    pub log_dir: String,
    pub cors_allowed_origins: Vec<String>,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_safety_settings: String,
    pub gemini_temperature: f32,
    pub gemini_max_output_tokens: i32,
    pub primary_image_model: String,
    pub secondary_image_model: String,
    pub text_model: String,
    pub image_aspect_ratio: String,
    pub image_size: String,
    pub stage_timeout_seconds: u64,
    pub max_image_bytes: usize,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

/// Typed reads over a variable lookup, so the loader works against the
/// process environment and against plain maps in tests.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str, default: &str) -> String {
        (self.lookup)(name).unwrap_or_else(|| default.to_string())
    }

    fn f32(&self, name: &str, default: f32) -> f32 {
        (self.lookup)(name)
            .and_then(|value| value.trim().parse::<f32>().ok())
            .unwrap_or(default)
    }

    fn i32(&self, name: &str, default: i32) -> i32 {
        (self.lookup)(name)
            .and_then(|value| value.trim().parse::<i32>().ok())
            .unwrap_or(default)
    }

    fn u64(&self, name: &str, default: u64) -> u64 {
        (self.lookup)(name)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(default)
    }

    fn usize(&self, name: &str, default: usize) -> usize {
        (self.lookup)(name)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(default)
    }

    fn csv(&self, name: &str) -> Vec<String> {
        (self.lookup)(name)
            .unwrap_or_default()
            .split(',')
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }
}

fn normalize_gemini_safety_settings(value: String) -> String {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return "standard".to_string();
    }
    trimmed
}

fn normalize_base_url(value: String) -> String {
    value.trim().trim_end_matches('/').to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let bind_address_raw = vars.string("BIND_ADDRESS", "0.0.0.0:8080");
        let bind_address = bind_address_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| anyhow!("Invalid BIND_ADDRESS '{}': {}", bind_address_raw, err))?;

        Ok(Config {
            bind_address,
            log_level: vars.string("LOG_LEVEL", "info").to_lowercase(),
            log_dir: vars.string("LOG_DIR", "logs"),
            cors_allowed_origins: vars.csv("CORS_ALLOWED_ORIGINS"),
            gemini_api_key: vars.string("GEMINI_API_KEY", "").trim().to_string(),
            gemini_api_base: normalize_base_url(vars.string(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com/v1beta",
            )),
            gemini_safety_settings: normalize_gemini_safety_settings(
                vars.string("GEMINI_SAFETY_SETTINGS", "standard"),
            ),
            gemini_temperature: vars.f32("GEMINI_TEMPERATURE", 0.7),
            gemini_max_output_tokens: vars.i32("GEMINI_MAX_OUTPUT_TOKENS", 2048),
            primary_image_model: vars.string(
                "VISUALIZER_PRIMARY_MODEL",
                "gemini-3-pro-image-preview",
            ),
            secondary_image_model: vars.string(
                "VISUALIZER_SECONDARY_MODEL",
                "gemini-2.5-flash-image",
            ),
            text_model: vars.string("VISUALIZER_TEXT_MODEL", "gemini-2.5-flash"),
            image_aspect_ratio: vars.string("VISUALIZER_ASPECT_RATIO", "16:9"),
            image_size: vars.string("VISUALIZER_IMAGE_SIZE", "2K"),
            stage_timeout_seconds: vars.u64("VISUALIZER_STAGE_TIMEOUT_SECONDS", 90).max(1),
            max_image_bytes: vars.usize("VISUALIZER_MAX_IMAGE_BYTES", 10 * 1024 * 1024),
        })
    }

    pub fn has_gemini_api_key(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_seconds)
    }

    /// Largest accepted request body: the base64 expansion of the image
    /// limit plus room for the rest of the JSON document.
    pub fn max_body_bytes(&self) -> usize {
        self.max_image_bytes
            .saturating_mul(4)
            .saturating_div(3)
            .saturating_add(1024 * 1024)
    }
}
