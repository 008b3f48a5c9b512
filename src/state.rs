use std::sync::Arc;

use crate::config::Config;
use crate::visualizer::FallbackChain;

/// Shared, read-only request context. Nothing in here is mutated after
/// startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chain: Arc<FallbackChain>,
}

impl AppState {
    pub fn new(config: Config, chain: FallbackChain) -> Self {
        AppState {
            config: Arc::new(config),
            chain: Arc::new(chain),
        }
    }
}
