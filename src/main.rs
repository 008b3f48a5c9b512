use dotenvy::dotenv;
use tracing::{info, warn};

mod config;
mod handlers;
mod llm;
mod server;
mod state;
mod utils;
mod visualizer;

use config::CONFIG;
use state::AppState;
use utils::logging::init_logging;
use visualizer::FallbackChain;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _guards = init_logging(&CONFIG);

    info!("Starting landscape lighting visualizer API");
    if !CONFIG.has_gemini_api_key() {
        warn!("GEMINI_API_KEY is not set; visualize requests will fail until it is configured");
    }

    let chain = FallbackChain::from_config(&CONFIG);
    info!("Visualizer fallback chain: {}", chain.describe().join(", "));

    let state = AppState::new((*CONFIG).clone(), chain);
    server::serve(state).await
}
