use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::llm::{
    GeminiClient, GeminiImageConfig, GenerationOutput, GenerationProvider, GenerationRequest,
    ImagePayload, InlineImage, ProviderError,
};
use crate::utils::timing::log_stage_timing;
use crate::visualizer::styles::description_prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PrimaryImage,
    SecondaryImage,
    TextDescription,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::PrimaryImage => "primary_image",
            Stage::SecondaryImage => "secondary_image",
            Stage::TextDescription => "text_description",
        }
    }

    fn prompt_for(self, style_prompt: &str) -> String {
        match self {
            Stage::PrimaryImage | Stage::SecondaryImage => style_prompt.to_string(),
            Stage::TextDescription => description_prompt(style_prompt),
        }
    }

    /// Image stages need an image; the text stage needs text.
    fn accept(self, output: GenerationOutput) -> Option<(Option<InlineImage>, Option<String>)> {
        match self {
            Stage::PrimaryImage | Stage::SecondaryImage => {
                let image = output.image?;
                Some((Some(image), output.text))
            }
            Stage::TextDescription => {
                let text = output.text.filter(|text| !text.trim().is_empty())?;
                Some((None, Some(text)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    pub stage: Stage,
    pub model: String,
    pub image: Option<InlineImage>,
    pub text: Option<String>,
}

struct StageBinding {
    stage: Stage,
    provider: Arc<dyn GenerationProvider>,
}

/// Ordered provider stages tried one after another until one yields
/// usable output.
pub struct FallbackChain {
    stages: Vec<StageBinding>,
    stage_timeout: Duration,
}

impl FallbackChain {
    pub fn new(
        primary_image: Arc<dyn GenerationProvider>,
        secondary_image: Arc<dyn GenerationProvider>,
        text_description: Arc<dyn GenerationProvider>,
        stage_timeout: Duration,
    ) -> Self {
        FallbackChain {
            stages: vec![
                StageBinding {
                    stage: Stage::PrimaryImage,
                    provider: primary_image,
                },
                StageBinding {
                    stage: Stage::SecondaryImage,
                    provider: secondary_image,
                },
                StageBinding {
                    stage: Stage::TextDescription,
                    provider: text_description,
                },
            ],
            stage_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let primary = GeminiClient::image_model(
            config,
            &config.primary_image_model,
            Some(GeminiImageConfig {
                aspect_ratio: Some(config.image_aspect_ratio.clone()),
                image_size: Some(config.image_size.clone()),
            }),
        );
        let secondary = GeminiClient::image_model(
            config,
            &config.secondary_image_model,
            Some(GeminiImageConfig {
                aspect_ratio: Some(config.image_aspect_ratio.clone()),
                image_size: None,
            }),
        );
        let text = GeminiClient::text_model(config, &config.text_model);

        Self::new(
            Arc::new(primary),
            Arc::new(secondary),
            Arc::new(text),
            config.stage_timeout(),
        )
    }

    pub fn describe(&self) -> Vec<String> {
        self.stages
            .iter()
            .map(|binding| format!("{}={}", binding.stage.label(), binding.provider.model()))
            .collect()
    }

    pub async fn run(&self, style_prompt: &str, image: &ImagePayload) -> Option<ChainOutcome> {
        for binding in &self.stages {
            let stage = binding.stage;
            let provider = binding.provider.as_ref();
            let prompt = stage.prompt_for(style_prompt);
            let request = GenerationRequest {
                prompt: &prompt,
                image,
            };
            let timeout = self.stage_timeout;

            info!(
                "Visualizer stage {} attempting model {}",
                stage.label(),
                provider.model()
            );
            let result = log_stage_timing(provider.provider(), provider.model(), stage.label(), || async move {
                match tokio::time::timeout(timeout, provider.generate(&request)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(timeout)),
                }
            })
            .await;

            match result {
                Ok(output) => match stage.accept(output) {
                    Some((image, text)) => {
                        info!(
                            "Visualizer stage {} succeeded with model {} (image={}, text={})",
                            stage.label(),
                            provider.model(),
                            image.is_some(),
                            text.is_some()
                        );
                        return Some(ChainOutcome {
                            stage,
                            model: provider.model().to_string(),
                            image,
                            text,
                        });
                    }
                    None => warn!(
                        "Visualizer stage {} returned no usable output from model {}",
                        stage.label(),
                        provider.model()
                    ),
                },
                Err(err) => warn!(
                    "Visualizer stage {} failed with model {}: {}",
                    stage.label(),
                    provider.model(),
                    err
                ),
            }
        }

        warn!("Visualizer fallback chain exhausted without a result");
        None
    }
}
