use crate::config::{Config, GenerationConfig};
use anyhow::Result;
use async_trait::async_trait;
use rig::{
    client::CompletionClient,
    completion::Prompt,
    providers::{anthropic, gemini, openai},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    OpenAi,
    Gemini,
    Anthropic,
}

impl Provider {
    /// Sampling knobs rig has no builder method for, in each provider's own shape.
    fn sampling_params(self, params: &GenerationConfig) -> Value {
        match self {
            Provider::Gemini => json!({
                "generationConfig": {
                    "topP": params.top_p,
                    "topK": params.top_k,
                }
            }),
            Provider::Anthropic => json!({
                "top_p": params.top_p,
                "top_k": params.top_k,
            }),
            // Chat completions has no top_k.
            Provider::OpenAi => json!({ "top_p": params.top_p }),
        }
    }
}

/// Single-shot text generation used by the chat pipeline.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_name(&self) -> &str;
    async fn generate(&self, prompt: &str, params: &GenerationConfig) -> Result<String>;
}

pub struct RigLanguageModel<C: CompletionClient> {
    client: C,
    provider: Provider,
    model: String,
}

impl<C: CompletionClient> RigLanguageModel<C> {
    fn new(client: C, provider: Provider, model: &str) -> Arc<Self> {
        Arc::new(Self {
            client,
            provider,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl<C> LanguageModel for RigLanguageModel<C>
where
    C: CompletionClient + Send + Sync,
    C::CompletionModel: 'static,
{
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, params: &GenerationConfig) -> Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .temperature(params.temperature)
            .max_tokens(params.max_output_tokens)
            .additional_params(self.provider.sampling_params(params))
            .build();

        let response = agent.prompt(prompt.to_string()).await?;
        debug!("{} replied with {} chars", self.model, response.len());
        Ok(response)
    }
}

pub fn create_language_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    match config.api_provider.as_str() {
        "openai" => {
            let mut builder = openai::CompletionsClient::builder().api_key(&config.api_key);
            if !config.api_url.is_empty() {
                builder = builder.base_url(&config.api_url);
            }
            let client: openai::CompletionsClient = builder.build()?;
            Ok(RigLanguageModel::new(client, Provider::OpenAi, &config.model)
                as Arc<dyn LanguageModel>)
        }
        "gemini" => {
            let client = gemini::Client::new(&config.api_key)?;
            Ok(RigLanguageModel::new(client, Provider::Gemini, &config.model)
                as Arc<dyn LanguageModel>)
        }
        _ => {
            let mut builder = anthropic::Client::builder().api_key(&config.api_key);
            if !config.api_url.is_empty() {
                builder = builder.base_url(&config.api_url);
            }
            let client: anthropic::Client = builder.build()?;
            Ok(RigLanguageModel::new(client, Provider::Anthropic, &config.model)
                as Arc<dyn LanguageModel>)
        }
    }
}
