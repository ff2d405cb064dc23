mod gemini;
mod local;

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
pub use gemini::GeminiEmbedding;
pub use local::LocalEmbedding;
use std::sync::Arc;

/// Turns text into vectors for the tutor knowledge index.
///
/// Passages are what gets stored, queries are what gets searched with; some
/// models embed the two differently.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    fn dimensions(&self) -> usize;
    async fn embed_passage(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

pub fn create_embedding_service(config: &Config) -> Result<Arc<dyn EmbeddingService>> {
    match config.embedding.provider.as_str() {
        "gemini" => {
            let api_key = config
                .embedding
                .api_key
                .as_deref()
                .unwrap_or(&config.api_key);
            Ok(Arc::new(GeminiEmbedding::new(
                api_key,
                config.embedding.model.as_deref(),
                config.embedding.dimensions,
            )))
        }
        _ => Ok(Arc::new(LocalEmbedding::new(
            &config.data_dir.join("models"),
        ))),
    }
}
