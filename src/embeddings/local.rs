use super::EmbeddingService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

const LOCAL_DIM: usize = 384;

/// multilingual-e5-small through fastembed, loaded on first use.
pub struct LocalEmbedding {
    model: Arc<OnceCell<Mutex<TextEmbedding>>>,
    cache_dir: PathBuf,
}

impl LocalEmbedding {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            model: Arc::new(OnceCell::new()),
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    async fn embed_prefixed(&self, prefix: &str, text: &str) -> Result<Vec<f32>> {
        // e5 models expect "passage: " / "query: " prefixes.
        let text = format!("{}: {}", prefix, text);
        let model = self.model.clone();
        let cache_dir = self.cache_dir.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<f32>> {
            let cell = model.get_or_try_init(|| load_model(&cache_dir).map(Mutex::new))?;
            let mut guard = cell
                .lock()
                .map_err(|e| anyhow::anyhow!("embedding model lock poisoned: {e}"))?;
            guard
                .embed(vec![text], None)?
                .into_iter()
                .next()
                .context("embedding model returned empty result")
        })
        .await
        .context("Embedding task panicked")?
    }
}

fn load_model(cache_dir: &Path) -> Result<TextEmbedding> {
    info!("Loading local embedding model into {}", cache_dir.display());
    let model = TextEmbedding::try_new(
        InitOptions::new(EmbeddingModel::MultilingualE5Small)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false),
    )
    .context("Failed to initialize embedding model")?;
    info!("Local embedding model ready");
    Ok(model)
}

#[async_trait]
impl EmbeddingService for LocalEmbedding {
    fn dimensions(&self) -> usize {
        LOCAL_DIM
    }

    async fn embed_passage(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_prefixed("passage", text).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_prefixed("query", text).await
    }
}
