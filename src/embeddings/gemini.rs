use super::EmbeddingService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_MODEL: &str = "gemini-embedding-001";
const DEFAULT_DIM: usize = 768;
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiEmbedding {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    content: Content<'a>,
    task_type: &'static str,
    output_dimensionality: usize,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Values,
}

#[derive(Deserialize)]
struct Values {
    values: Vec<f32>,
}

impl GeminiEmbedding {
    pub fn new(api_key: &str, model: Option<&str>, dimensions: Option<usize>) -> Self {
        let model = model.unwrap_or(DEFAULT_MODEL).to_string();
        let dimensions = dimensions.unwrap_or(DEFAULT_DIM);
        info!("Gemini embeddings: model {}, {} dimensions", model, dimensions);
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model,
            dimensions,
        }
    }

    async fn embed(&self, text: &str, task_type: &'static str) -> Result<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", BASE_URL, self.model);
        let request = EmbedRequest {
            content: Content {
                parts: [Part { text }],
            },
            task_type,
            output_dimensionality: self.dimensions,
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Gemini embedding request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini embedding API returned {}: {}", status, body);
        }

        let data: EmbedResponse = resp
            .json()
            .await
            .context("Malformed Gemini embedding response")?;
        if data.embedding.values.len() != self.dimensions {
            anyhow::bail!(
                "Gemini returned {} dimensions, expected {}",
                data.embedding.values.len(),
                self.dimensions
            );
        }
        Ok(data.embedding.values)
    }
}

#[async_trait]
impl EmbeddingService for GeminiEmbedding {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_passage(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text, "RETRIEVAL_DOCUMENT").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text, "RETRIEVAL_QUERY").await
    }
}
