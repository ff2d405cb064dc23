use super::{ConversationMemory, Snippet, TutorKey, VectorIndex};
use crate::db::{Db, now_us};
use crate::embeddings::EmbeddingService;
use crate::entity::{chat_history, memory_documents};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// History lines live in `chat_history`, knowledge snippets in
/// `memory_documents` with their vectors in a per-namespace usearch index.
pub struct MemoryManager {
    db: Db,
    embeddings: Arc<dyn EmbeddingService>,
    index: Arc<VectorIndex>,
    history_lines: usize,
    search_results: usize,
}

impl MemoryManager {
    pub fn new(
        db: Db,
        data_dir: &Path,
        embeddings: Arc<dyn EmbeddingService>,
        history_lines: usize,
        search_results: usize,
    ) -> Result<Arc<Self>> {
        let index = VectorIndex::new(&data_dir.join("indexes"), embeddings.dimensions())?;
        info!("Memory manager ready ({} dims)", embeddings.dimensions());
        Ok(Arc::new(Self {
            db,
            embeddings,
            index: Arc::new(index),
            history_lines,
            search_results,
        }))
    }
}

#[async_trait]
impl ConversationMemory for MemoryManager {
    async fn read_latest_history(&self, key: &TutorKey) -> Result<String> {
        let history_key = key.history_key();
        let limit = self.history_lines as u64;
        let mut lines = self
            .db
            .run(move |db| {
                Ok(chat_history::Entity::find()
                    .filter(chat_history::Column::HistoryKey.eq(history_key))
                    .order_by_desc(chat_history::Column::Id)
                    .limit(limit)
                    .all(db)?)
            })
            .await?;
        lines.reverse();

        Ok(lines
            .into_iter()
            .map(|l| l.line)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn vector_search(&self, query: &str, namespace: &str) -> Result<Vec<Snippet>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embeddings.embed_query(query).await?;
        let index = self.index.clone();
        let ns = namespace.to_string();
        let count = self.search_results;
        let keys = tokio::task::spawn_blocking(move || index.search(&ns, &embedding, count))
            .await
            .context("Vector search task panicked")??;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = keys.iter().map(|k| *k as i64).collect();
        let ns = namespace.to_string();
        let docs = self
            .db
            .run(move |db| {
                Ok(memory_documents::Entity::find()
                    .filter(memory_documents::Column::Id.is_in(ids))
                    .filter(memory_documents::Column::Namespace.eq(ns))
                    .all(db)?)
            })
            .await?;
        let mut by_id: HashMap<i64, String> =
            docs.into_iter().map(|d| (d.id, d.content)).collect();

        debug!("Vector search in {} matched {} snippets", namespace, by_id.len());
        Ok(keys
            .into_iter()
            .filter_map(|k| by_id.remove(&(k as i64)))
            .map(|content| Snippet { content })
            .collect())
    }

    async fn write_to_history(&self, line: &str, key: &TutorKey) -> Result<()> {
        let record = chat_history::ActiveModel {
            id: NotSet,
            history_key: Set(key.history_key()),
            line: Set(line.trim_end_matches('\n').to_string()),
            created_at_us: Set(now_us()),
        };
        self.db
            .run(move |db| {
                record.insert(db)?;
                Ok(())
            })
            .await
    }

    async fn add_document(&self, namespace: &str, content: &str) -> Result<()> {
        let embedding = self.embeddings.embed_passage(content).await?;

        let record = memory_documents::ActiveModel {
            id: NotSet,
            namespace: Set(namespace.to_string()),
            content: Set(content.to_string()),
            created_at_us: Set(now_us()),
        };
        let doc = self.db.run(move |db| Ok(record.insert(db)?)).await?;

        let index = self.index.clone();
        let ns = namespace.to_string();
        tokio::task::spawn_blocking(move || index.add(&ns, doc.id as u64, &embedding))
            .await
            .context("Vector insert task panicked")??;

        info!("Added document {} to {}", doc.id, namespace);
        Ok(())
    }
}
