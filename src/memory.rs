//! Conversational memory for tutor chats: a per-key rolling history of lines
//! plus per-namespace similarity search over embedded knowledge snippets.

mod manager;
mod vector_index;

use anyhow::Result;
use async_trait::async_trait;
pub use manager::MemoryManager;
pub use vector_index::VectorIndex;

/// Identifies one conversation history: a tutor, a user, and the model serving them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorKey {
    pub tutor_name: String,
    pub user_id: String,
    pub model_name: String,
}

impl TutorKey {
    pub fn history_key(&self) -> String {
        format!("{}-{}-{}", self.tutor_name, self.model_name, self.user_id)
    }
}

/// Vector namespace holding the knowledge snippets for a tutor.
pub fn tutor_namespace(tutor_name: &str) -> String {
    format!("{}.txt", tutor_name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub content: String,
}

#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Most recent history lines for `key`, oldest first, newline separated.
    async fn read_latest_history(&self, key: &TutorKey) -> Result<String>;

    /// Snippets in `namespace` ranked by similarity to `query`.
    async fn vector_search(&self, query: &str, namespace: &str) -> Result<Vec<Snippet>>;

    /// Appends one line to the history of `key`.
    async fn write_to_history(&self, line: &str, key: &TutorKey) -> Result<()>;

    /// Embeds `content` and stores it in `namespace` for later searches.
    async fn add_document(&self, namespace: &str, content: &str) -> Result<()>;
}
