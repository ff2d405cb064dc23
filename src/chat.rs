//! The tutor chat turn: rate limit, tutor lookup, memory retrieval, prompt
//! assembly, generation and persistence.

mod prompt;

use crate::config::GenerationConfig;
use crate::llm::LanguageModel;
use crate::memory::{ConversationMemory, TutorKey, tutor_namespace};
use crate::rate_limit::RateLimiter;
use crate::store::{MessageRole, Store};
pub use prompt::{build_prompt, tutor_display_name};
use std::sync::Arc;
use tracing::{info, warn};

pub const TEST_MODE_PROMPT: &str = "Test mode initiated";
pub const TEST_MODE_REPLY: &str = "Hi, how are you? (Test Mode)";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },
    #[error("Tutor not found")]
    TutorNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct ChatService {
    store: Store,
    memory: Arc<dyn ConversationMemory>,
    model: Arc<dyn LanguageModel>,
    limiter: Arc<dyn RateLimiter>,
    generation: GenerationConfig,
    test_mode: bool,
}

impl ChatService {
    pub fn new(
        store: Store,
        memory: Arc<dyn ConversationMemory>,
        model: Arc<dyn LanguageModel>,
        limiter: Arc<dyn RateLimiter>,
        generation: GenerationConfig,
        test_mode: bool,
    ) -> Self {
        Self {
            store,
            memory,
            model,
            limiter,
            generation,
            test_mode,
        }
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Records the fixed placeholder exchange without touching the model.
    pub async fn test_exchange(&self, tutor_id: &str, user_id: &str) -> Result<String, ChatError> {
        self.store
            .insert_message(tutor_id, user_id, MessageRole::User, TEST_MODE_PROMPT)
            .await?;
        self.store
            .insert_message(tutor_id, user_id, MessageRole::System, TEST_MODE_REPLY)
            .await?;
        Ok(TEST_MODE_REPLY.to_string())
    }

    /// Runs one chat turn. `route` and the caller id form the rate-limit key.
    ///
    /// The user message is stored before generation and is kept if generation fails.
    pub async fn respond(
        &self,
        route: &str,
        tutor_id: &str,
        user_id: &str,
        user_prompt: &str,
    ) -> Result<String, ChatError> {
        let decision = self.limiter.check(&format!("{}-{}", route, user_id));
        if !decision.allowed {
            warn!("Rate limit hit for {} on {}", user_id, route);
            return Err(ChatError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            });
        }

        let tutor = self
            .store
            .find_tutor(tutor_id)
            .await?
            .ok_or(ChatError::TutorNotFound)?;
        let tutor_name = tutor_display_name(&tutor).to_string();

        let key = TutorKey {
            tutor_name: tutor_name.clone(),
            user_id: user_id.to_string(),
            model_name: self.model.model_name().to_string(),
        };
        let history = self.memory.read_latest_history(&key).await?;
        let snippets = self
            .memory
            .vector_search(&history, &tutor_namespace(&tutor_name))
            .await?;

        let full_prompt = build_prompt(&tutor, &snippets, &history, user_prompt);

        self.store
            .insert_message(tutor_id, user_id, MessageRole::User, user_prompt)
            .await?;

        let reply = self.model.generate(&full_prompt, &self.generation).await?;

        self.memory
            .write_to_history(&format!("User: {}", user_prompt), &key)
            .await?;
        self.memory
            .write_to_history(&format!("Tutor: {}", reply), &key)
            .await?;

        self.store
            .insert_message(tutor_id, user_id, MessageRole::System, &reply)
            .await?;

        info!("Chat turn with {} for {} ({} chars)", tutor_name, user_id, reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use crate::config::GenerationConfig;
    use crate::llm::LanguageModel;
    use crate::memory::{ConversationMemory, Snippet, TutorKey};
    use crate::rate_limit::{RateLimitDecision, RateLimiter};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingModel {
        pub prompts: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        fn model_name(&self) -> &str {
            "test-model"
        }

        async fn generate(&self, prompt: &str, _params: &GenerationConfig) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                anyhow::bail!("provider unavailable");
            }
            Ok("4".to_string())
        }
    }

    #[derive(Default)]
    pub struct FakeMemory {
        pub history: String,
        pub snippets: Vec<String>,
        pub searches: Mutex<Vec<(String, String)>>,
        pub written: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ConversationMemory for FakeMemory {
        async fn read_latest_history(&self, _key: &TutorKey) -> Result<String> {
            Ok(self.history.clone())
        }

        async fn vector_search(&self, query: &str, namespace: &str) -> Result<Vec<Snippet>> {
            self.searches
                .lock()
                .unwrap()
                .push((query.to_string(), namespace.to_string()));
            Ok(self
                .snippets
                .iter()
                .map(|content| Snippet {
                    content: content.clone(),
                })
                .collect())
        }

        async fn write_to_history(&self, line: &str, key: &TutorKey) -> Result<()> {
            self.written
                .lock()
                .unwrap()
                .push((key.history_key(), line.to_string()));
            Ok(())
        }

        async fn add_document(&self, _namespace: &str, _content: &str) -> Result<()> {
            Ok(())
        }
    }

    pub struct FixedLimiter(pub bool);

    impl RateLimiter for FixedLimiter {
        fn check(&self, _identifier: &str) -> RateLimitDecision {
            RateLimitDecision {
                allowed: self.0,
                retry_after_secs: if self.0 { 0 } else { 10 },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::entity::messages;
    use crate::store::{NewTutor, test_store};

    struct Harness {
        store: Store,
        model: Arc<RecordingModel>,
        memory: Arc<FakeMemory>,
        chat: ChatService,
        tutor_id: String,
    }

    async fn harness(memory: FakeMemory, model: RecordingModel, allowed: bool) -> Harness {
        let store = test_store().await;
        let tutor = store
            .create_tutor(NewTutor {
                user_id: "owner".into(),
                name: "Ada".into(),
                description: "patient math tutor".into(),
                instructions: "use simple examples".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let memory = Arc::new(memory);
        let model = Arc::new(model);
        let chat = ChatService::new(
            store.clone(),
            memory.clone(),
            model.clone(),
            Arc::new(FixedLimiter(allowed)),
            GenerationConfig::default(),
            false,
        );
        Harness {
            store,
            model,
            memory,
            chat,
            tutor_id: tutor.id,
        }
    }

    fn roles(messages: &[messages::Model]) -> Vec<&str> {
        messages.iter().map(|m| m.role.as_str()).collect()
    }

    #[tokio::test]
    async fn test_turn_builds_ordered_prompt_and_records_everything() {
        let h = harness(
            FakeMemory {
                history: "User: hi\nTutor: hello".into(),
                snippets: vec!["carrying digits".into()],
                ..Default::default()
            },
            RecordingModel::default(),
            true,
        )
        .await;

        let reply = h
            .chat
            .respond("/api/chat/t", &h.tutor_id, "user_1", "what is 2+2")
            .await
            .unwrap();
        assert_eq!(reply, "4");

        let prompts = h.model.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        let persona = prompt.find("use simple examples").unwrap();
        let snippet = prompt.find("carrying digits").unwrap();
        let history = prompt.find("User: hi\nTutor: hello").unwrap();
        let question = prompt.find("what is 2+2").unwrap();
        assert!(persona < snippet && snippet < history && history < question);

        let searches = h.memory.searches.lock().unwrap().clone();
        assert_eq!(
            searches,
            vec![("User: hi\nTutor: hello".to_string(), "Ada.txt".to_string())]
        );

        let written = h.memory.written.lock().unwrap().clone();
        assert_eq!(
            written,
            vec![
                ("Ada-test-model-user_1".to_string(), "User: what is 2+2".to_string()),
                ("Ada-test-model-user_1".to_string(), "Tutor: 4".to_string()),
            ]
        );

        let stored = h.store.list_conversation(&h.tutor_id, "user_1").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().any(|m| m.role == "user" && m.content == "what is 2+2"));
        assert!(stored.iter().any(|m| m.role == "system" && m.content == "4"));
    }

    #[tokio::test]
    async fn test_rate_limited_turn_changes_nothing() {
        let h = harness(FakeMemory::default(), RecordingModel::default(), false).await;

        let err = h
            .chat
            .respond("/api/chat/t", &h.tutor_id, "user_1", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::RateLimited { .. }));

        assert!(h.model.prompts.lock().unwrap().is_empty());
        assert!(h.memory.written.lock().unwrap().is_empty());
        assert_eq!(h.store.count_messages_for_tutor(&h.tutor_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tutor() {
        let h = harness(FakeMemory::default(), RecordingModel::default(), true).await;
        let err = h
            .chat
            .respond("/api/chat/missing", "missing", "user_1", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::TutorNotFound));
        assert!(h.model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_user_message() {
        let h = harness(
            FakeMemory::default(),
            RecordingModel {
                fail: true,
                ..Default::default()
            },
            true,
        )
        .await;

        let err = h
            .chat
            .respond("/api/chat/t", &h.tutor_id, "user_1", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Internal(_)));

        let stored = h.store.list_conversation(&h.tutor_id, "user_1").await.unwrap();
        assert_eq!(roles(&stored), vec!["user"]);
        assert!(h.memory.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_records_placeholder_pair() {
        let h = harness(FakeMemory::default(), RecordingModel::default(), false).await;

        let reply = h.chat.test_exchange(&h.tutor_id, "user_1").await.unwrap();
        assert_eq!(reply, TEST_MODE_REPLY);

        let stored = h.store.list_conversation(&h.tutor_id, "user_1").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().any(|m| m.role == "user" && m.content == TEST_MODE_PROMPT));
        assert!(stored.iter().any(|m| m.role == "system" && m.content == TEST_MODE_REPLY));
        assert!(h.model.prompts.lock().unwrap().is_empty());
    }
}
