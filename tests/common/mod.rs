#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt; // for oneshot
use tutor_admin::api::{self, AppState};
use tutor_admin::chat::ChatService;
use tutor_admin::config::{GenerationConfig, IdentityConfig};
use tutor_admin::db::Db;
use tutor_admin::identity::GatewayIdentity;
use tutor_admin::llm::LanguageModel;
use tutor_admin::memory::{ConversationMemory, Snippet, TutorKey};
use tutor_admin::rate_limit::KeyedRateLimiter;
use tutor_admin::store::Store;

pub const ADMIN: &str = "user_admin";
pub const MEMBER: &str = "user_member";

/// Replies with a fixed answer and records every prompt it receives.
#[derive(Default)]
pub struct RecordingModel {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LanguageModel for RecordingModel {
    fn model_name(&self) -> &str {
        "test-model"
    }

    async fn generate(&self, prompt: &str, _params: &GenerationConfig) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Two plus two is four.".to_string())
    }
}

/// History and knowledge kept in memory.
#[derive(Default)]
pub struct InMemory {
    pub lines: Mutex<Vec<(String, String)>>,
    pub documents: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ConversationMemory for InMemory {
    async fn read_latest_history(&self, key: &TutorKey) -> Result<String> {
        let key = key.history_key();
        Ok(self
            .lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, line)| line.clone())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn vector_search(&self, _query: &str, namespace: &str) -> Result<Vec<Snippet>> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, content)| Snippet {
                content: content.clone(),
            })
            .collect())
    }

    async fn write_to_history(&self, line: &str, key: &TutorKey) -> Result<()> {
        self.lines
            .lock()
            .unwrap()
            .push((key.history_key(), line.to_string()));
        Ok(())
    }

    async fn add_document(&self, namespace: &str, content: &str) -> Result<()> {
        self.documents
            .lock()
            .unwrap()
            .push((namespace.to_string(), content.to_string()));
        Ok(())
    }
}

pub struct Options {
    pub test_mode: bool,
    pub max_requests: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            test_mode: false,
            max_requests: 10,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub model: Arc<RecordingModel>,
    pub memory: Arc<InMemory>,
}

pub async fn spawn_app(options: Options) -> TestApp {
    let dir = std::env::temp_dir().join(format!("tutor-admin-it-{}", uuid::Uuid::new_v4()));
    let db = Db::open(&dir).await.expect("Failed to open test database");
    let store = Store::new(db);
    store.grant_admin(ADMIN).await.unwrap();

    let model = Arc::new(RecordingModel::default());
    let memory = Arc::new(InMemory::default());
    let limiter = Arc::new(KeyedRateLimiter::new(
        Duration::from_secs(10),
        options.max_requests,
    ));
    let chat = ChatService::new(
        store.clone(),
        memory.clone(),
        model.clone(),
        limiter,
        GenerationConfig::default(),
        options.test_mode,
    );

    let router = api::router(AppState {
        store: store.clone(),
        chat: Arc::new(chat),
        memory: memory.clone(),
        identity: Arc::new(GatewayIdentity::new(IdentityConfig::default())),
    });

    TestApp {
        router,
        store,
        model,
        memory,
    }
}

impl TestApp {
    /// Sends a request as `user` (anonymous when `None`) and decodes the JSON reply.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder
                .header("x-user-id", user)
                .header("x-user-email", format!("{}@example.com", user));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, user, Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, user, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, user, None).await
    }
}
