use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutor_admin::{
    api::{self, AppState},
    chat::ChatService,
    config::Config,
    db::Db,
    embeddings,
    identity::GatewayIdentity,
    llm,
    memory::{ConversationMemory, MemoryManager},
    rate_limit::KeyedRateLimiter,
    store::Store,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    let db = Db::open(&config.data_dir).await?;
    let store = Store::new(db.clone());
    for user_id in &config.admin_bootstrap_ids {
        store.grant_admin(user_id).await?;
    }

    let embeddings = embeddings::create_embedding_service(&config)?;
    let memory: Arc<dyn ConversationMemory> = MemoryManager::new(
        db,
        &config.data_dir,
        embeddings,
        config.chat.history_lines,
        config.chat.search_results,
    )?;
    let model = llm::create_language_model(&config)?;
    let limiter = Arc::new(KeyedRateLimiter::new(
        Duration::from_secs(config.chat.rate_limit_window_secs),
        config.chat.rate_limit_max_requests,
    ));

    if config.chat.test_mode {
        info!("Chat test mode is on, model calls are skipped");
    }
    let chat = ChatService::new(
        store.clone(),
        memory.clone(),
        model,
        limiter,
        config.generation,
        config.chat.test_mode,
    );

    let app = api::router(AppState {
        store,
        chat: Arc::new(chat),
        memory,
        identity: Arc::new(GatewayIdentity::new(config.identity.clone())),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on {} (model {})", config.bind, config.model);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
