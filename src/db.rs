use crate::entity::{
    admin_users, ai_outputs, categories, chat_history, coursework_categories,
    coursework_templates, memory_documents, messages, tutors, user_subscriptions, users,
};
use anyhow::{Context, Result};
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use tracing::info;

const DB_FILE: &str = "tutor-admin.db";

/// Handle to the SQLite database.
///
/// `sea-orm-sync` is blocking, so every operation runs on the blocking pool with
/// its own connection.
#[derive(Debug, Clone)]
pub struct Db {
    db_url: String,
}

impl Db {
    pub async fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data dir: {}", data_dir.display()))?;
        let db_path = data_dir.join(DB_FILE);
        let db = Self {
            db_url: format!("sqlite:{}?mode=rwc", db_path.display()),
        };

        db.run(|conn| {
            conn.get_schema_builder()
                .register(tutors::Entity)
                .register(messages::Entity)
                .register(categories::Entity)
                .register(coursework_categories::Entity)
                .register(coursework_templates::Entity)
                .register(user_subscriptions::Entity)
                .register(users::Entity)
                .register(admin_users::Entity)
                .register(ai_outputs::Entity)
                .register(chat_history::Entity)
                .register(memory_documents::Entity)
                .apply(conn)?;
            Ok(())
        })
        .await
        .context("Failed to apply schema")?;

        info!("Database ready at {}", db_path.display());
        Ok(db)
    }

    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DatabaseConnection) -> Result<T> + Send + 'static,
    {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let conn = Database::connect(&db_url)?;
            op(&conn)
        })
        .await
        .context("Database task panicked")?
    }
}

pub fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
