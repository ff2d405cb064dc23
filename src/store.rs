//! Relational persistence for the back-office.
//!
//! Each submodule adds an `impl Store` block for one table family. Reads and
//! writes are single statements or short read-then-write sequences; concurrent
//! edits to the same row are last-writer-wins.

mod admins;
mod ai_outputs;
mod analytics;
mod categories;
mod coursework;
mod messages;
mod subscriptions;
mod tutors;
mod users;

use crate::db::Db;

pub use analytics::{Analytics, DailyCount, Overview, Stats, SubscriptionBreakdown, TemplateUsage};
pub use categories::CategoryDeletion;
pub use coursework::{NewCourseworkCategory, NewTemplate, TemplateChanges, TemplateWrite};
pub use messages::{MessageRole, MessageWithTutor};
pub use subscriptions::{NewSubscription, SubscriptionChanges, SubscriptionWithProfile};
pub use tutors::{NewTutor, TutorChanges, TutorWithCategory};
pub use users::ProfileSync;

#[derive(Debug, Clone)]
pub struct Store {
    db: Db,
}

impl Store {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    let dir = std::env::temp_dir().join(format!("tutor-admin-test-{}", uuid::Uuid::new_v4()));
    Store::new(Db::open(&dir).await.unwrap())
}
