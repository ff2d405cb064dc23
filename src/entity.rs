pub mod admin_users;
pub mod ai_outputs;
pub mod categories;
pub mod chat_history;
pub mod coursework_categories;
pub mod coursework_templates;
pub mod memory_documents;
pub mod messages;
pub mod tutors;
pub mod user_subscriptions;
pub mod users;
