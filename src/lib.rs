pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod entity;
pub mod identity;
pub mod llm;
pub mod memory;
pub mod rate_limit;
pub mod store;
