use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    storage: StorageConfig,
    api: ApiConfig,
    #[serde(default)]
    embedding: EmbeddingConfig,
    #[serde(default)]
    generation: GenerationConfig,
    #[serde(default)]
    chat: ChatConfig,
    #[serde(default)]
    identity: IdentityConfig,
    #[serde(default)]
    admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_bind")]
    bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StorageConfig {
    data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiConfig {
    provider: String,
    key: String,
    #[serde(default)]
    url: String,
    model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            model: None,
            dimensions: None,
        }
    }
}

/// Sampling parameters passed to the language model on every chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
    #[serde(default = "default_history_lines")]
    pub history_lines: usize,
    #[serde(default = "default_search_results")]
    pub search_results: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            rate_limit_window_secs: default_rate_limit_window_secs(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            history_lines: default_history_lines(),
            search_results: default_search_results(),
        }
    }
}

/// Header names populated by the identity gateway in front of this service.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_user_id_header")]
    pub user_id_header: String,
    #[serde(default = "default_email_header")]
    pub email_header: String,
    #[serde(default = "default_first_name_header")]
    pub first_name_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_id_header: default_user_id_header(),
            email_header: default_email_header(),
            first_name_header: default_first_name_header(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AdminConfig {
    #[serde(default)]
    bootstrap_user_ids: Vec<String>,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_embedding_provider() -> String {
    "local".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u64 {
    1000
}

fn default_rate_limit_window_secs() -> u64 {
    10
}

fn default_rate_limit_max_requests() -> u32 {
    10
}

fn default_history_lines() -> usize {
    30
}

fn default_search_results() -> usize {
    3
}

fn default_user_id_header() -> String {
    "x-user-id".to_string()
}

fn default_email_header() -> String {
    "x-user-email".to_string()
}

fn default_first_name_header() -> String {
    "x-user-first-name".to_string()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub api_provider: String,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub chat: ChatConfig,
    pub identity: IdentityConfig,
    pub admin_bootstrap_ids: Vec<String>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config_file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file")?;

        Ok(Self {
            bind: config_file.server.bind,
            data_dir: config_file.storage.data_dir.into(),
            api_provider: config_file.api.provider,
            api_key: config_file.api.key,
            api_url: config_file.api.url,
            model: config_file.api.model,
            embedding: config_file.embedding,
            generation: config_file.generation,
            chat: config_file.chat,
            identity: config_file.identity,
            admin_bootstrap_ids: config_file.admin.bootstrap_user_ids,
        })
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut config = Self::parse(&content)?;
        if std::env::var("APP_TEST_MODE").is_ok_and(|v| v == "true") {
            config.chat.test_mode = true;
        }
        Ok(config)
    }

    pub fn load() -> Result<Self> {
        let path =
            std::env::var("TUTOR_ADMIN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_file(&path)
    }
}
