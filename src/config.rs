use std::path::PathBuf;
use std::time::Duration;

use crate::ai::client::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ModelConfig};

pub const DEFAULT_VISION_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const DB_FILE: &str = "aicademy.db";
const LOG_FILE: &str = "aicademy.log";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub vision_model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                model: DEFAULT_MODEL.to_string(),
                temperature: Some(DEFAULT_TEMPERATURE),
                max_tokens: Some(DEFAULT_MAX_TOKENS),
            },
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(model) = get("AICADEMY_MODEL") {
            config.model.model = model;
        }
        if let Some(model) = get("AICADEMY_VISION_MODEL") {
            config.vision_model = model;
        }
        if let Some(url) = get("AICADEMY_BASE_URL") {
            config.base_url = url;
        }
        if let Some(dir) = get("AICADEMY_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get("AICADEMY_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.api_key = get("OPENROUTER_API_KEY");
        config
    }

    /// Base URL with the trailing slash the text client needs to resolve
    /// endpoint paths under it instead of replacing its last segment.
    pub fn api_base_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

        pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\aicademy")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/aicademy")
    }
}
