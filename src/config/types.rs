use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::video::poll::PollOptions;

pub const DEFAULT_BASE_URL: &str = "https://www.runninghub.cn";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Bearer token for the provider API (overridden by `VIDFORGE_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when the command line doesn't name one
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub image_to_video_url: Option<String>,

    #[serde(default)]
    pub text_to_video_url: Option<String>,

    /// Status endpoint; `{id}` is replaced with the task id
    #[serde(default)]
    pub query_url: Option<String>,

    #[serde(default)]
    pub upload_url: Option<String>,

    /// Legacy `image-to-video|text-to-video|query` override string
    #[serde(default)]
    pub endpoints: Option<String>,

    /// Per-request timeout in seconds (default: 60)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "sora-2".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            image_to_video_url: None,
            text_to_video_url: None,
            query_url: None,
            upload_url: None,
            endpoints: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_interval() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    120
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl From<&PollingConfig> for PollOptions {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Largest reference image the provider accepts, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    crate::video::image::MAX_UPLOAD_BYTES
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file for bookkeeping and `fix-db`
    #[serde(default)]
    pub path: Option<PathBuf>,
}
