//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated video record (`t_video`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: i64,
    pub prompt: String,
    pub model: String,
    pub duration: i64,
    pub aspect_ratio: String,
    pub task_id: Option<String>,
    pub state: String,
    pub file_url: Option<String>,
    pub error_reason: Option<String>,
    /// Wall-clock generation time in seconds.
    pub time: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when a video submission starts.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub prompt: String,
    pub model: String,
    pub duration: i64,
    pub aspect_ratio: String,
}
