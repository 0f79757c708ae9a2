//! Core type definitions for video generation tasks.
//!
//! Task statuses use the provider's upper-case wire spelling when serialized.
//! Aspect ratios serialize as `W:H` strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a remote generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Accepted by the provider, waiting for a worker.
    #[serde(rename = "QUEUED")]
    Queued,
    /// Currently rendering.
    #[serde(rename = "RUNNING")]
    Running,
    /// Finished; results are available.
    #[serde(rename = "SUCCESS")]
    Succeeded,
    /// Finished with an error.
    #[serde(rename = "FAILED")]
    Failed,
}

impl TaskStatus {
    /// Whether no further status changes are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Lowercase name used for local bookkeeping rows.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "QUEUED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Error returned when a status string is not one the provider documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(Self::Queued),
            "RUNNING" => Ok(Self::Running),
            "SUCCESS" => Ok(Self::Succeeded),
            "FAILED" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Output frame shape requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// All ratios the provider renders.
    pub fn all() -> &'static [AspectRatio] {
        &[AspectRatio::Landscape, AspectRatio::Portrait]
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landscape => write!(f, "16:9"),
            Self::Portrait => write!(f, "9:16"),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::all()
            .iter()
            .copied()
            .find(|r| r.to_string() == s.trim())
            .ok_or_else(|| format!("unsupported aspect ratio: {}", s))
    }
}

/// Which kinds of submission a caller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Pick text-to-video without images and image-to-video with them.
    #[default]
    Auto,
    /// Only text-to-video.
    Text,
    /// Only image-to-video.
    Image,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}
