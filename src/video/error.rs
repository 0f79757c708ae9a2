//! Errors raised by the video submission adapter.

use thiserror::Error;

/// Failure of a single generation invocation.
///
/// Every variant is fatal to the current invocation; the only thing that is
/// ever retried is a status check that reports the task as still pending.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("missing API key for the video provider")]
    MissingApiKey,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("image upload failed: {0}")]
    Upload(String),

    #[error("task submission failed: {0}")]
    Submit(String),

    #[error("status query failed: {0}")]
    Query(String),

    /// The provider reported the task as failed, or finished without output.
    #[error("{0}")]
    TaskFailed(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("task still pending after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl VideoError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, VideoError>;
