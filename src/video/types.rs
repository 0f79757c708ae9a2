//! Request and result shapes for video generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vidforge_common::{AspectRatio, GenerationMode, TaskId};

/// A reference image supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    /// A `data:image/...;base64,` URL or bare base64 text.
    Encoded(String),
    /// Raw file contents.
    Bytes(Vec<u8>),
}

/// Everything needed to ask the provider for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConfig {
    pub prompt: String,
    pub images: Vec<ImageInput>,
    /// Requested length in seconds.
    pub duration: u32,
    pub aspect_ratio: AspectRatio,
    pub model: String,
    pub mode: GenerationMode,
}

impl VideoConfig {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            duration: 10,
            aspect_ratio: AspectRatio::default(),
            model: model.into(),
            mode: GenerationMode::Auto,
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Which provider endpoint a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    TextToVideo,
    ImageToVideo,
}

/// Body of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub prompt: String,
    /// The provider expects the duration as a string.
    pub duration: String,
    pub aspect_ratio: AspectRatio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Outcome of the submit call.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The provider finished synchronously.
    Completed {
        task_id: Option<TaskId>,
        video_url: String,
    },
    /// The task was accepted and must be polled.
    Pending { task_id: TaskId },
}

/// Result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PollState {
    Completed { video_url: String },
    Pending,
    Failed { message: String },
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A finished generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub task_id: Option<TaskId>,
    pub video_url: String,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}
