//! Model catalogue and input validation.
//!
//! Validation happens before any image is decoded or any request is sent, so
//! a bad prompt never costs an upload.

use vidforge_common::{AspectRatio, GenerationMode};

use super::error::{Result, VideoError};
use super::types::{SubmissionKind, VideoConfig};

/// Capabilities of a provider model.
#[derive(Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    /// Durations in seconds the model accepts.
    pub durations: &'static [u32],
    pub aspect_ratios: &'static [AspectRatio],
    pub max_images: usize,
    pub text_to_video: bool,
    pub image_to_video: bool,
    /// Served from the `-pro` endpoint variants.
    pub pro: bool,
}

const LANDSCAPE_AND_PORTRAIT: &[AspectRatio] = &[AspectRatio::Landscape, AspectRatio::Portrait];

/// Models known to the RunningHub adapter.
pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "sora-2",
        durations: &[10, 15],
        aspect_ratios: LANDSCAPE_AND_PORTRAIT,
        max_images: 1,
        text_to_video: true,
        image_to_video: true,
        pro: true,
    },
    ModelSpec {
        name: "sora-2-standard",
        durations: &[10, 15],
        aspect_ratios: LANDSCAPE_AND_PORTRAIT,
        max_images: 1,
        text_to_video: true,
        image_to_video: true,
        pro: false,
    },
];

/// Look up a model by name.
pub fn find_model(name: &str) -> Option<&'static ModelSpec> {
    MODELS.iter().find(|m| m.name == name)
}

/// A validated request: the model it targets and the endpoint family to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub model: &'static ModelSpec,
    pub kind: SubmissionKind,
}

/// Check `input` against its model and decide between text- and
/// image-to-video.
pub fn validate_video_config(input: &VideoConfig) -> Result<SubmissionPlan> {
    if input.prompt.trim().is_empty() {
        return Err(VideoError::invalid("prompt must not be empty"));
    }

    let model = find_model(&input.model).ok_or_else(|| {
        let known: Vec<_> = MODELS.iter().map(|m| m.name).collect();
        VideoError::invalid(format!(
            "unknown model {:?} (expected one of: {})",
            input.model,
            known.join(", ")
        ))
    })?;

    if !model.durations.contains(&input.duration) {
        return Err(VideoError::invalid(format!(
            "model {} does not support a duration of {}s (supported: {:?})",
            model.name, input.duration, model.durations
        )));
    }

    if !model.aspect_ratios.contains(&input.aspect_ratio) {
        return Err(VideoError::invalid(format!(
            "model {} does not support aspect ratio {}",
            model.name, input.aspect_ratio
        )));
    }

    if input.images.len() > model.max_images {
        return Err(VideoError::invalid(format!(
            "model {} accepts at most {} reference image(s), got {}",
            model.name,
            model.max_images,
            input.images.len()
        )));
    }

    let has_images = !input.images.is_empty();
    let kind = match (input.mode, has_images) {
        (GenerationMode::Text, true) => {
            return Err(VideoError::invalid(
                "text-to-video requests cannot carry reference images",
            ))
        }
        (GenerationMode::Image, false) => {
            return Err(VideoError::invalid(
                "image-to-video requests need a reference image",
            ))
        }
        (_, true) => SubmissionKind::ImageToVideo,
        (_, false) => SubmissionKind::TextToVideo,
    };

    match kind {
        SubmissionKind::TextToVideo if !model.text_to_video => Err(VideoError::invalid(format!(
            "model {} requires a reference image",
            model.name
        ))),
        SubmissionKind::ImageToVideo if !model.image_to_video => Err(VideoError::invalid(
            format!("model {} does not accept reference images", model.name),
        )),
        _ => Ok(SubmissionPlan { model, kind }),
    }
}
