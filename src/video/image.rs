//! Reference image decoding and size reduction.
//!
//! The provider rejects uploads above [`MAX_UPLOAD_BYTES`]. Oversized images
//! are re-encoded as JPEG at decreasing quality, then downscaled, until they
//! fit or every attempt has been spent.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use super::error::Result;

/// Upload size ceiling enforced by the provider (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// JPEG qualities tried before any downscaling: 90, 80, ... 20.
const QUALITY_STEPS: [u8; 8] = [90, 80, 70, 60, 50, 40, 30, 20];

/// Quality used for downscaled output.
const DOWNSCALE_QUALITY: u8 = 80;

/// Number of downscale passes after the quality ladder is exhausted.
pub const MAX_DOWNSCALE_ATTEMPTS: u32 = 3;

/// Each downscale pass shrinks by at least this factor.
const MAX_SCALE: f64 = 0.9;

/// Bytes ready for upload.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    /// JPEG quality of the final encode, `None` if the input was passed through.
    pub quality: Option<u8>,
    /// Final dimensions when the image had to be downscaled.
    pub scaled_to: Option<(u32, u32)>,
    /// Whether `bytes` fits the requested ceiling.
    pub within_limit: bool,
}

/// Decode a `data:image/<fmt>;base64,` URL or bare base64 text.
pub fn decode_image_input(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(rest),
        None => trimmed,
    };
    Ok(STANDARD.decode(payload)?)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}

/// Shrink `data` until it is at most `max_bytes` long.
///
/// Input that already fits is returned untouched. Otherwise the result is
/// either within the ceiling or the output of the last downscale pass, with
/// `within_limit` set accordingly.
pub fn compress_for_upload(data: &[u8], max_bytes: usize) -> Result<CompressedImage> {
    if data.len() <= max_bytes {
        return Ok(CompressedImage {
            bytes: data.to_vec(),
            quality: None,
            scaled_to: None,
            within_limit: true,
        });
    }

    // JPEG has no alpha channel.
    let img = DynamicImage::ImageRgb8(image::load_from_memory(data)?.to_rgb8());

    let mut last = Vec::new();
    for quality in QUALITY_STEPS {
        last = encode_jpeg(&img, quality)?;
        debug!(quality, size = last.len(), max_bytes, "Re-encoded image");
        if last.len() <= max_bytes {
            return Ok(CompressedImage {
                bytes: last,
                quality: Some(quality),
                scaled_to: None,
                within_limit: true,
            });
        }
    }

    let mut current = img;
    for attempt in 1..=MAX_DOWNSCALE_ATTEMPTS {
        let scale = (max_bytes as f64 / last.len() as f64).sqrt().min(MAX_SCALE);
        let width = ((current.width() as f64 * scale).floor() as u32).max(1);
        let height = ((current.height() as f64 * scale).floor() as u32).max(1);

        // `resize` keeps the aspect ratio and fits inside the bounds.
        current = current.resize(width, height, FilterType::Lanczos3);
        last = encode_jpeg(&current, DOWNSCALE_QUALITY)?;
        debug!(
            attempt,
            width = current.width(),
            height = current.height(),
            size = last.len(),
            "Downscaled image"
        );

        if last.len() <= max_bytes {
            return Ok(CompressedImage {
                bytes: last,
                quality: Some(DOWNSCALE_QUALITY),
                scaled_to: Some((current.width(), current.height())),
                within_limit: true,
            });
        }
    }

    warn!(
        size = last.len(),
        max_bytes, "Image still exceeds upload limit after all reduction attempts"
    );
    Ok(CompressedImage {
        bytes: last,
        quality: Some(DOWNSCALE_QUALITY),
        scaled_to: Some((current.width(), current.height())),
        within_limit: false,
    })
}
