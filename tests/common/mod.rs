//! Shared helpers for integration tests.
//!
//! Provides a config pointed at a [`MockServer`] and small in-memory test
//! images.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use vidforge::config::Config;
use wiremock::MockServer;

pub const API_KEY: &str = "sk-test";
pub const BEARER: &str = "Bearer sk-test";

pub const UPLOAD_PATH: &str = "/openapi/v2/media/upload/binary";
pub const T2V_PRO_PATH: &str = "/openapi/v2/rhart-video-s/text-to-video-pro";
pub const I2V_PRO_PATH: &str = "/openapi/v2/rhart-video-s/image-to-video-pro";
pub const T2V_PATH: &str = "/openapi/v2/rhart-video-s/text-to-video";

/// Config that talks to `server`, authenticates, and polls without sleeping.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.provider.api_key = Some(API_KEY.to_string());
    config.provider.base_url = server.uri();
    config.polling.interval_secs = 0;
    config.polling.max_attempts = 5;
    config
}

/// A small solid-colour PNG.
pub fn small_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, image::Rgb([20, 120, 220]));
    encode_png(img)
}

/// A PNG full of pseudo-random noise; compresses badly.
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0xDEAD_BEEF;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    encode_png(img)
}

fn encode_png(img: RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("failed to encode test png");
    buf.into_inner()
}

/// Byte-slice substring search.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Task path for a given id.
pub fn task_path(id: &str) -> String {
    format!("/openapi/v2/rhart-video-s/{}", id)
}
