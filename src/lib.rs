//! Vidforge - Video generation job submission tool
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod video;
