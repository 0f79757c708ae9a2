//! Database query modules.
//!
//! - videos: Generated video bookkeeping

pub mod videos;
