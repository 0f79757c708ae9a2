//! Vidforge-Common: Shared types and error handling.
//!
//! This crate provides functionality used by both the database layer and the
//! video submission adapter:
//!
//! - **Typed IDs**: [`TaskId`] wraps the opaque identifier of a remote job
//! - **Core Types**: Task status, aspect ratio, and generation mode enums
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use vidforge_common::{AspectRatio, TaskId, TaskStatus};
//!
//! let id = TaskId::from("1988123456");
//! let status: TaskStatus = "RUNNING".parse().unwrap();
//! assert!(!status.is_terminal());
//! assert_eq!(AspectRatio::Landscape.to_string(), "16:9");
//! assert_eq!(id.as_str(), "1988123456");
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
