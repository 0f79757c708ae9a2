//! Vidforge-DB: Database schema, migrations, and column repair
//!
//! This crate provides database functionality for vidforge using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Versioned schema migrations
//! - `columns` - Idempotent column checks and additions
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use vidforge_db::columns::{ensure_integer_column, ColumnOutcome};
//! use vidforge_db::pool::{get_conn, init_pool};
//!
//! let pool = init_pool("/var/lib/vidforge/vidforge.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let outcome = ensure_integer_column(&conn, "t_video", "time").unwrap();
//! assert_eq!(outcome, ColumnOutcome::AlreadyPresent);
//! ```

pub mod columns;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
