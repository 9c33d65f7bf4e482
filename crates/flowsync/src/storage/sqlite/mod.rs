//! SQLite storage backend implementation.
//!
//! Implements the repository traits from `flowsync_core::storage` using `rusqlite` for
//! synchronous operations and `tokio-rusqlite` to run them on a dedicated thread.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteStore;
