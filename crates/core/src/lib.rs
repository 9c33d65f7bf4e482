//! Functional core for flowsync.
//!
//! Pure domain types and functions for offline survey responses, plus the async
//! traits implemented by the storage and network shells.

pub mod bootstrap;
pub mod cascade;
pub mod form;
pub mod response;
pub mod serde;
pub mod storage;
pub mod sync;
pub mod transmission;
