//! flowsync_client - HTTP clients for the Flow API and S3 object storage.

pub mod client;
pub mod error;
pub mod s3;
pub mod signing;

pub use client::{DeviceIdentity, FlowClient};
pub use error::{ClientError, Result};
pub use s3::{S3ProxyStore, S3Store};
pub use signing::{HmacRequestSigner, QuerySigner, RequestSigner};

#[cfg(test)]
pub(crate) mod testing;
