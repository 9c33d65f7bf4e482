//! Incremental download of assigned data points.

mod connectivity;
mod datapoints;
mod download;

pub use connectivity::TcpConnectivity;
pub use datapoints::{DataPointDataRepository, DataPointStore};
pub use download::DownloadDataPoints;
