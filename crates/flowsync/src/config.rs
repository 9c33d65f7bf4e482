use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Flow server base URL (default: "http://localhost:8888")
    pub server_url: String,
    /// Instance name, used in storage proxy paths (default: "akvoflow-dev")
    pub instance: String,
    /// Key used to sign API queries
    pub api_key: String,
    /// Device name assigned by the instance administrator
    pub device_id: String,
    /// Hardware identifier sent with data point requests
    pub android_id: String,
    /// Storage proxy base URL (default: "http://localhost:8888/s3")
    pub s3_proxy_url: String,
    /// Bucket for direct signed uploads. The proxy is used when unset.
    pub s3_bucket: Option<String>,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    /// Root of the local file tree (default: "flowsync-data")
    pub data_dir: PathBuf,
    /// Path to SQLite database file (default: "flowsync.db")
    pub sqlite_path: String,
    /// Maximum uploads in flight (default: 4)
    pub upload_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FLOW_SERVER_URL` - Flow server base URL (default: "http://localhost:8888")
    /// - `FLOW_INSTANCE` - Instance name (default: "akvoflow-dev")
    /// - `FLOW_API_KEY` - Query signing key (default: "")
    /// - `FLOW_DEVICE_ID` - Device name (default: "")
    /// - `FLOW_ANDROID_ID` - Hardware identifier (default: "")
    /// - `FLOW_S3_PROXY_URL` - Storage proxy URL (default: "http://localhost:8888/s3")
    /// - `FLOW_S3_BUCKET` - Bucket for direct uploads (default: unset)
    /// - `FLOW_S3_ACCESS_KEY` / `FLOW_S3_SECRET_KEY` - Bucket credentials (default: "")
    /// - `FLOW_DATA_DIR` - Local file tree (default: "flowsync-data")
    /// - `SQLITE_PATH` - SQLite database path (default: "flowsync.db")
    /// - `UPLOAD_CONCURRENCY` - Uploads in flight (default: 4)
    pub fn from_env() -> Self {
        Self {
            server_url: env::var("FLOW_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8888".to_string()),
            instance: env::var("FLOW_INSTANCE").unwrap_or_else(|_| "akvoflow-dev".to_string()),
            api_key: env::var("FLOW_API_KEY").unwrap_or_default(),
            device_id: env::var("FLOW_DEVICE_ID").unwrap_or_default(),
            android_id: env::var("FLOW_ANDROID_ID").unwrap_or_default(),
            s3_proxy_url: env::var("FLOW_S3_PROXY_URL")
                .unwrap_or_else(|_| "http://localhost:8888/s3".to_string()),
            s3_bucket: env::var("FLOW_S3_BUCKET").ok().filter(|b| !b.is_empty()),
            s3_access_key: env::var("FLOW_S3_ACCESS_KEY").unwrap_or_default(),
            s3_secret_key: env::var("FLOW_S3_SECRET_KEY").unwrap_or_default(),
            data_dir: env::var("FLOW_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("flowsync-data")),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "flowsync.db".to_string()),
            upload_concurrency: env::var("UPLOAD_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(4),
        }
    }

    /// Endpoint of the configured bucket, `https://<bucket>.s3.amazonaws.com`.
    pub fn s3_endpoint(&self) -> Option<String> {
        self.s3_bucket
            .as_ref()
            .map(|bucket| format!("https://{bucket}.s3.amazonaws.com"))
    }

    /// Installed form definitions.
    pub fn forms_dir(&self) -> PathBuf {
        self.data_dir.join("forms")
    }

    /// Cascade resources bundled with forms.
    pub fn resources_dir(&self) -> PathBuf {
        self.forms_dir().join("res")
    }

    /// Captured and downloaded media.
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }

    /// Exported archives waiting for upload.
    pub fn outbox_dir(&self) -> PathBuf {
        self.data_dir.join("outbox")
    }

    /// Operator-supplied bundles.
    pub fn bootstrap_dir(&self) -> PathBuf {
        self.data_dir.join("bootstrap")
    }

    /// Creates every local directory.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.resources_dir(),
            self.media_dir(),
            self.outbox_dir(),
            self.bootstrap_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
