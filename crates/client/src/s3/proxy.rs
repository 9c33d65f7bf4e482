use std::path::Path;

use async_trait::async_trait;
use flowsync_core::sync::{ObjectStore, TransportResult};
use flowsync_core::transmission::{download_path, S3File, FORMS_FOLDER, MEDIA_FOLDER};
use reqwest::multipart::{Form, Part};

use crate::client::check_status;
use crate::error::Result;

/// Object storage reached through the instance's storage proxy.
#[derive(Debug, Clone)]
pub struct S3ProxyStore {
    client: reqwest::Client,
    base_url: String,
    instance: String,
}

impl S3ProxyStore {
    pub fn new(base_url: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            instance: instance.into(),
        }
    }

    /// Uploads `path` as a multipart `file` field.
    pub async fn put_file(&self, file: &S3File, form_id: &str, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file.filename.clone())
            .mime_str(file.content_type)?;
        let form = Form::new().part("file", part);

        let url = format!("{}{}", self.base_url, file.proxy_path(&self.instance, form_id));
        let response = self.client.put(&url).multipart(form).send().await?;
        check_status(response).await?;

        tracing::info!(
            filename = %file.filename,
            folder = file.folder,
            size,
            "Uploaded file through storage proxy"
        );
        Ok(())
    }

    async fn get_file(&self, folder: &str, filename: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}{}",
            self.base_url,
            download_path(&self.instance, folder, filename)
        );
        let result: Result<Vec<u8>> = async {
            let response = self.client.get(&url).send().await?;
            let response = check_status(response).await?;
            Ok(response.bytes().await?.to_vec())
        }
        .await;

        if let Err(ref e) = result {
            tracing::error!(error = %e, folder, filename, "Storage proxy download failed");
        }
        result
    }
}

#[async_trait]
impl ObjectStore for S3ProxyStore {
    async fn upload_file(&self, file: &S3File, form_id: &str, path: &Path) -> TransportResult<()> {
        Ok(self.put_file(file, form_id, path).await?)
    }

    async fn download_archive(&self, filename: &str) -> TransportResult<Vec<u8>> {
        Ok(self.get_file(FORMS_FOLDER, filename).await?)
    }

    async fn download_media(&self, filename: &str) -> TransportResult<Vec<u8>> {
        Ok(self.get_file(MEDIA_FOLDER, filename).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::{Path as AxumPath, State};
    use axum::http::StatusCode;
    use axum::routing::{get, put};
    use axum::Router;
    use flowsync_core::sync::TransportError;

    use super::*;
    use crate::testing::spawn_stub;

    type Received = Arc<Mutex<Vec<(String, Vec<u8>)>>>;

    async fn record_upload(
        State(received): State<Received>,
        AxumPath(path): AxumPath<String>,
        body: Bytes,
    ) -> StatusCode {
        received.lock().unwrap().push((path, body.to_vec()));
        StatusCode::OK
    }

    #[tokio::test]
    async fn test_upload_puts_multipart_to_folder_path() {
        let received: Received = Arc::default();
        let router = Router::new()
            .route("/{*path}", put(record_upload))
            .with_state(received.clone());
        let base_url = spawn_stub(router).await;
        let store = S3ProxyStore::new(base_url, "akvoflow-1");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.zip");
        std::fs::write(&path, b"zip-bytes").unwrap();
        let file = S3File::classify("abc.zip").unwrap();

        store.upload_file(&file, "1001", &path).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "akvoflow-1/devicezip/1001/abc.zip");
        let body = String::from_utf8_lossy(&received[0].1);
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("filename=\"abc.zip\""));
        assert!(body.contains("zip-bytes"));
    }

    #[tokio::test]
    async fn test_upload_fails_on_server_error() {
        let router = Router::new().route(
            "/{*path}",
            put(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn_stub(router).await;
        let store = S3ProxyStore::new(base_url, "akvoflow-1");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.jpg");
        std::fs::write(&path, b"jpg").unwrap();
        let file = S3File::classify("pic.jpg").unwrap();

        let err = store.upload_file(&file, "1001", &path).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::Http {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_missing_local_file() {
        let store = S3ProxyStore::new("http://127.0.0.1:9", "akvoflow-1");
        let file = S3File::classify("gone.zip").unwrap();
        let err = store
            .upload_file(&file, "1", Path::new("/nonexistent/gone.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[tokio::test]
    async fn test_downloads_use_folder_paths() {
        let router = Router::new()
            .route(
                "/akvoflow-1/surveys/1001.zip",
                get(|| async { Bytes::from_static(b"archive") }),
            )
            .route(
                "/akvoflow-1/images/pic.jpg",
                get(|| async { Bytes::from_static(b"image") }),
            );
        let base_url = spawn_stub(router).await;
        let store = S3ProxyStore::new(base_url, "akvoflow-1");

        assert_eq!(store.download_archive("1001.zip").await.unwrap(), b"archive");
        assert_eq!(store.download_image("pic.jpg").await.unwrap(), b"image");
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let base_url = spawn_stub(Router::new()).await;
        let store = S3ProxyStore::new(base_url, "akvoflow-1");

        let err = store.download_media("missing.jpg").await.unwrap_err();
        assert!(matches!(err, TransportError::NotFound(_)));
    }
}
