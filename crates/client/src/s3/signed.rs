use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use flowsync_core::sync::{ObjectStore, TransportResult};
use flowsync_core::transmission::{S3File, FORMS_FOLDER, MEDIA_FOLDER};

use super::{verify_etag, BodyDigest};
use crate::client::check_status;
use crate::error::Result;
use crate::signing::{RequestSigner, SignedMethod, StorageRequest};

/// Object storage reached directly with signed requests.
#[derive(Clone)]
pub struct S3Store {
    client: reqwest::Client,
    /// Bucket endpoint, e.g. `https://<bucket>.s3.amazonaws.com`.
    endpoint: String,
    bucket: String,
    signer: Arc<dyn RequestSigner>,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            signer,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key)
    }

    /// Stores `path` under the file's object key and checks the returned ETag.
    pub async fn put_object(&self, file: &S3File, path: &Path) -> Result<()> {
        let body = tokio::fs::read(path).await?;
        let digest = BodyDigest::of(&body);
        let key = file.object_key();
        let date = self.signer.date();

        let authorization = self.signer.authorization(&StorageRequest {
            method: SignedMethod::Put,
            bucket: &self.bucket,
            key: &key,
            date: &date,
            content_md5: &digest.base64,
            content_type: file.content_type,
            public: file.public,
        })?;

        let mut request = self
            .client
            .put(self.object_url(&key))
            .header("Date", &date)
            .header("Content-MD5", &digest.base64)
            .header("Content-Type", file.content_type)
            .header("Authorization", authorization);
        if file.public {
            request = request.header("x-amz-acl", "public-read");
        }

        let response = check_status(request.body(body).send().await?).await?;
        let etag = response
            .headers()
            .get("ETag")
            .and_then(|value| value.to_str().ok());
        verify_etag(&file.filename, &digest.hex, etag)?;

        tracing::info!(key = %key, public = file.public, "Stored object");
        Ok(())
    }

    /// Fetches `<folder>/<filename>`.
    pub async fn get_object(&self, folder: &str, filename: &str) -> Result<Vec<u8>> {
        let key = format!("{folder}/{filename}");
        let date = self.signer.date();
        let authorization = self.signer.authorization(&StorageRequest {
            method: SignedMethod::Get,
            bucket: &self.bucket,
            key: &key,
            date: &date,
            content_md5: "",
            content_type: "",
            public: false,
        })?;

        let response = self
            .client
            .get(self.object_url(&key))
            .header("Date", &date)
            .header("Authorization", authorization)
            .send()
            .await?;
        let response = check_status(response).await.inspect_err(|e| {
            tracing::error!(error = %e, key = %key, "Object download failed");
        })?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload_file(&self, file: &S3File, _form_id: &str, path: &Path) -> TransportResult<()> {
        Ok(self.put_object(file, path).await?)
    }

    async fn download_archive(&self, filename: &str) -> TransportResult<Vec<u8>> {
        Ok(self.get_object(FORMS_FOLDER, filename).await?)
    }

    async fn download_media(&self, filename: &str) -> TransportResult<Vec<u8>> {
        Ok(self.get_object(MEDIA_FOLDER, filename).await?)
    }
}
