use std::path::Path;

use async_trait::async_trait;

use crate::form::FormHeader;
use crate::transmission::{NotifyAction, S3File};

use super::error::TransportResult;
use super::types::{DataPointPage, PendingFiles};

/// Flow server endpoints consumed by the sync pipeline.
#[async_trait]
pub trait FlowApi: Send + Sync {
    /// Fetches one page of data points assigned to the device. `None` starts from scratch.
    async fn download_data_points(
        &self,
        survey_id: i64,
        cursor: Option<&str>,
    ) -> TransportResult<DataPointPage>;

    /// Fetches the headers of every form available to the device.
    async fn download_form_headers(&self) -> TransportResult<Vec<FormHeader>>;

    /// Fetches the header of a single form.
    async fn download_form_header(&self, form_id: &str) -> TransportResult<FormHeader>;

    /// Tells the server a file has been stored and can be processed.
    async fn notify_file_available(
        &self,
        action: NotifyAction,
        form_id: &str,
        filename: &str,
    ) -> TransportResult<()>;

    /// Lists files of `form_ids` the server never received, and forms it has deleted.
    async fn download_pending_files(&self, form_ids: &[String]) -> TransportResult<PendingFiles>;
}

/// Remote object storage for archives and media.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads the local file at `path`. Fails unless the server answers 2xx.
    async fn upload_file(&self, file: &S3File, form_id: &str, path: &Path) -> TransportResult<()>;

    /// Downloads a form definition archive.
    async fn download_archive(&self, filename: &str) -> TransportResult<Vec<u8>>;

    /// Downloads a media file.
    async fn download_media(&self, filename: &str) -> TransportResult<Vec<u8>>;

    /// Downloads an image. Images share the media folder.
    async fn download_image(&self, filename: &str) -> TransportResult<Vec<u8>> {
        self.download_media(filename).await
    }
}

/// Reports whether the device can reach the network.
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    async fn is_connected(&self) -> bool;
}
