//! HTTP client for the Flow API.

pub mod datapoints;
pub mod device;
pub mod forms;
pub mod notifications;

use async_trait::async_trait;
use flowsync_core::form::FormHeader;
use flowsync_core::sync::{DataPointPage, FlowApi, PendingFiles, TransportResult};
use flowsync_core::transmission::NotifyAction;

use crate::error::{ClientError, Result};
use crate::signing::QuerySigner;

/// Identifiers the server uses to recognise the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub android_id: String,
    pub imei: String,
    pub phone_number: String,
    /// Device name assigned by the instance administrator.
    pub device_id: String,
    pub app_version: String,
}

/// HTTP client for the Flow API.
#[derive(Debug, Clone)]
pub struct FlowClient {
    client: reqwest::Client,
    base_url: String,
    device: DeviceIdentity,
    signer: QuerySigner,
}

impl FlowClient {
    /// Create a new client with the given base URL and instance API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, device: DeviceIdentity) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            device,
            signer: QuerySigner::new(api_key),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Device parameters sent with the legacy endpoints.
    fn device_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("androidId", self.device.android_id.clone()),
            ("devId", self.device.device_id.clone()),
            ("imei", self.device.imei.clone()),
            ("phoneNumber", self.device.phone_number.clone()),
            ("ver", self.device.app_version.clone()),
        ]
    }

    /// Handle JSON responses.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = check_status(response).await?;
        response.json().await.map_err(ClientError::from)
    }

    /// Handle plain-text responses.
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let response = check_status(response).await?;
        response.text().await.map_err(ClientError::from)
    }
}

/// Map non-success statuses to errors.
///
/// 403 means the device is not allowed to see the resource; the sync layer reads it as
/// a missing assignment.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let resource = response.url().path().to_string();
    match status.as_u16() {
        403 => Err(ClientError::Forbidden { resource }),
        404 => Err(ClientError::NotFound { resource }),
        code => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ClientError::ServerError {
                status: code,
                message,
            })
        }
    }
}

/// Encodes query parameters in the given order.
pub(crate) fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

// ============================================================================
// FlowApi implementation
// ============================================================================

#[async_trait]
impl FlowApi for FlowClient {
    async fn download_data_points(
        &self,
        survey_id: i64,
        cursor: Option<&str>,
    ) -> TransportResult<DataPointPage> {
        Ok(FlowClient::download_data_points(self, survey_id, cursor).await?)
    }

    async fn download_form_headers(&self) -> TransportResult<Vec<FormHeader>> {
        Ok(FlowClient::download_form_headers(self).await?)
    }

    async fn download_form_header(&self, form_id: &str) -> TransportResult<FormHeader> {
        Ok(FlowClient::download_form_header(self, form_id).await?)
    }

    async fn notify_file_available(
        &self,
        action: NotifyAction,
        form_id: &str,
        filename: &str,
    ) -> TransportResult<()> {
        Ok(FlowClient::notify_file_available(self, action, form_id, filename).await?)
    }

    async fn download_pending_files(&self, form_ids: &[String]) -> TransportResult<PendingFiles> {
        Ok(FlowClient::pending_files(self, form_ids).await?)
    }
}
