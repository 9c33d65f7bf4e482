//! Assigned data point download.

use flowsync_core::sync::DataPointPage;

use super::{encode_query, FlowClient};
use crate::error::Result;

const DATA_POINTS_PATH: &str = "/datapoints";

impl FlowClient {
    /// Fetch one page of data points assigned to this device.
    ///
    /// The query is HMAC-signed; parameters are kept in alphabetical order.
    pub async fn download_data_points(
        &self,
        survey_id: i64,
        cursor: Option<&str>,
    ) -> Result<DataPointPage> {
        let mut params = vec![("androidId", self.device.android_id.clone())];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        params.push(("surveyId", survey_id.to_string()));

        let query = self.signer.sign(&encode_query(&params))?;
        tracing::debug!(survey_id, cursor = cursor.unwrap_or(""), "Requesting data points");

        let response = self
            .client
            .get(format!("{}?{}", self.url(DATA_POINTS_PATH), query))
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};

    use super::*;
    use crate::client::DeviceIdentity;
    use crate::error::ClientError;
    use crate::testing::spawn_stub;

    fn device() -> DeviceIdentity {
        DeviceIdentity {
            android_id: "android-1".to_string(),
            ..DeviceIdentity::default()
        }
    }

    #[tokio::test]
    async fn test_download_data_points_sends_signed_query() {
        let router = Router::new().route(
            DATA_POINTS_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("androidId").map(String::as_str), Some("android-1"));
                assert_eq!(params.get("surveyId").map(String::as_str), Some("42"));
                assert_eq!(params.get("cursor").map(String::as_str), Some("c-0"));
                assert!(params.contains_key("ts"));
                assert!(params.contains_key("h"));
                Json(serde_json::json!({
                    "dataPointData": [{"id": "dp-1", "surveyGroupId": 42}],
                    "cursor": "c-1"
                }))
            }),
        );
        let base_url = spawn_stub(router).await;
        let client = FlowClient::new(base_url, "secret", device());

        let page = client.download_data_points(42, Some("c-0")).await.unwrap();

        assert_eq!(page.data_points.len(), 1);
        assert_eq!(page.cursor.as_deref(), Some("c-1"));
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_forbidden_error() {
        let router = Router::new().route(DATA_POINTS_PATH, get(|| async { StatusCode::FORBIDDEN }));
        let base_url = spawn_stub(router).await;
        let client = FlowClient::new(base_url, "secret", device());

        let err = client.download_data_points(42, None).await.unwrap_err();

        assert!(matches!(err, ClientError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let router = Router::new().route(
            DATA_POINTS_PATH,
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn_stub(router).await;
        let client = FlowClient::new(base_url, "secret", device());

        let err = client.download_data_points(42, None).await.unwrap_err();

        match err {
            ClientError::ServerError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected ServerError, got {other:?}"),
        }
    }
}
