//! Processing notifications sent after a file reaches storage, and the device
//! notification listing files the server is still waiting for.

use flowsync_core::sync::PendingFiles;
use flowsync_core::transmission::NotifyAction;

use super::{check_status, encode_query, FlowClient};
use crate::error::Result;

const PROCESSOR_PATH: &str = "/processor";
const DEVICE_NOTIFICATION_PATH: &str = "/devicenotification";

impl FlowClient {
    /// Tell the server that `filename` was uploaded for `form_id`.
    pub async fn notify_file_available(
        &self,
        action: NotifyAction,
        form_id: &str,
        filename: &str,
    ) -> Result<()> {
        let mut params = vec![
            ("action", action.as_str().to_string()),
            ("fileName", filename.to_string()),
            ("formID", form_id.to_string()),
        ];
        params.extend(self.device_params());

        let response = self
            .client
            .get(format!("{}?{}", self.url(PROCESSOR_PATH), encode_query(&params)))
            .send()
            .await?;
        check_status(response).await?;
        tracing::debug!(form_id, filename, action = action.as_str(), "Notified file available");
        Ok(())
    }

    /// Files of `form_ids` the server never received, and forms it has deleted.
    pub async fn pending_files(&self, form_ids: &[String]) -> Result<PendingFiles> {
        let mut params = self.device_params();
        params.extend(form_ids.iter().map(|id| ("formId", id.clone())));

        let response = self
            .client
            .get(format!(
                "{}?{}",
                self.url(DEVICE_NOTIFICATION_PATH),
                encode_query(&params)
            ))
            .send()
            .await?;
        let pending: PendingFiles = self.handle_response(response).await?;
        tracing::debug!(
            missing = pending.missing_files.len() + pending.missing_unknown.len(),
            deleted = pending.deleted_forms.len(),
            "Fetched device notification"
        );
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::routing::get;
    use axum::Router;

    use super::*;
    use crate::client::DeviceIdentity;
    use crate::testing::spawn_stub;

    #[tokio::test]
    async fn test_notify_sends_action_form_and_file() {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
        let router = Router::new()
            .route(
                PROCESSOR_PATH,
                get(
                    |State(seen): State<Arc<Mutex<Vec<HashMap<String, String>>>>>,
                     Query(params): Query<HashMap<String, String>>| async move {
                        seen.lock().unwrap().push(params);
                        "OK"
                    },
                ),
            )
            .with_state(seen.clone());
        let base_url = spawn_stub(router).await;
        let device = DeviceIdentity {
            device_id: "tablet-3".to_string(),
            ..DeviceIdentity::default()
        };
        let client = FlowClient::new(base_url, "key", device);

        client
            .notify_file_available(NotifyAction::Submit, "1001", "abc.zip")
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["action"], "submit");
        assert_eq!(seen[0]["formID"], "1001");
        assert_eq!(seen[0]["fileName"], "abc.zip");
        assert_eq!(seen[0]["devId"], "tablet-3");
    }

    #[tokio::test]
    async fn test_pending_files_sends_every_form_id() {
        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
        let router = Router::new()
            .route(
                DEVICE_NOTIFICATION_PATH,
                get(
                    |State(seen): State<Arc<Mutex<Vec<(String, String)>>>>,
                     Query(params): Query<Vec<(String, String)>>| async move {
                        *seen.lock().unwrap() = params;
                        r#"{"missingFiles":["/storage/a.jpg"],"missingUnknown":[],"deletedForms":[1001]}"#
                    },
                ),
            )
            .with_state(seen.clone());
        let base_url = spawn_stub(router).await;
        let client = FlowClient::new(base_url, "key", DeviceIdentity::default());

        let pending = client
            .pending_files(&["1001".to_string(), "1002".to_string()])
            .await
            .unwrap();

        assert_eq!(pending.missing_files, vec!["/storage/a.jpg"]);
        assert_eq!(pending.deleted_forms, vec!["1001"]);
        let form_ids: Vec<String> = seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key == "formId")
            .map(|(_, value)| value.clone())
            .collect();
        assert_eq!(form_ids, vec!["1001", "1002"]);
    }

    #[tokio::test]
    async fn test_pending_files_rejects_malformed_body() {
        let router = Router::new().route(DEVICE_NOTIFICATION_PATH, get(|| async { "{abcd}" }));
        let base_url = spawn_stub(router).await;
        let client = FlowClient::new(base_url, "key", DeviceIdentity::default());

        assert!(client.pending_files(&[]).await.is_err());
    }
}
