//! App version metadata and server time.

use serde::{Deserialize, Serialize};

use super::{encode_query, FlowClient};
use crate::error::Result;

const APK_PATH: &str = "/deviceapprest";
const SERVER_TIME_PATH: &str = "/devicetimerest";

/// Latest published app build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkData {
    pub version: String,
    pub file_name: String,
    #[serde(default)]
    pub md5_checksum: Option<String>,
}

/// Server clock, used to detect skewed device clocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTime {
    pub time: String,
}

impl FlowClient {
    /// Fetch metadata of the latest app build.
    pub async fn get_apk_data(&self) -> Result<ApkData> {
        let params = [
            ("action", "getLatestVersion".to_string()),
            ("appCode", "flowapp".to_string()),
            ("deviceType", "androidPhone".to_string()),
        ];
        let response = self
            .client
            .get(format!("{}?{}", self.url(APK_PATH), encode_query(&params)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Fetch the server time.
    pub async fn get_server_time(&self) -> Result<ServerTime> {
        let response = self.client.get(self.url(SERVER_TIME_PATH)).send().await?;
        self.handle_response(response).await
    }
}
