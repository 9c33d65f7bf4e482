//! Form header download.

use flowsync_core::form::FormHeader;

use super::{encode_query, FlowClient};
use crate::error::{ClientError, Result};

const SURVEY_MANAGER_PATH: &str = "/surveymanager";

impl FlowClient {
    /// Fetch the headers of every form assigned to the device.
    pub async fn download_form_headers(&self) -> Result<Vec<FormHeader>> {
        let mut params = vec![("action", "getAvailableSurveysDevice".to_string())];
        params.extend(self.device_params());

        let body = self.get_text(SURVEY_MANAGER_PATH, &params).await?;
        FormHeader::parse_many(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Fetch the header of a single form.
    pub async fn download_form_header(&self, form_id: &str) -> Result<FormHeader> {
        let mut params = vec![("action", "getSurveyHeader".to_string())];
        params.extend(self.device_params());
        params.push(("surveyId", form_id.to_string()));

        let body = self.get_text(SURVEY_MANAGER_PATH, &params).await?;
        FormHeader::parse_one(body.trim()).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn get_text(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let response = self
            .client
            .get(format!("{}?{}", self.url(path), encode_query(params)))
            .send()
            .await?;
        self.handle_text_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::routing::get;
    use axum::Router;

    use super::*;
    use crate::client::DeviceIdentity;
    use crate::testing::spawn_stub;

    fn router() -> Router {
        Router::new().route(
            SURVEY_MANAGER_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                match params.get("action").map(String::as_str) {
                    Some("getAvailableSurveysDevice") => {
                        ",1,Households,en,2.0,10,Census,true,\n,2,Wells,en,1.0,11,Water,false,\n"
                            .to_string()
                    }
                    Some("getSurveyHeader") => {
                        let id = params.get("surveyId").cloned().unwrap_or_default();
                        format!("{id},Single,en,3.0,12,Group,false,")
                    }
                    _ => "garbage".to_string(),
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_download_form_headers() {
        let base_url = spawn_stub(router()).await;
        let client = FlowClient::new(base_url, "key", DeviceIdentity::default());

        let headers = client.download_form_headers().await.unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].name, "Households");
        assert!(!headers[1].monitored);
    }

    #[tokio::test]
    async fn test_download_single_form_header() {
        let base_url = spawn_stub(router()).await;
        let client = FlowClient::new(base_url, "key", DeviceIdentity::default());

        let header = client.download_form_header("77").await.unwrap();

        assert_eq!(header.id, "77");
        assert_eq!(header.version, 3.0);
    }
}
