use std::sync::Arc;

use flowsync_core::sync::{ConnectivityCheck, DownloadResult, SyncError, TransportError};

use super::DataPointDataRepository;

/// Use case behind the "sync data points" action.
pub struct DownloadDataPoints {
    connectivity: Arc<dyn ConnectivityCheck>,
    repository: DataPointDataRepository,
}

impl DownloadDataPoints {
    pub fn new(connectivity: Arc<dyn ConnectivityCheck>, repository: DataPointDataRepository) -> Self {
        Self {
            connectivity,
            repository,
        }
    }

    /// Downloads the data points of `survey_id`.
    ///
    /// Only a missing survey id is returned as an error. Network and server failures
    /// come back as a result code so the caller can tell offline, unassigned and
    /// generic failures apart.
    pub async fn execute(&self, survey_id: Option<i64>) -> Result<DownloadResult, SyncError> {
        let survey_id = survey_id.ok_or(SyncError::MissingParameter("surveyId"))?;

        if !self.connectivity.is_connected().await {
            tracing::warn!(survey_id, "No network, skipping data point download");
            return Ok(DownloadResult::no_network());
        }

        match self.repository.download_data_points(survey_id).await {
            Ok(count) => Ok(DownloadResult::success(count)),
            Err(SyncError::Transport(TransportError::AssignmentRequired)) => {
                tracing::warn!(survey_id, "Device is not assigned to survey");
                Ok(DownloadResult::assignment_missing())
            }
            Err(e) => {
                tracing::error!(survey_id, error = %e, "Data point download failed");
                Ok(DownloadResult::generic_error())
            }
        }
    }
}
