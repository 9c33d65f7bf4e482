use serde::Serialize;

/// Outcome class of a data point download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    /// No connectivity; nothing was attempted.
    ErrorNoNetwork,
    /// The device is not assigned to the survey.
    ErrorAssignmentMissing,
    /// Any other failure. Details are in the logs.
    ErrorGeneric,
}

/// Result of a data point download, with the number of data points stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub code: ResultCode,
    pub count: usize,
}

impl DownloadResult {
    pub fn success(count: usize) -> Self {
        Self {
            code: ResultCode::Success,
            count,
        }
    }

    pub fn no_network() -> Self {
        Self {
            code: ResultCode::ErrorNoNetwork,
            count: 0,
        }
    }

    pub fn assignment_missing() -> Self {
        Self {
            code: ResultCode::ErrorAssignmentMissing,
            count: 0,
        }
    }

    pub fn generic_error() -> Self {
        Self {
            code: ResultCode::ErrorGeneric,
            count: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }
}
