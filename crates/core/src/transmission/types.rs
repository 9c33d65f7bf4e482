use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upload state of a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransmissionStatus {
    /// Queued, not attempted yet.
    Pending,
    /// Upload in progress.
    Requested,
    Sent,
    Failed,
}

impl TransmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransmissionStatus::Pending => "pending",
            TransmissionStatus::Requested => "requested",
            TransmissionStatus::Sent => "sent",
            TransmissionStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TransmissionStatus::Pending),
            "requested" => Some(TransmissionStatus::Requested),
            "sent" => Some(TransmissionStatus::Sent),
            "failed" => Some(TransmissionStatus::Failed),
            _ => None,
        }
    }

    /// Everything except `Sent` is picked up by the next sync.
    pub fn is_unsynced(&self) -> bool {
        !matches!(self, TransmissionStatus::Sent)
    }
}

/// One file queued for upload, owned by a form instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    pub id: Option<i64>,
    pub form_instance_id: i64,
    pub form_id: String,
    /// File name, unique across transmissions.
    pub filename: String,
    pub status: TransmissionStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Transmission {
    /// A pending transmission for `filename`.
    pub fn pending(form_instance_id: i64, form_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: None,
            form_instance_id,
            form_id: form_id.into(),
            filename: filename.into(),
            status: TransmissionStatus::Pending,
            start_date: None,
            end_date: None,
        }
    }
}
