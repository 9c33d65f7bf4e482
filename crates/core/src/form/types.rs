use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a form instance.
///
/// `Draft -> Submitted -> Requested -> Sent`. `Downloaded` instances come from the
/// server and never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormInstanceStatus {
    Draft,
    Submitted,
    Requested,
    Sent,
    Downloaded,
}

impl FormInstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormInstanceStatus::Draft => "draft",
            FormInstanceStatus::Submitted => "submitted",
            FormInstanceStatus::Requested => "requested",
            FormInstanceStatus::Sent => "sent",
            FormInstanceStatus::Downloaded => "downloaded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(FormInstanceStatus::Draft),
            "submitted" => Some(FormInstanceStatus::Submitted),
            "requested" => Some(FormInstanceStatus::Requested),
            "sent" => Some(FormInstanceStatus::Sent),
            "downloaded" => Some(FormInstanceStatus::Downloaded),
            _ => None,
        }
    }

    /// Returns true if sync may move an instance from `self` to `next`.
    pub fn can_transition_to(&self, next: FormInstanceStatus) -> bool {
        use FormInstanceStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Requested)
                | (Requested, Sent)
        )
    }

    /// Local edits are only allowed on drafts.
    pub fn is_editable(&self) -> bool {
        matches!(self, FormInstanceStatus::Draft)
    }
}

/// One filled-out occurrence of a survey form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInstance {
    /// Row id, `None` until persisted.
    pub id: Option<i64>,
    pub uuid: Uuid,
    pub form_id: String,
    pub data_point_id: Option<String>,
    pub form_version: f64,
    pub user_id: Option<i64>,
    pub status: FormInstanceStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub saved_date: Option<DateTime<Utc>>,
    pub submitted_date: Option<DateTime<Utc>>,
    /// Time spent filling the form, in milliseconds.
    pub duration_ms: i64,
    pub submitter: Option<String>,
}

impl FormInstance {
    /// Creates a draft started now.
    pub fn new_draft(form_id: impl Into<String>, form_version: f64) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            form_id: form_id.into(),
            data_point_id: None,
            form_version,
            user_id: None,
            status: FormInstanceStatus::Draft,
            start_date: Some(Utc::now()),
            saved_date: None,
            submitted_date: None,
            duration_ms: 0,
            submitter: None,
        }
    }

    pub fn with_data_point(mut self, data_point_id: impl Into<String>) -> Self {
        self.data_point_id = Some(data_point_id.into());
        self
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            FormInstanceStatus::Draft,
            FormInstanceStatus::Submitted,
            FormInstanceStatus::Requested,
            FormInstanceStatus::Sent,
            FormInstanceStatus::Downloaded,
        ] {
            assert_eq!(FormInstanceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(FormInstanceStatus::parse("uploaded"), None);
    }

    #[test]
    fn test_status_transitions_follow_lifecycle() {
        use FormInstanceStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Requested));
        assert!(Requested.can_transition_to(Sent));
        assert!(!Draft.can_transition_to(Sent));
        assert!(!Sent.can_transition_to(Draft));
        assert!(!Downloaded.can_transition_to(Requested));
        assert!(!Requested.can_transition_to(Requested));
    }

    #[test]
    fn test_new_draft_defaults() {
        let instance = FormInstance::new_draft("12345", 2.0).with_data_point("dp-1");
        assert_eq!(instance.status, FormInstanceStatus::Draft);
        assert!(instance.status.is_editable());
        assert!(instance.start_date.is_some());
        assert_eq!(instance.data_point_id.as_deref(), Some("dp-1"));
        assert_eq!(instance.id, None);
    }
}
