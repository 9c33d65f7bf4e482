use async_trait::async_trait;
use uuid::Uuid;

use crate::form::{FormInstance, FormInstanceStatus, InstalledForm};
use crate::response::QuestionResponse;
use crate::sync::DataPoint;
use crate::transmission::{Transmission, TransmissionStatus};

use super::Result;

/// Repository for form instance lifecycle operations.
#[async_trait]
pub trait FormInstanceRepository: Send + Sync {
    /// Creates a form instance and returns its row id.
    async fn create_form_instance(&self, instance: &FormInstance) -> Result<i64>;

    /// Gets a form instance by its row id.
    async fn get_form_instance(&self, id: i64) -> Result<Option<FormInstance>>;

    /// Gets a form instance by its uuid.
    async fn get_form_instance_by_uuid(&self, uuid: Uuid) -> Result<Option<FormInstance>>;

    /// Gets all form instances in a status, oldest first.
    async fn get_form_instances_by_status(
        &self,
        status: FormInstanceStatus,
    ) -> Result<Vec<FormInstance>>;

    /// Moves a form instance to a new status, rejecting transitions outside the lifecycle.
    async fn update_form_instance_status(&self, id: i64, status: FormInstanceStatus) -> Result<()>;

    /// Stamps the saved date of a draft.
    async fn touch_form_instance(&self, id: i64) -> Result<()>;

    /// Submits a draft, recording the submission date and time spent on it.
    async fn submit_form_instance(&self, id: i64, duration_ms: i64) -> Result<()>;
}

/// Repository for question responses.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Saves a response, replacing any answer for the same question and iteration.
    async fn save_response(&self, response: &QuestionResponse) -> Result<()>;

    /// Saves a batch of responses in one transaction.
    async fn save_responses(&self, responses: &[QuestionResponse]) -> Result<()>;

    /// Gets all responses of a form instance.
    async fn get_responses(&self, form_instance_id: i64) -> Result<Vec<QuestionResponse>>;

    /// Deletes every answer of one repetition of a group. Returns the number removed.
    async fn delete_repetition(
        &self,
        form_instance_id: i64,
        question_ids: &[String],
        iteration: i32,
    ) -> Result<usize>;
}

/// Repository for queued uploads.
#[async_trait]
pub trait TransmissionRepository: Send + Sync {
    /// Queues one pending transmission per file name.
    async fn create_transmissions(
        &self,
        form_instance_id: i64,
        form_id: &str,
        filenames: &[String],
    ) -> Result<()>;

    /// Updates the status of a transmission, stamping start and end dates.
    async fn update_transmission_status(&self, id: i64, status: TransmissionStatus) -> Result<()>;

    /// Gets transmissions that are pending, in progress or failed.
    async fn get_unsynced_transmissions(&self) -> Result<Vec<Transmission>>;

    /// Gets all transmissions of a form instance.
    async fn get_transmissions(&self, form_instance_id: i64) -> Result<Vec<Transmission>>;

    /// Marks the transmissions of these files failed so they are uploaded again.
    ///
    /// A file without a transmission gets one when a local answer references it.
    /// Returns the number of files queued.
    async fn requeue_files(&self, filenames: &[String]) -> Result<usize>;
}

/// Repository for data points downloaded from the server.
#[async_trait]
pub trait DataPointRepository: Send + Sync {
    /// Inserts or replaces a data point.
    async fn save_data_point(&self, data_point: &DataPoint) -> Result<()>;

    /// Gets a data point by its id.
    async fn get_data_point(&self, id: &str) -> Result<Option<DataPoint>>;

    /// Stores a downloaded form instance with its answers.
    ///
    /// Returns false when a local, non-downloaded instance with the same uuid exists.
    async fn save_downloaded_instance(
        &self,
        instance: &FormInstance,
        responses: &[QuestionResponse],
    ) -> Result<bool>;
}

/// Repository for per-survey download cursors.
#[async_trait]
pub trait CursorRepository: Send + Sync {
    /// Gets the stored cursor for a survey.
    async fn get_cursor(&self, survey_id: i64) -> Result<Option<String>>;

    /// Stores the cursor for a survey, replacing the previous one.
    async fn save_cursor(&self, survey_id: i64, cursor: &str) -> Result<()>;
}

/// Repository for installed forms and update notifications.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Gets an installed form by id. Deleted forms are not returned.
    async fn get_form(&self, form_id: &str) -> Result<Option<InstalledForm>>;

    /// Gets all installed forms that are not deleted.
    async fn get_forms(&self) -> Result<Vec<InstalledForm>>;

    /// Inserts or replaces an installed form. Reinstalling clears the deleted flag.
    async fn save_form(&self, form: &InstalledForm) -> Result<()>;

    /// Flags forms the server has deleted. Returns the number newly flagged.
    async fn mark_forms_deleted(&self, form_ids: &[String]) -> Result<usize>;

    /// Returns true if the user was already told about this form version.
    async fn was_version_notified(&self, form_id: &str, version: f64) -> Result<bool>;

    /// Records that the user was told about this form version.
    async fn set_version_notified(&self, form_id: &str, version: f64) -> Result<()>;
}
