//! SQLite repository implementation.
//!
//! Implements the repository traits from `flowsync_core::storage` using SQLite.

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use flowsync_core::form::{FormInstance, FormInstanceStatus, InstalledForm};
use flowsync_core::response::QuestionResponse;
use flowsync_core::storage::{
    CursorRepository, DataPointRepository, FormInstanceRepository, FormRepository,
    RepositoryError, ResponseRepository, Result, TransmissionRepository,
};
use flowsync_core::sync::DataPoint;
use flowsync_core::transmission::{Transmission, TransmissionStatus};

use super::conversions::{
    format_datetime, format_optional_datetime, row_to_data_point, row_to_form,
    row_to_form_instance, row_to_response, row_to_transmission,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn insert_response(
    conn: &rusqlite::Connection,
    form_instance_id: i64,
    response: &QuestionResponse,
) -> rusqlite::Result<usize> {
    conn.execute(
        schema::INSERT_RESPONSE,
        rusqlite::params![
            form_instance_id,
            response.question_id,
            response.iteration,
            response.response_type.as_str(),
            response.value,
            response.included,
            response.filename
        ],
    )
}

/// SQLite-backed store for every local record.
///
/// One connection, owned by tokio-rusqlite's background thread.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a file-based database and creates the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a store over an in-memory database. Data is lost on drop.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// FormInstanceRepository implementation
// ============================================================================

#[async_trait]
impl FormInstanceRepository for SqliteStore {
    async fn create_form_instance(&self, instance: &FormInstance) -> Result<i64> {
        let uuid = instance.uuid.to_string();
        let form_id = instance.form_id.clone();
        let data_point_id = instance.data_point_id.clone();
        let version = instance.form_version;
        let user_id = instance.user_id;
        let status = instance.status.as_str();
        let start_date = format_optional_datetime(instance.start_date.as_ref());
        let saved_date = format_optional_datetime(instance.saved_date.as_ref());
        let submitted_date = format_optional_datetime(instance.submitted_date.as_ref());
        let duration = instance.duration_ms;
        let submitter = instance.submitter.clone();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_FORM_INSTANCE,
                    rusqlite::params![
                        uuid,
                        form_id,
                        data_point_id,
                        version,
                        user_id,
                        status,
                        start_date,
                        saved_date,
                        submitted_date,
                        duration,
                        submitter
                    ],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", instance.uuid.to_string()))?;

        tracing::debug!(id, form_id = %instance.form_id, "Created form instance");
        Ok(id)
    }

    async fn get_form_instance(&self, id: i64) -> Result<Option<FormInstance>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&schema::select_form_instance_by_id())
                    .map_err(wrap_err)?;
                match stmt.query_row([id], row_to_form_instance) {
                    Ok(instance) => Ok(Some(instance)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", id.to_string()))
    }

    async fn get_form_instance_by_uuid(&self, uuid: Uuid) -> Result<Option<FormInstance>> {
        let uuid_str = uuid.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&schema::select_form_instance_by_uuid())
                    .map_err(wrap_err)?;
                match stmt.query_row([&uuid_str], row_to_form_instance) {
                    Ok(instance) => Ok(Some(instance)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", uuid.to_string()))
    }

    async fn get_form_instances_by_status(
        &self,
        status: FormInstanceStatus,
    ) -> Result<Vec<FormInstance>> {
        let status = status.as_str();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&schema::select_form_instances_by_status())
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([status], row_to_form_instance)
                    .map_err(wrap_err)?;

                let mut instances = Vec::new();
                for row_result in rows {
                    instances.push(row_result.map_err(wrap_err)?);
                }
                Ok(instances)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "FormInstance"))
    }

    async fn update_form_instance_status(&self, id: i64, status: FormInstanceStatus) -> Result<()> {
        // Some(current) means the move was rejected.
        let rejected = self
            .conn
            .call(move |conn| {
                let current: String = conn
                    .query_row(schema::SELECT_FORM_INSTANCE_STATUS, [id], |row| row.get(0))
                    .map_err(wrap_err)?;
                let allowed = FormInstanceStatus::parse(&current)
                    .is_some_and(|current| current.can_transition_to(status));
                if !allowed {
                    return Ok(Some(current));
                }
                conn.execute(
                    schema::UPDATE_FORM_INSTANCE_STATUS,
                    rusqlite::params![id, status.as_str()],
                )
                .map_err(wrap_err)?;
                Ok(None)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", id.to_string()))?;

        match rejected {
            Some(from) => Err(RepositoryError::InvalidTransition {
                entity_type: "FormInstance",
                from,
                to: status.as_str().to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn touch_form_instance(&self, id: i64) -> Result<()> {
        let saved_date = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::TOUCH_FORM_INSTANCE, rusqlite::params![id, saved_date])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", id.to_string()))
    }

    async fn submit_form_instance(&self, id: i64, duration_ms: i64) -> Result<()> {
        let now = format_datetime(&Utc::now());
        let submitted = FormInstanceStatus::Submitted;

        let rejected = self
            .conn
            .call(move |conn| {
                let current: String = conn
                    .query_row(schema::SELECT_FORM_INSTANCE_STATUS, [id], |row| row.get(0))
                    .map_err(wrap_err)?;
                let allowed = FormInstanceStatus::parse(&current)
                    .is_some_and(|current| current.can_transition_to(submitted));
                if !allowed {
                    return Ok(Some(current));
                }
                conn.execute(
                    schema::SUBMIT_FORM_INSTANCE,
                    rusqlite::params![id, submitted.as_str(), now, duration_ms],
                )
                .map_err(wrap_err)?;
                Ok(None)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", id.to_string()))?;

        match rejected {
            Some(from) => Err(RepositoryError::InvalidTransition {
                entity_type: "FormInstance",
                from,
                to: submitted.as_str().to_string(),
            }),
            None => {
                tracing::info!(id, duration_ms, "Submitted form instance");
                Ok(())
            }
        }
    }
}

// ============================================================================
// ResponseRepository implementation
// ============================================================================

#[async_trait]
impl ResponseRepository for SqliteStore {
    async fn save_response(&self, response: &QuestionResponse) -> Result<()> {
        let response = response.clone();
        let question_id = response.question_id.clone();

        self.conn
            .call(move |conn| {
                insert_response(conn, response.form_instance_id, &response).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Response", question_id))
    }

    async fn save_responses(&self, responses: &[QuestionResponse]) -> Result<()> {
        let responses = responses.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                for response in &responses {
                    insert_response(&tx, response.form_instance_id, response).map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Response"))
    }

    async fn get_responses(&self, form_instance_id: i64) -> Result<Vec<QuestionResponse>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_RESPONSES_BY_INSTANCE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([form_instance_id], row_to_response)
                    .map_err(wrap_err)?;

                let mut responses = Vec::new();
                for row_result in rows {
                    responses.push(row_result.map_err(wrap_err)?);
                }
                Ok(responses)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Response"))
    }

    async fn delete_repetition(
        &self,
        form_instance_id: i64,
        question_ids: &[String],
        iteration: i32,
    ) -> Result<usize> {
        let question_ids = question_ids.to_vec();

        let deleted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let mut deleted = 0;
                for question_id in &question_ids {
                    deleted += tx
                        .execute(
                            schema::DELETE_RESPONSE_ITERATION,
                            rusqlite::params![form_instance_id, question_id, iteration],
                        )
                        .map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(deleted)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Response"))?;

        tracing::debug!(form_instance_id, iteration, deleted, "Deleted repetition");
        Ok(deleted)
    }
}

// ============================================================================
// TransmissionRepository implementation
// ============================================================================

#[async_trait]
impl TransmissionRepository for SqliteStore {
    async fn create_transmissions(
        &self,
        form_instance_id: i64,
        form_id: &str,
        filenames: &[String],
    ) -> Result<()> {
        let form_id = form_id.to_string();
        let filenames = filenames.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                for filename in &filenames {
                    tx.execute(
                        schema::INSERT_TRANSMISSION,
                        rusqlite::params![
                            form_instance_id,
                            form_id,
                            filename,
                            TransmissionStatus::Pending.as_str()
                        ],
                    )
                    .map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Transmission"))
    }

    async fn update_transmission_status(&self, id: i64, status: TransmissionStatus) -> Result<()> {
        let now = format_datetime(&Utc::now());
        let start_date = (status == TransmissionStatus::Requested).then(|| now.clone());
        let end_date = (status == TransmissionStatus::Sent).then_some(now);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_TRANSMISSION_STATUS,
                        rusqlite::params![id, status.as_str(), start_date, end_date],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Transmission", id.to_string()))
    }

    async fn get_unsynced_transmissions(&self) -> Result<Vec<Transmission>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_UNSYNCED_TRANSMISSIONS)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_transmission).map_err(wrap_err)?;

                let mut transmissions = Vec::new();
                for row_result in rows {
                    transmissions.push(row_result.map_err(wrap_err)?);
                }
                Ok(transmissions)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Transmission"))
    }

    async fn get_transmissions(&self, form_instance_id: i64) -> Result<Vec<Transmission>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_TRANSMISSIONS_BY_INSTANCE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([form_instance_id], row_to_transmission)
                    .map_err(wrap_err)?;

                let mut transmissions = Vec::new();
                for row_result in rows {
                    transmissions.push(row_result.map_err(wrap_err)?);
                }
                Ok(transmissions)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Transmission"))
    }

    async fn requeue_files(&self, filenames: &[String]) -> Result<usize> {
        let filenames = filenames.to_vec();

        let queued = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let mut queued = 0;
                for filename in &filenames {
                    let updated = tx
                        .execute(schema::FAIL_TRANSMISSION_BY_FILENAME, [filename])
                        .map_err(wrap_err)?;
                    if updated > 0 {
                        queued += 1;
                        continue;
                    }
                    let owner: Option<(i64, String)> = match tx.query_row(
                        schema::SELECT_FILE_OWNER,
                        [filename],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    ) {
                        Ok(owner) => Some(owner),
                        Err(rusqlite::Error::QueryReturnedNoRows) => None,
                        Err(e) => return Err(wrap_err(e)),
                    };
                    let Some((form_instance_id, form_id)) = owner else {
                        tracing::warn!(filename = %filename, "No local answer references missing file");
                        continue;
                    };
                    tx.execute(
                        schema::INSERT_TRANSMISSION,
                        rusqlite::params![
                            form_instance_id,
                            form_id,
                            filename,
                            TransmissionStatus::Failed.as_str()
                        ],
                    )
                    .map_err(wrap_err)?;
                    queued += 1;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(queued)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Transmission"))?;

        tracing::debug!(queued, "Requeued missing files");
        Ok(queued)
    }
}

// ============================================================================
// DataPointRepository implementation
// ============================================================================

#[async_trait]
impl DataPointRepository for SqliteStore {
    async fn save_data_point(&self, data_point: &DataPoint) -> Result<()> {
        let data_point = data_point.clone();
        let id = data_point.id.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::UPSERT_DATA_POINT,
                    rusqlite::params![
                        data_point.id,
                        data_point.survey_group_id,
                        data_point.name,
                        data_point.latitude,
                        data_point.longitude,
                        format_datetime(&data_point.last_modified)
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "DataPoint", id))
    }

    async fn get_data_point(&self, id: &str) -> Result<Option<DataPoint>> {
        let id = id.to_string();
        let data_point_id = id.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_DATA_POINT).map_err(wrap_err)?;
                match stmt.query_row([&id], row_to_data_point) {
                    Ok(data_point) => Ok(Some(data_point)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "DataPoint", data_point_id))
    }

    async fn save_downloaded_instance(
        &self,
        instance: &FormInstance,
        responses: &[QuestionResponse],
    ) -> Result<bool> {
        let instance = instance.clone();
        let responses = responses.to_vec();
        let uuid = instance.uuid;

        let saved = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let uuid_str = instance.uuid.to_string();
                let existing: Option<(i64, String)> = match tx.query_row(
                    schema::SELECT_FORM_INSTANCE_STATUS_BY_UUID,
                    [&uuid_str],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                ) {
                    Ok(found) => Some(found),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(wrap_err(e)),
                };

                let start_date = format_optional_datetime(instance.start_date.as_ref());
                let saved_date = format_optional_datetime(instance.saved_date.as_ref());
                let submitted_date = format_optional_datetime(instance.submitted_date.as_ref());

                let id = match existing {
                    Some((_, status)) if status != FormInstanceStatus::Downloaded.as_str() => {
                        return Ok(false);
                    }
                    Some((id, _)) => {
                        tx.execute(
                            schema::UPDATE_DOWNLOADED_INSTANCE,
                            rusqlite::params![
                                id,
                                instance.form_id,
                                instance.data_point_id,
                                instance.form_version,
                                start_date,
                                saved_date,
                                submitted_date,
                                instance.submitter
                            ],
                        )
                        .map_err(wrap_err)?;
                        tx.execute(schema::DELETE_RESPONSES_BY_INSTANCE, [id])
                            .map_err(wrap_err)?;
                        id
                    }
                    None => {
                        tx.execute(
                            schema::INSERT_FORM_INSTANCE,
                            rusqlite::params![
                                uuid_str,
                                instance.form_id,
                                instance.data_point_id,
                                instance.form_version,
                                instance.user_id,
                                FormInstanceStatus::Downloaded.as_str(),
                                start_date,
                                saved_date,
                                submitted_date,
                                instance.duration_ms,
                                instance.submitter
                            ],
                        )
                        .map_err(wrap_err)?;
                        tx.last_insert_rowid()
                    }
                };

                for response in &responses {
                    insert_response(&tx, id, response).map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(true)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "FormInstance", uuid.to_string()))?;

        if !saved {
            tracing::debug!(%uuid, "Kept local form instance over downloaded copy");
        }
        Ok(saved)
    }
}

// ============================================================================
// CursorRepository implementation
// ============================================================================

#[async_trait]
impl CursorRepository for SqliteStore {
    async fn get_cursor(&self, survey_id: i64) -> Result<Option<String>> {
        self.conn
            .call(move |conn| {
                match conn.query_row(schema::SELECT_CURSOR, [survey_id], |row| row.get(0)) {
                    Ok(cursor) => Ok(Some(cursor)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Cursor", survey_id.to_string()))
    }

    async fn save_cursor(&self, survey_id: i64, cursor: &str) -> Result<()> {
        let cursor = cursor.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::UPSERT_CURSOR, rusqlite::params![survey_id, cursor])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Cursor", survey_id.to_string()))
    }
}

// ============================================================================
// FormRepository implementation
// ============================================================================

#[async_trait]
impl FormRepository for SqliteStore {
    async fn get_form(&self, form_id: &str) -> Result<Option<InstalledForm>> {
        let form_id = form_id.to_string();
        let id = form_id.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_FORM).map_err(wrap_err)?;
                match stmt.query_row([&form_id], row_to_form) {
                    Ok(form) => Ok(Some(form)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Form", id))
    }

    async fn get_forms(&self) -> Result<Vec<InstalledForm>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_FORMS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_form).map_err(wrap_err)?;

                let mut forms = Vec::new();
                for row_result in rows {
                    forms.push(row_result.map_err(wrap_err)?);
                }
                Ok(forms)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Form"))
    }

    async fn save_form(&self, form: &InstalledForm) -> Result<()> {
        let form = form.clone();
        let id = form.id.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::UPSERT_FORM,
                    rusqlite::params![form.id, form.name, form.version, form.group_id, form.file_name],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Form", id))
    }

    async fn mark_forms_deleted(&self, form_ids: &[String]) -> Result<usize> {
        let form_ids = form_ids.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let mut flagged = 0;
                for form_id in &form_ids {
                    flagged += tx
                        .execute(schema::MARK_FORM_DELETED, [form_id])
                        .map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(flagged)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Form"))
    }

    async fn was_version_notified(&self, form_id: &str, version: f64) -> Result<bool> {
        let form_id = form_id.to_string();
        let id = form_id.clone();

        let notified: Option<f64> = self
            .conn
            .call(move |conn| {
                match conn.query_row(schema::SELECT_NOTIFIED_VERSION, [&form_id], |row| row.get(0)) {
                    Ok(version) => Ok(Some(version)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Form", id))?;

        Ok(notified.is_some_and(|notified| notified >= version))
    }

    async fn set_version_notified(&self, form_id: &str, version: f64) -> Result<()> {
        let form_id = form_id.to_string();
        let id = form_id.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::UPSERT_NOTIFIED_VERSION,
                    rusqlite::params![form_id, version],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Form", id))
    }
}
