//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::{DateTime, Utc};
use flowsync_core::form::{FormInstance, FormInstanceStatus, InstalledForm};
use flowsync_core::response::{QuestionResponse, ResponseType};
use flowsync_core::sync::DataPoint;
use flowsync_core::transmission::{Transmission, TransmissionStatus};
use rusqlite::Row;
use uuid::Uuid;

// ============================================================================
// Form instance conversions
// ============================================================================

/// Convert a SQLite row to a FormInstance.
///
/// Expected columns: id, uuid, survey_id, record_id, version, user_id, status,
/// start_date, saved_date, submitted_date, duration, submitter
pub fn row_to_form_instance(row: &Row) -> rusqlite::Result<FormInstance> {
    let uuid: String = row.get(1)?;
    let status: String = row.get(6)?;
    let start_date: Option<String> = row.get(7)?;
    let saved_date: Option<String> = row.get(8)?;
    let submitted_date: Option<String> = row.get(9)?;

    Ok(FormInstance {
        id: Some(row.get(0)?),
        uuid: parse_uuid(&uuid)?,
        form_id: row.get(2)?,
        data_point_id: row.get(3)?,
        form_version: row.get(4)?,
        user_id: row.get(5)?,
        status: parse_instance_status(&status)?,
        start_date: parse_optional_datetime(start_date)?,
        saved_date: parse_optional_datetime(saved_date)?,
        submitted_date: parse_optional_datetime(submitted_date)?,
        duration_ms: row.get(10)?,
        submitter: row.get(11)?,
    })
}

// ============================================================================
// Response conversions
// ============================================================================

/// Convert a SQLite row to a QuestionResponse.
///
/// Expected columns: id, survey_instance_id, question_id, iteration, answer_type,
/// answer, include_flag, filename
pub fn row_to_response(row: &Row) -> rusqlite::Result<QuestionResponse> {
    let answer_type: String = row.get(4)?;
    Ok(QuestionResponse {
        id: Some(row.get(0)?),
        form_instance_id: row.get(1)?,
        question_id: row.get(2)?,
        iteration: row.get(3)?,
        response_type: ResponseType::parse(&answer_type),
        value: row.get(5)?,
        included: row.get(6)?,
        filename: row.get(7)?,
    })
}

// ============================================================================
// Transmission conversions
// ============================================================================

/// Convert a SQLite row to a Transmission.
///
/// Expected columns: id, survey_instance_id, survey_id, filename, status, start_date, end_date
pub fn row_to_transmission(row: &Row) -> rusqlite::Result<Transmission> {
    let status: String = row.get(4)?;
    let start_date: Option<String> = row.get(5)?;
    let end_date: Option<String> = row.get(6)?;

    Ok(Transmission {
        id: Some(row.get(0)?),
        form_instance_id: row.get(1)?,
        form_id: row.get(2)?,
        filename: row.get(3)?,
        status: parse_transmission_status(&status)?,
        start_date: parse_optional_datetime(start_date)?,
        end_date: parse_optional_datetime(end_date)?,
    })
}

// ============================================================================
// Data point and form conversions
// ============================================================================

/// Expected columns: record_id, survey_group_id, name, latitude, longitude, last_modified
pub fn row_to_data_point(row: &Row) -> rusqlite::Result<DataPoint> {
    let last_modified: String = row.get(5)?;
    Ok(DataPoint {
        id: row.get(0)?,
        survey_group_id: row.get(1)?,
        name: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        last_modified: parse_datetime(&last_modified)?,
    })
}

/// Expected columns: survey_id, name, version, survey_group_id, filename
pub fn row_to_form(row: &Row) -> rusqlite::Result<InstalledForm> {
    Ok(InstalledForm {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        group_id: row.get(3)?,
        file_name: row.get(4)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_optional_datetime(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_datetime).transpose()
}

fn parse_instance_status(s: &str) -> rusqlite::Result<FormInstanceStatus> {
    FormInstanceStatus::parse(s).ok_or_else(|| conversion_error(format!("Unknown status: {s}")))
}

fn parse_transmission_status(s: &str) -> rusqlite::Result<TransmissionStatus> {
    TransmissionStatus::parse(s).ok_or_else(|| conversion_error(format!("Unknown status: {s}")))
}

/// Format a DateTime<Utc> for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn format_optional_datetime(dt: Option<&DateTime<Utc>>) -> Option<String> {
    dt.map(format_datetime)
}
