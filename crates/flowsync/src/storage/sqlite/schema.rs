//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Natural keys use `ON CONFLICT REPLACE` so re-saving a record
//! overwrites it in place of failing.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Form instances
CREATE TABLE IF NOT EXISTS survey_instance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
    survey_id TEXT NOT NULL,
    record_id TEXT,
    version REAL NOT NULL DEFAULT 0,
    user_id INTEGER,
    status TEXT NOT NULL,
    start_date TEXT,
    saved_date TEXT,
    submitted_date TEXT,
    duration INTEGER NOT NULL DEFAULT 0,
    submitter TEXT
);

-- Question responses, one row per question and iteration
CREATE TABLE IF NOT EXISTS response (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    survey_instance_id INTEGER NOT NULL,
    question_id TEXT NOT NULL,
    iteration INTEGER NOT NULL DEFAULT 0,
    answer_type TEXT NOT NULL,
    answer TEXT NOT NULL,
    include_flag INTEGER NOT NULL DEFAULT 1,
    filename TEXT,
    UNIQUE (survey_instance_id, question_id, iteration) ON CONFLICT REPLACE
);

-- Files queued for upload
CREATE TABLE IF NOT EXISTS transmission (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    survey_instance_id INTEGER NOT NULL,
    survey_id TEXT NOT NULL,
    filename TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
    status TEXT NOT NULL,
    start_date TEXT,
    end_date TEXT
);

-- Data points
CREATE TABLE IF NOT EXISTS record (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
    survey_group_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    last_modified TEXT NOT NULL
);

-- Download cursors, one per survey
CREATE TABLE IF NOT EXISTS data_point_cursor (
    survey_id INTEGER NOT NULL UNIQUE ON CONFLICT REPLACE,
    cursor TEXT NOT NULL
);

-- Last form version the user was told about
CREATE TABLE IF NOT EXISTS form_version_notified (
    form_id TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
    version REAL NOT NULL
);

-- Installed forms
CREATE TABLE IF NOT EXISTS survey (
    survey_id TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
    name TEXT NOT NULL,
    version REAL NOT NULL,
    survey_group_id INTEGER,
    filename TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_survey_instance_status ON survey_instance(status);
CREATE INDEX IF NOT EXISTS idx_response_instance ON response(survey_instance_id);
CREATE INDEX IF NOT EXISTS idx_transmission_status ON transmission(status);
CREATE INDEX IF NOT EXISTS idx_transmission_instance ON transmission(survey_instance_id);
"#;

// Form instance queries
pub const INSERT_FORM_INSTANCE: &str = r#"
INSERT INTO survey_instance (uuid, survey_id, record_id, version, user_id, status, start_date, saved_date, submitted_date, duration, submitter)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

const FORM_INSTANCE_COLUMNS: &str = "id, uuid, survey_id, record_id, version, user_id, status, start_date, saved_date, submitted_date, duration, submitter";

pub fn select_form_instance_by_id() -> String {
    format!("SELECT {FORM_INSTANCE_COLUMNS} FROM survey_instance WHERE id = ?1")
}

pub fn select_form_instance_by_uuid() -> String {
    format!("SELECT {FORM_INSTANCE_COLUMNS} FROM survey_instance WHERE uuid = ?1")
}

pub fn select_form_instances_by_status() -> String {
    format!("SELECT {FORM_INSTANCE_COLUMNS} FROM survey_instance WHERE status = ?1 ORDER BY id ASC")
}

pub const SELECT_FORM_INSTANCE_STATUS: &str = r#"
SELECT status FROM survey_instance WHERE id = ?1
"#;

pub const SELECT_FORM_INSTANCE_STATUS_BY_UUID: &str = r#"
SELECT id, status FROM survey_instance WHERE uuid = ?1
"#;

pub const UPDATE_FORM_INSTANCE_STATUS: &str = r#"
UPDATE survey_instance
SET status = ?2
WHERE id = ?1
"#;

pub const TOUCH_FORM_INSTANCE: &str = r#"
UPDATE survey_instance
SET saved_date = ?2
WHERE id = ?1
"#;

pub const SUBMIT_FORM_INSTANCE: &str = r#"
UPDATE survey_instance
SET status = ?2, saved_date = ?3, submitted_date = ?3, duration = ?4
WHERE id = ?1
"#;

pub const UPDATE_DOWNLOADED_INSTANCE: &str = r#"
UPDATE survey_instance
SET survey_id = ?2, record_id = ?3, version = ?4, start_date = ?5, saved_date = ?6, submitted_date = ?7, submitter = ?8
WHERE id = ?1
"#;

// Response queries
pub const INSERT_RESPONSE: &str = r#"
INSERT INTO response (survey_instance_id, question_id, iteration, answer_type, answer, include_flag, filename)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_RESPONSES_BY_INSTANCE: &str = r#"
SELECT id, survey_instance_id, question_id, iteration, answer_type, answer, include_flag, filename
FROM response
WHERE survey_instance_id = ?1
ORDER BY question_id ASC, iteration ASC
"#;

pub const DELETE_RESPONSE_ITERATION: &str = r#"
DELETE FROM response
WHERE survey_instance_id = ?1 AND question_id = ?2 AND iteration = ?3
"#;

pub const DELETE_RESPONSES_BY_INSTANCE: &str = r#"
DELETE FROM response
WHERE survey_instance_id = ?1
"#;

// Transmission queries
pub const INSERT_TRANSMISSION: &str = r#"
INSERT INTO transmission (survey_instance_id, survey_id, filename, status)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const UPDATE_TRANSMISSION_STATUS: &str = r#"
UPDATE transmission
SET status = ?2, start_date = COALESCE(?3, start_date), end_date = COALESCE(?4, end_date)
WHERE id = ?1
"#;

pub const SELECT_UNSYNCED_TRANSMISSIONS: &str = r#"
SELECT id, survey_instance_id, survey_id, filename, status, start_date, end_date
FROM transmission
WHERE status IN ('pending', 'requested', 'failed')
ORDER BY id ASC
"#;

pub const SELECT_TRANSMISSIONS_BY_INSTANCE: &str = r#"
SELECT id, survey_instance_id, survey_id, filename, status, start_date, end_date
FROM transmission
WHERE survey_instance_id = ?1
ORDER BY id ASC
"#;

pub const FAIL_TRANSMISSION_BY_FILENAME: &str = r#"
UPDATE transmission
SET status = 'failed'
WHERE filename = ?1
"#;

/// Newest form instance with an answer referencing the file.
pub const SELECT_FILE_OWNER: &str = r#"
SELECT r.survey_instance_id, si.survey_id
FROM response r
JOIN survey_instance si ON si.id = r.survey_instance_id
WHERE r.filename = ?1 OR r.answer = ?1 OR r.answer LIKE '%/' || ?1
ORDER BY r.survey_instance_id DESC
LIMIT 1
"#;

// Data point queries
pub const UPSERT_DATA_POINT: &str = r#"
INSERT INTO record (record_id, survey_group_id, name, latitude, longitude, last_modified)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_DATA_POINT: &str = r#"
SELECT record_id, survey_group_id, name, latitude, longitude, last_modified
FROM record
WHERE record_id = ?1
"#;

// Cursor queries
pub const SELECT_CURSOR: &str = r#"
SELECT cursor FROM data_point_cursor WHERE survey_id = ?1
"#;

pub const UPSERT_CURSOR: &str = r#"
INSERT INTO data_point_cursor (survey_id, cursor) VALUES (?1, ?2)
"#;

// Installed form queries
pub const SELECT_FORM: &str = r#"
SELECT survey_id, name, version, survey_group_id, filename
FROM survey
WHERE survey_id = ?1 AND deleted = 0
"#;

pub const SELECT_FORMS: &str = r#"
SELECT survey_id, name, version, survey_group_id, filename
FROM survey
WHERE deleted = 0
ORDER BY survey_id ASC
"#;

pub const UPSERT_FORM: &str = r#"
INSERT INTO survey (survey_id, name, version, survey_group_id, filename)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const MARK_FORM_DELETED: &str = r#"
UPDATE survey SET deleted = 1 WHERE survey_id = ?1 AND deleted = 0
"#;

pub const SELECT_NOTIFIED_VERSION: &str = r#"
SELECT version FROM form_version_notified WHERE form_id = ?1
"#;

pub const UPSERT_NOTIFIED_VERSION: &str = r#"
INSERT INTO form_version_notified (form_id, version) VALUES (?1, ?2)
"#;
