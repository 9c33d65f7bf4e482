//! Pure rules for bootstrap bundles.
//!
//! Operators drop zip bundles of form definitions and cascade resources into a
//! bootstrap folder. Each bundle is applied once and then renamed so the folder keeps
//! an audit trail of what was processed and what failed.

use serde::Serialize;
use thiserror::Error;

/// Suffix added to a bundle that was applied.
pub const PROCESSED_SUFFIX: &str = ".processed";
/// Suffix added to a bundle that failed.
pub const ERROR_SUFFIX: &str = ".error";

const ZIP_SUFFIX: &str = ".zip";
const CASCADE_SUFFIX: &str = ".sqlite";
const SURVEY_SUFFIX: &str = ".xml";

/// Outcome of applying one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum ProcessingResult {
    Success,
    Failure(String),
    /// A form in the bundle was published for another instance.
    WrongDashboard,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Success)
    }
}

/// Errors raised while applying a bundle.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Bundle {0} contains a form for another instance")]
    WrongDashboard(String),
    #[error("Invalid bundle {file}: {reason}")]
    InvalidBundle { file: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a bundle entry contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    CascadeResource,
    SurveyDefinition,
    Ignored,
}

/// Classifies a zip entry by name.
pub fn classify_entry(name: &str) -> EntryKind {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with('/') {
        EntryKind::Ignored
    } else if lower.ends_with(CASCADE_SUFFIX) {
        EntryKind::CascadeResource
    } else if lower.ends_with(SURVEY_SUFFIX) {
        EntryKind::SurveyDefinition
    } else {
        EntryKind::Ignored
    }
}

/// Returns true for bundles that still have to be applied.
pub fn is_pending_bundle(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(ZIP_SUFFIX)
}

/// File name a bundle is renamed to once handled.
///
/// ```
/// use flowsync_core::bootstrap::{handled_file_name, ProcessingResult};
///
/// assert_eq!(handled_file_name("forms.zip", &ProcessingResult::Success), "forms.zip.processed");
/// assert_eq!(handled_file_name("forms.zip", &ProcessingResult::WrongDashboard), "forms.zip.error");
/// ```
pub fn handled_file_name(file_name: &str, result: &ProcessingResult) -> String {
    let suffix = if result.is_success() {
        PROCESSED_SUFFIX
    } else {
        ERROR_SUFFIX
    };
    format!("{file_name}{suffix}")
}

/// Survey id encoded in an entry path, `<folder>/<id>.xml` or `<id>.xml`.
pub fn survey_id_from_entry(name: &str) -> String {
    let file = name.rsplit('/').next().unwrap_or(name);
    file.split_once('.')
        .map_or(file, |(stem, _)| stem)
        .to_string()
}

/// Last path segment of an entry, used as the extracted file name.
pub fn entry_file_name(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|n| !n.is_empty())
}
