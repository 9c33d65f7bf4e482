use thiserror::Error;

/// Errors raised while parsing form definitions served or bundled with the app.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Wrong form header format: {0}")]
    FormHeader(String),
    #[error("Invalid survey definition: {0}")]
    SurveyDefinition(String),
}
