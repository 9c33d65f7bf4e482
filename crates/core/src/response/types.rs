use serde::{Deserialize, Serialize};

use super::compound::CompoundId;
use super::values::{CascadeValue, OptionValue};

/// Answer type of a question response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    Value,
    Option,
    Cascade,
    Geo,
    Image,
    Video,
    Date,
    Signature,
    Caddisfly,
    Geoshape,
}

impl ResponseType {
    /// Stable string form used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Value => "VALUE",
            ResponseType::Option => "OPTION",
            ResponseType::Cascade => "CASCADE",
            ResponseType::Geo => "GEO",
            ResponseType::Image => "IMAGE",
            ResponseType::Video => "VIDEO",
            ResponseType::Date => "DATE",
            ResponseType::Signature => "SIGNATURE",
            ResponseType::Caddisfly => "CADDISFLY",
            ResponseType::Geoshape => "GEOSHAPE",
        }
    }

    /// Parses a stored type string. Unknown types fall back to `Value`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPTION" => ResponseType::Option,
            "CASCADE" => ResponseType::Cascade,
            "GEO" => ResponseType::Geo,
            "IMAGE" | "PHOTO" => ResponseType::Image,
            "VIDEO" => ResponseType::Video,
            "DATE" => ResponseType::Date,
            "SIGNATURE" => ResponseType::Signature,
            "CADDISFLY" => ResponseType::Caddisfly,
            "GEOSHAPE" => ResponseType::Geoshape,
            _ => ResponseType::Value,
        }
    }

    /// Returns true for answers backed by a media file.
    pub fn is_media(&self) -> bool {
        matches!(self, ResponseType::Image | ResponseType::Video)
    }
}

/// A single answer to a question, scoped to one iteration of its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    /// Row id, `None` until persisted.
    pub id: Option<i64>,
    pub form_instance_id: i64,
    /// Base question id, without the iteration suffix.
    pub question_id: String,
    pub iteration: i32,
    pub response_type: ResponseType,
    pub value: String,
    pub included: bool,
    /// Media file name for image and video answers.
    pub filename: Option<String>,
}

impl QuestionResponse {
    /// Creates an included response for iteration 0.
    pub fn new(
        form_instance_id: i64,
        question_id: impl Into<String>,
        response_type: ResponseType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            form_instance_id,
            question_id: question_id.into(),
            iteration: 0,
            response_type,
            value: value.into(),
            included: true,
            filename: None,
        }
    }

    /// Creates a response from a raw, possibly compound, question id.
    pub fn from_compound(
        form_instance_id: i64,
        raw_question_id: &str,
        response_type: ResponseType,
        value: impl Into<String>,
    ) -> Self {
        let compound = CompoundId::parse(raw_question_id);
        Self::new(form_instance_id, compound.base, response_type, value)
            .with_iteration(compound.iteration)
    }

    pub fn with_iteration(mut self, iteration: i32) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn excluded(mut self) -> Self {
        self.included = false;
        self
    }

    /// The `questionId|iteration` form used by repeatable groups.
    pub fn compound_id(&self) -> CompoundId {
        CompoundId::new(self.question_id.clone(), self.iteration)
    }

    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }

    /// Checks the value is usable for its type.
    ///
    /// Geo answers are `lat|lon|elevation|code`; the first two tokens must be numeric.
    pub fn is_valid(&self) -> bool {
        if !self.has_value() {
            return false;
        }
        match self.response_type {
            ResponseType::Geo => {
                let mut tokens = self.value.split('|');
                let lat = tokens.next().map(|t| t.trim().parse::<f64>().is_ok());
                let lon = tokens.next().map(|t| t.trim().parse::<f64>().is_ok());
                lat == Some(true) && lon == Some(true)
            }
            _ => true,
        }
    }

    /// Value used when this answer names its data point.
    ///
    /// Option and cascade answers contribute the names of the chosen entries.
    pub fn datapoint_name_value(&self) -> String {
        let raw = match self.response_type {
            ResponseType::Option => OptionValue::names(&self.value),
            ResponseType::Cascade => CascadeValue::names(&self.value),
            _ => self.value.clone(),
        };
        super::cleaner::clean_value(&raw)
    }
}
