//! JSON encodings of option and cascade answers.

use serde::{Deserialize, Serialize};

/// One level of a cascade answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CascadeValue {
    /// Serializes the chosen levels, root first.
    pub fn serialize(levels: &[CascadeValue]) -> serde_json::Result<String> {
        serde_json::to_string(levels)
    }

    /// Parses a stored cascade answer. Malformed values yield no levels.
    pub fn deserialize(raw: &str) -> Vec<CascadeValue> {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Names of the chosen levels joined with `" - "`.
    pub fn names(raw: &str) -> String {
        Self::deserialize(raw)
            .iter()
            .map(|level| level.name.as_str())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

/// One selected option of an option answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValue {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub is_other: bool,
}

impl OptionValue {
    pub fn deserialize(raw: &str) -> Vec<OptionValue> {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Texts of the selected options joined with `" - "`.
    pub fn names(raw: &str) -> String {
        Self::deserialize(raw)
            .iter()
            .map(|option| option.text.as_str())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}
