//! Installed form records and the survey definition attributes read at install time.

use serde::Serialize;

use super::error::ParseError;
use super::header::FormHeader;

/// A form installed on the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledForm {
    pub id: String,
    pub name: String,
    pub version: f64,
    pub group_id: Option<i64>,
    /// Definition file, relative to the forms directory.
    pub file_name: String,
}

impl InstalledForm {
    /// Record for a form installed from a downloaded archive.
    pub fn from_header(header: &FormHeader) -> Self {
        Self {
            id: header.id.clone(),
            name: header.name.clone(),
            version: header.version,
            group_id: Some(header.group_id),
            file_name: format!("{}.xml", header.id),
        }
    }
}

/// Attributes of the root `<survey>` element of a form definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<f64>,
    /// Instance the form was published from.
    pub app: Option<String>,
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
}

impl SurveyMetadata {
    /// Reads the attributes of the first `<survey ...>` element.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let start = find_survey_tag(xml).ok_or_else(|| {
            ParseError::SurveyDefinition("missing <survey> element".to_string())
        })?;
        let rest = &xml[start + "<survey".len()..];
        let end = find_tag_end(rest).ok_or_else(|| {
            ParseError::SurveyDefinition("unterminated <survey> element".to_string())
        })?;
        let attributes = parse_attributes(rest[..end].trim_end_matches('/'));

        let get = |key: &str| {
            attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            id: get("surveyId"),
            name: get("name"),
            version: get("version").and_then(|v| v.parse().ok()),
            app: get("app"),
            group_id: get("surveyGroupId").and_then(|v| v.parse().ok()),
            group_name: get("surveyGroupName"),
        })
    }

    /// Returns true when the form was published for `instance`.
    pub fn belongs_to(&self, instance: &str) -> bool {
        self.app
            .as_deref()
            .is_some_and(|app| !app.trim().is_empty() && instance.contains(app.trim()))
    }

    /// Builds the installed record, falling back to `fallback_id` and a version of 1.0.
    pub fn into_installed(self, fallback_id: &str, file_name: String) -> InstalledForm {
        let id = self.id.unwrap_or_else(|| fallback_id.to_string());
        InstalledForm {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            version: self.version.filter(|v| *v > 0.0).unwrap_or(1.0),
            group_id: self.group_id,
            file_name,
        }
    }
}

/// Markup skipped while looking for the root element, as (open, close) pairs.
const SKIPPED_MARKUP: [(&str, &str); 4] = [
    ("<!--", "-->"),
    ("<![CDATA[", "]]>"),
    ("<?", "?>"),
    ("<!", ">"),
];

/// Offset of the first `<survey` start tag outside comments, CDATA and declarations.
fn find_survey_tag(xml: &str) -> Option<usize> {
    let mut offset = 0;
    'scan: while let Some(found) = xml[offset..].find('<') {
        let index = offset + found;
        let tail = &xml[index..];

        for (open, close) in SKIPPED_MARKUP {
            if tail.starts_with(open) {
                let end = tail[open.len()..].find(close)?;
                offset = index + open.len() + end + close.len();
                continue 'scan;
            }
        }

        if let Some(after) = tail.strip_prefix("<survey") {
            if matches!(after.chars().next(), Some(c) if c.is_whitespace() || c == '>' || c == '/')
            {
                return Some(index);
            }
        }
        offset = index + 1;
    }
    None
}

/// Offset of the `>` closing a start tag, ignoring any inside quoted values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (index, c) in rest.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '>') => return Some(index),
            _ => {}
        }
    }
    None
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut rest = raw;
    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim().to_string();
        let after = rest[eq + 1..].trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let body = &after[1..];
        let Some(close) = body.find(quote) else {
            break;
        };
        attributes.push((key, unescape(&body[..close])));
        rest = &body[close + 1..];
    }
    attributes
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
