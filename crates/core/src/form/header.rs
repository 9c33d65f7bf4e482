//! Parsing of the comma-separated form header lines served by the forms endpoint.
//!
//! Each line is `,<id>,<name>,<language>,<version>,<groupId>,<groupName>,<monitored>,<registrationFormId>`.
//! The leading field is ignored; older servers put the device phone number there.

use serde::Serialize;

use super::error::ParseError;

const ID: usize = 1;
const NAME: usize = 2;
const LANGUAGE: usize = 3;
const VERSION: usize = 4;
const GROUP_ID: usize = 5;
const GROUP_NAME: usize = 6;
const GROUP_MONITORED: usize = 7;
const GROUP_REGISTRATION_FORM: usize = 8;
const COUNT: usize = 9;

/// A form available to the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormHeader {
    pub id: String,
    pub name: String,
    pub language: String,
    pub version: f64,
    pub group_id: i64,
    pub group_name: String,
    pub monitored: bool,
    pub registration_form_id: String,
}

impl FormHeader {
    /// Parses a single header. A missing leading comma is tolerated.
    pub fn parse_one(line: &str) -> Result<Self, ParseError> {
        if line.starts_with(',') {
            Self::parse(line)
        } else {
            Self::parse(&format!(",{line}"))
        }
    }

    /// Parses one header per non-empty line.
    pub fn parse_many(body: &str) -> Result<Vec<Self>, ParseError> {
        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < COUNT {
            return Err(ParseError::FormHeader(format!(
                "expected at least {COUNT} fields but found {}: {line}",
                fields.len()
            )));
        }

        let id = fields[ID].trim().to_string();
        let registration = fields[GROUP_REGISTRATION_FORM].trim();
        let version = fields[VERSION]
            .trim()
            .parse()
            .map_err(|_| ParseError::FormHeader(format!("invalid version in: {line}")))?;
        let group_id = fields[GROUP_ID]
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::FormHeader(format!("invalid group id in: {line}")))?;

        Ok(Self {
            registration_form_id: if registration.is_empty() {
                id.clone()
            } else {
                registration.to_string()
            },
            id,
            name: fields[NAME].to_string(),
            language: fields[LANGUAGE].to_string(),
            version,
            group_id: group_id as i64,
            group_name: fields[GROUP_NAME].to_string(),
            monitored: fields[GROUP_MONITORED].trim().eq_ignore_ascii_case("true"),
        })
    }
}
