//! Serde helpers for the lenient JSON served by the Flow API.
//!
//! Ids arrive as either strings or numbers, coordinates may be null, and cursors may
//! be empty strings. These helpers normalise those shapes.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Integer(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize a string that the server may send as a JSON number.
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

/// Deserialize an optional float that may be sent as a string. Unparsable values are None.
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(StringOrNumber::Integer(i)) => Some(i as f64),
        Some(StringOrNumber::Float(f)) => Some(f),
        Some(StringOrNumber::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Deserialize a list of ids that may mix strings and numbers. Null is an empty list.
pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<StringOrNumber>> = Option::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(StringOrNumber::into_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        cursor: Option<String>,
        #[serde(default, deserialize_with = "deserialize_string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_lenient_f64")]
        latitude: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_string_list")]
        forms: Vec<String>,
    }

    #[test]
    fn test_deserialize_optional_string_empty() {
        let result: TestStruct = serde_json::from_str(r#"{"cursor": ""}"#).unwrap();
        assert_eq!(result.cursor, None);
    }

    #[test]
    fn test_deserialize_optional_string_value() {
        let result: TestStruct = serde_json::from_str(r#"{"cursor": "abc"}"#).unwrap();
        assert_eq!(result.cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let numeric: TestStruct = serde_json::from_str(r#"{"id": 205929118}"#).unwrap();
        let text: TestStruct = serde_json::from_str(r#"{"id": "205929118"}"#).unwrap();
        assert_eq!(numeric.id, "205929118");
        assert_eq!(text.id, "205929118");
    }

    #[test]
    fn test_deserialize_lenient_f64() {
        let number: TestStruct = serde_json::from_str(r#"{"latitude": 52.5}"#).unwrap();
        let text: TestStruct = serde_json::from_str(r#"{"latitude": "52.5"}"#).unwrap();
        let null: TestStruct = serde_json::from_str(r#"{"latitude": null}"#).unwrap();
        let junk: TestStruct = serde_json::from_str(r#"{"latitude": "n/a"}"#).unwrap();
        assert_eq!(number.latitude, Some(52.5));
        assert_eq!(text.latitude, Some(52.5));
        assert_eq!(null.latitude, None);
        assert_eq!(junk.latitude, None);
    }

    #[test]
    fn test_deserialize_string_list() {
        let mixed: TestStruct = serde_json::from_str(r#"{"forms": [1234, "12345"]}"#).unwrap();
        let null: TestStruct = serde_json::from_str(r#"{"forms": null}"#).unwrap();
        let absent: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(mixed.forms, vec!["1234".to_string(), "12345".to_string()]);
        assert!(null.forms.is_empty());
        assert!(absent.forms.is_empty());
    }
}
