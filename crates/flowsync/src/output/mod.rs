//! Output formatting functions.

pub mod pretty;

use crate::cli::OutputFormat;

/// Serializes `value` for the json format.
pub fn format_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Prints `value` as json, or through `pretty` otherwise.
pub fn print<T, F>(value: &T, format: OutputFormat, pretty: F)
where
    T: serde::Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Pretty => println!("{}", pretty(value)),
    }
}
