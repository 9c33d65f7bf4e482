//! Text cleanup for values written into exported payloads and data point names.

const TAB: char = '\t';
const COMMA: char = ',';
const NEWLINE: char = '\n';

/// Replaces every tab, comma and newline with a single space.
///
/// ```
/// use flowsync_core::response::clean_value;
///
/// assert_eq!(clean_value("\tabc,"), " abc ");
/// ```
pub fn clean_value(value: &str) -> String {
    value.replace([TAB, COMMA, NEWLINE], " ")
}

/// Replaces tabs and newlines with a space, then trims surrounding whitespace.
pub fn sanitize_value(value: &str) -> String {
    value.replace([TAB, NEWLINE], " ").trim().to_string()
}
