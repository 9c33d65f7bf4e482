//! Compound question ids for repeatable groups.
//!
//! Answers inside a repeatable group are keyed by `"<questionId>|<iteration>"`.
//! Plain ids (no separator) belong to iteration 0.

use std::fmt;

/// Separator between the base question id and its iteration.
pub const ITERATION_SEPARATOR: char = '|';

/// A question id split into its base id and iteration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundId {
    pub base: String,
    pub iteration: i32,
}

impl CompoundId {
    pub fn new(base: impl Into<String>, iteration: i32) -> Self {
        Self {
            base: base.into(),
            iteration,
        }
    }

    /// Decomposes a raw id.
    ///
    /// A missing or unparsable iteration defaults to 0. Negative iterations are kept
    /// so callers can decide to exclude them.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowsync_core::response::CompoundId;
    ///
    /// let id = CompoundId::parse("205929118|1");
    /// assert_eq!(id.base, "205929118");
    /// assert_eq!(id.iteration, 1);
    ///
    /// assert_eq!(CompoundId::parse("205929118").iteration, 0);
    /// assert_eq!(CompoundId::parse("205929118|x").iteration, 0);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(ITERATION_SEPARATOR) {
            Some((base, suffix)) => Self {
                base: base.to_string(),
                iteration: suffix.trim().parse().unwrap_or(0),
            },
            None => Self {
                base: raw.to_string(),
                iteration: 0,
            },
        }
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, ITERATION_SEPARATOR, self.iteration)
    }
}
