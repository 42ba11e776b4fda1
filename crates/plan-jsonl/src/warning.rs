//! Non-fatal problems found while reading JSONL data.
//!
//! Resilient reading never stops on a bad line. Each skipped line becomes a
//! [`Warning`] carrying its 1-based line number.
//!
//! # Examples
//!
//! ```
//! use plan_jsonl::Warning;
//!
//! let warning = Warning::MalformedJson {
//!     line_number: 5,
//!     error: "unexpected end of input".to_string(),
//! };
//! assert_eq!(warning.line_number(), 5);
//! assert_eq!(warning.kind(), "malformed_json");
//! ```

use std::fmt;

/// A line that was skipped during resilient reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The line is not syntactically valid JSON.
    MalformedJson {
        /// The 1-based line number where the error occurred.
        line_number: usize,
        /// A description of the parse error.
        error: String,
    },

    /// The line is valid JSON but does not match the expected record shape,
    /// e.g. an edge without a `to` field.
    InvalidRecord {
        /// The 1-based line number of the record.
        line_number: usize,
        /// A description of the deserialization error.
        error: String,
    },

    /// The line was skipped before JSON decoding (e.g. invalid UTF-8).
    SkippedLine {
        /// The 1-based line number that was skipped.
        line_number: usize,
        /// The reason the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. }
            | Self::InvalidRecord { line_number, .. }
            | Self::SkippedLine { line_number, .. } => *line_number,
        }
    }

    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedJson { line_number, error } => {
                format!("line {}: malformed JSON: {}", line_number, error)
            }
            Self::InvalidRecord { line_number, error } => {
                format!("line {}: invalid record: {}", line_number, error)
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => format!("line {}: skipped: {}", line_number, reason),
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Warning {}
