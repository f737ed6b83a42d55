//! Selector syntax errors
//!
//! Error codes follow the convention E{category}{number}:
//! - E01xx: lexical errors (invalid characters)
//! - E02xx: structural errors (brackets, separators)
//! - E03xx: missing names
//! - E04xx: parameter and property errors

use std::fmt;

use text_size::{TextRange, TextSize};

/// Error codes for selector diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid or unexpected character
    E0101,
    /// Unclosed bracket `[`
    E0201,
    /// Empty path segment (`A//B`, trailing `/`)
    E0202,
    /// Unexpected token after a complete fragment
    E0203,
    /// Missing name after `$sibling-`
    E0301,
    /// Missing property name after `.`
    E0302,
    /// Malformed `key=value` parameter
    E0401,
    /// Unknown ancestor filter key
    E0402,
    /// Property bind without a `.property` part
    E0403,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0101 => "E0101",
            ErrorCode::E0201 => "E0201",
            ErrorCode::E0202 => "E0202",
            ErrorCode::E0203 => "E0203",
            ErrorCode::E0301 => "E0301",
            ErrorCode::E0302 => "E0302",
            ErrorCode::E0401 => "E0401",
            ErrorCode::E0402 => "E0402",
            ErrorCode::E0403 => "E0403",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error inside a selector expression.
///
/// The range is relative to the parsed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
    pub code: ErrorCode,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
        }
    }

    /// Create an error at a specific offset with zero-width range
    pub fn at_offset(message: impl Into<String>, offset: TextSize, code: ErrorCode) -> Self {
        Self::new(message, TextRange::empty(offset), code)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
