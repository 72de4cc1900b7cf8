//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (input no terminal matches)
//! - E02xx: Structural errors (required tokens the source omitted)
//! - E03xx: Unexpected input skipped by error recovery
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
///
/// Each error code represents a specific category of parse error,
/// enabling filtering, documentation, and IDE integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Bytes no terminal of the grammar matches
    E0101,

    // =========================================================================
    // E02xx: Structural errors (missing nodes)
    // =========================================================================
    /// Missing semicolon
    E0201,
    /// Unclosed brace `{`
    E0202,
    /// Unclosed parenthesis `(`
    E0203,
    /// Unclosed bracket `[`
    E0204,
    /// Missing identifier/name
    E0205,
    /// Any other missing token
    E0206,

    // =========================================================================
    // E03xx: Unexpected input
    // =========================================================================
    /// Tokens skipped to resynchronize
    E0301,
    /// Already-parsed structure abandoned to resynchronize
    E0302,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Input that could not be parsed at all
    E0901,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            Self::E0206 => "E0206",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0901 => "E0901",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 => "lexical error",
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 | Self::E0205 | Self::E0206 => {
                "structural error"
            }
            Self::E0301 | Self::E0302 => "unexpected input",
            Self::E0901 => "syntax error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0201 => "missing semicolon",
            Self::E0202 => "unclosed brace",
            Self::E0203 => "unclosed parenthesis",
            Self::E0204 => "unclosed bracket",
            Self::E0205 => "missing identifier",
            Self::E0206 => "missing token",
            Self::E0301 => "unexpected token",
            Self::E0302 => "unexpected construct",
            Self::E0901 => "unparsable input",
        }
    }

    /// Check if this error comes from a missing node
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 | Self::E0205 | Self::E0206)
    }

    /// Code for a missing terminal with the given grammar name.
    pub(crate) fn for_missing(name: &str) -> Self {
        match name {
            ";" => Self::E0201,
            "}" => Self::E0202,
            ")" => Self::E0203,
            "]" => Self::E0204,
            _ if name.to_ascii_lowercase().contains("ident") => Self::E0205,
            _ => Self::E0206,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
