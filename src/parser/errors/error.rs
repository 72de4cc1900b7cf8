//! Syntax diagnostics
//!
//! A [`SyntaxError`] describes one error or missing node found in a tree:
//! where it is, which grammar symbol it concerns, a code for filtering, and
//! optionally a hint and related locations (e.g. the `{` a missing `}` closes).

use std::fmt;

use smol_str::SmolStr;

use super::codes::ErrorCode;
use crate::base::{Point, TextRange, TextSize};

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A problem the parser had to repair
    #[default]
    Error,
    /// Suspicious input that still parsed
    Warning,
    /// An informational note
    Hint,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

/// A secondary location attached to a diagnostic.
///
/// Points at the source that explains the error, e.g. the `{` a missing `}`
/// would close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// Description of this related location
    pub message: String,
    /// Byte range of the related source
    pub range: TextRange,
}

impl RelatedInfo {
    /// Create a new related info
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }
}

/// One diagnostic derived from an error or missing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Byte range; empty for missing nodes.
    pub range: TextRange,
    /// Row/column of the range start.
    pub start: Point,
    /// Categorized error code
    pub code: ErrorCode,
    /// Error severity
    pub severity: Severity,
    /// Grammar symbol the diagnostic is about: the missing terminal, or the
    /// first unexpected token.
    pub symbol: Option<SmolStr>,
    /// Suggested repair, matching what the parser inserted or skipped
    pub hint: Option<String>,
    /// Related source locations
    pub related: Vec<RelatedInfo>,
}

impl SyntaxError {
    /// Create a new syntax error with minimal information
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self::builder(code).message(message).range(range).build()
    }

    /// An error with an empty range at `offset`.
    pub fn at_offset(message: impl Into<String>, offset: TextSize, code: ErrorCode) -> Self {
        Self::new(message, TextRange::empty(offset), code)
    }

    /// Create a builder for more complex error construction
    pub fn builder(code: ErrorCode) -> SyntaxErrorBuilder {
        SyntaxErrorBuilder::new(code)
    }

    /// Add a hint to this error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Add related information
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Check if this error has a hint
    pub fn has_hint(&self) -> bool {
        self.hint.is_some()
    }

    /// Check if this error has related information
    pub fn has_related(&self) -> bool {
        !self.related.is_empty()
    }

    /// Multi-line rendering: `line:col code: message`, then the hint and
    /// related locations indented below.
    pub fn format(&self) -> String {
        let mut out = format!("{}:{} {}: {}", self.start.row + 1, self.start.column + 1, self.code, self.message);
        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  hint: {hint}"));
        }
        for related in &self.related {
            out.push_str(&format!("\n  note: {} at {:?}", related.message, related.range));
        }
        out
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity.as_str(), self.code, self.message)
    }
}

/// Builder for [`SyntaxError`].
#[derive(Debug, Clone)]
pub struct SyntaxErrorBuilder {
    code: ErrorCode,
    message: Option<String>,
    range: Option<TextRange>,
    start: Point,
    severity: Severity,
    symbol: Option<SmolStr>,
    hint: Option<String>,
    related: Vec<RelatedInfo>,
}

impl SyntaxErrorBuilder {
    /// Start an error with `code` and no other information
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            range: None,
            start: Point::ZERO,
            severity: Severity::Error,
            symbol: None,
            hint: None,
            related: Vec::new(),
        }
    }

    /// Set the message; defaults to the code's message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the byte range
    pub fn range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Set a zero-width range at `offset`
    pub fn at_offset(mut self, offset: TextSize) -> Self {
        self.range = Some(TextRange::empty(offset));
        self
    }

    /// Row/column of the range start.
    pub fn start(mut self, start: Point) -> Self {
        self.start = start;
        self
    }

    /// Set the severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the grammar symbol the error concerns
    pub fn symbol(mut self, symbol: impl Into<SmolStr>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the hint
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Add a related location
    pub fn related(mut self, message: impl Into<String>, range: TextRange) -> Self {
        self.related.push(RelatedInfo::new(message, range));
        self
    }

    /// Finish the error. Without a message the code's default message is used;
    /// without a range the error sits at offset 0.
    pub fn build(self) -> SyntaxError {
        SyntaxError {
            message: self.message.unwrap_or_else(|| self.code.default_message().to_string()),
            range: self.range.unwrap_or_else(|| TextRange::empty(TextSize::new(0))),
            start: self.start,
            code: self.code,
            severity: self.severity,
            symbol: self.symbol,
            hint: self.hint,
            related: self.related,
        }
    }
}
