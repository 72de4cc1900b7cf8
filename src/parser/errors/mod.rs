//! Parser diagnostics
//!
//! Parsing never fails on bad input; errors become nodes in the tree. This
//! module turns those nodes back into reportable diagnostics:
//! - Categorized error codes for filtering and documentation
//! - Hints for the repair the parser made
//! - Related span tracking (e.g. the `{` a missing `}` would close)

mod codes;
mod diagnostics;
mod error;

pub use codes::ErrorCode;
pub use error::{RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder};
