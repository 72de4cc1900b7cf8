//! C entry point.
//!
//! Hosts load the bundled grammar through `tree_sitter_cairo`, which returns
//! an opaque handle valid for the life of the process.

use std::ptr;

use crate::cairo;
use crate::language::Language;

/// Opaque handle to the bundled Cairo language, or null if it failed to
/// compile. The pointee is never freed and must not be written through.
#[unsafe(no_mangle)]
pub extern "C" fn tree_sitter_cairo() -> *const Language {
    match cairo::language_ref() {
        Some(language) => language,
        None => {
            tracing::error!("bundled Cairo grammar failed to compile");
            ptr::null()
        }
    }
}
