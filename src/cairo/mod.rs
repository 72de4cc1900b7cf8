//! Bundled Cairo language.
//!
//! The grammar is compiled on first use and shared by every caller. Tokens
//! come from a logos scanner rather than the table's own patterns.

mod grammar;
mod lexer;

pub use grammar::grammar;
pub use lexer::{CairoScanner, CairoToken};

use std::sync::{Arc, LazyLock};

use crate::error::Result;
use crate::language::Language;

static LANGUAGE: LazyLock<Result<Language>> = LazyLock::new(build);

fn build() -> Result<Language> {
    let language = Language::from_table(grammar().build()?)?;
    let table = Arc::clone(language.table_arc());
    Ok(language.with_scanner(move || Box::new(CairoScanner::new(Arc::clone(&table)))))
}

/// The Cairo language, compiling it on first call.
pub fn try_language() -> Result<Language> {
    LANGUAGE.clone()
}

/// The Cairo language.
///
/// # Panics
///
/// Panics if the bundled grammar fails to compile, which [`try_language`]
/// reports as an error instead.
pub fn language() -> Language {
    match try_language() {
        Ok(language) => language,
        Err(error) => panic!("bundled Cairo grammar failed to compile: {error}"),
    }
}

/// The shared handle, for callers that need a stable address.
pub(crate) fn language_ref() -> Option<&'static Language> {
    LANGUAGE.as_ref().ok()
}
