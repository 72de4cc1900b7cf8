//! Grammar handles.
//!
//! A [`Language`] bundles an immutable [`ParseTable`] with the scanner used to
//! tokenize source for it. It is cheap to clone and safe to share between
//! threads; every parser holding one reads the same table.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::lexer::{TableLexer, TokenSource};
use crate::table::ParseTable;

/// Creates a fresh scanner for one parse.
pub type ScannerFactory = Arc<dyn Fn() -> Box<dyn TokenSource> + Send + Sync>;

struct LanguageInner {
    table: Arc<ParseTable>,
    lexer: TableLexer,
    scanner: Option<ScannerFactory>,
}

/// An opaque handle to one compiled grammar.
#[derive(Clone)]
pub struct Language {
    inner: Arc<LanguageInner>,
}

impl Language {
    /// Wrap a compiled table. Its terminal patterns are compiled into the
    /// default scanner here, so a bad pattern is reported at load time.
    pub fn from_table(table: ParseTable) -> Result<Self> {
        let lexer = TableLexer::new(&table)?;
        tracing::debug!(
            language = %table.name(),
            states = table.state_count(),
            symbols = table.symbol_count(),
            "loaded language"
        );
        Ok(Self { inner: Arc::new(LanguageInner { table: Arc::new(table), lexer, scanner: None }) })
    }

    /// Replace the default table-driven scanner.
    ///
    /// The factory is called once per parse; scanners may keep per-parse state.
    pub fn with_scanner<F>(self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn TokenSource> + Send + Sync + 'static,
    {
        let inner = LanguageInner {
            table: self.inner.table.clone(),
            lexer: self.inner.lexer.clone(),
            scanner: Some(Arc::new(factory)),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn name(&self) -> &str {
        self.inner.table.name()
    }

    pub fn table(&self) -> &ParseTable {
        &self.inner.table
    }

    pub(crate) fn table_arc(&self) -> &Arc<ParseTable> {
        &self.inner.table
    }

    /// The scanner a parse uses when the caller supplies none.
    pub(crate) fn scanner(&self) -> Box<dyn TokenSource> {
        match &self.inner.scanner {
            Some(factory) => factory(),
            None => Box::new(self.inner.lexer.clone()),
        }
    }

    /// Whether both handles share the same loaded table.
    pub fn ptr_eq(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.inner.table, &other.inner.table)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("states", &self.table().state_count())
            .field("external_scanner", &self.inner.scanner.is_some())
            .finish()
    }
}

/// Load a grammar from a compiled table blob.
///
/// Fails with [`Error::MalformedTable`](crate::Error::MalformedTable) when the
/// blob's format, version or contents do not match what the engine expects.
pub fn load_grammar(blob: &[u8]) -> Result<Language> {
    Language::from_table(ParseTable::from_blob(blob)?)
}
