//! Parser options

use serde::{Deserialize, Serialize};

/// Tuning knobs for one [`Parser`](super::Parser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Number of tokens after a parse error searched for a resynchronization point
    pub recovery_window: usize,
    /// Maximum number of generalized-parse branches kept alive at once
    pub max_branches: usize,
    /// Maximum consecutive missing-node insertions before skipping input instead
    pub max_missing: u32,
    /// Reuse unchanged subtrees of an edited tree when reparsing
    pub incremental: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recovery_window: 6,
            max_branches: 8,
            max_missing: 4,
            incremental: true,
        }
    }
}

impl ParserConfig {
    pub fn with_recovery_window(mut self, tokens: usize) -> Self {
        self.recovery_window = tokens.max(1);
        self
    }

    pub fn with_max_branches(mut self, branches: usize) -> Self {
        self.max_branches = branches.max(1);
        self
    }

    pub fn with_max_missing(mut self, insertions: u32) -> Self {
        self.max_missing = insertions;
        self
    }

    pub fn with_incremental(mut self, enabled: bool) -> Self {
        self.incremental = enabled;
        self
    }
}
