//! Fixed-size set of terminal symbols.

use serde::{Deserialize, Serialize};

use crate::base::SymbolId;

/// A set of terminal symbol ids, stored as a bitset.
///
/// Serialized as a sorted list of ids so compiled tables stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<SymbolId>", into = "Vec<SymbolId>")]
pub struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set containing every terminal id below `terminal_count`.
    pub fn full(terminal_count: usize) -> Self {
        let mut set = Self::new();
        for id in 0..terminal_count {
            set.insert(id as SymbolId);
        }
        set
    }

    pub fn insert(&mut self, symbol: SymbolId) -> bool {
        let (word, bit) = Self::slot(symbol);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_set = self.words[word] & bit != 0;
        self.words[word] |= bit;
        !was_set
    }

    pub fn contains(&self, symbol: SymbolId) -> bool {
        let (word, bit) = Self::slot(symbol);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Add every member of `other`. Returns true if the set grew.
    pub fn union_with(&mut self, other: &TerminalSet) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | *theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        // Derived Eq/Hash require no trailing zero words.
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..64u32)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| (index as u32 * 64 + bit) as SymbolId)
        })
    }

    fn slot(symbol: SymbolId) -> (usize, u64) {
        (symbol as usize / 64, 1u64 << (symbol as u32 % 64))
    }
}

impl From<Vec<SymbolId>> for TerminalSet {
    fn from(ids: Vec<SymbolId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<TerminalSet> for Vec<SymbolId> {
    fn from(set: TerminalSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<SymbolId> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = SymbolId>>(iter: I) -> Self {
        let mut set = TerminalSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_iterate_sorted() {
        let set: TerminalSet = vec![70, 3, 64, 3].into();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 64, 70]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(64));
        assert!(!set.contains(65));
    }

    #[test]
    fn test_union_reports_growth() {
        let mut a: TerminalSet = vec![1, 2].into();
        let b: TerminalSet = vec![2, 130].into();
        assert!(a.union_with(&b));
        assert!(!a.union_with(&b));
        assert!(a.contains(130));
    }

    #[test]
    fn test_sets_with_different_word_counts_compare_by_members() {
        let a: TerminalSet = vec![1].into();
        let b = TerminalSet::full(2);
        assert!(b.contains(0) && b.contains(1));
        assert_ne!(a, b);
    }
}
