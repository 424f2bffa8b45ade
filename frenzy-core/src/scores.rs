use alloc::vec::Vec;

use serde::Serialize;

use crate::constants::HIGH_SCORE_CAP;

/// Persisted top-five list. Always sorted descending, never longer than
/// [`HIGH_SCORE_CAP`], never contains zero. The store layer decides where
/// the list lives; this type owns the qualification rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HighScores {
    entries: Vec<u32>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the list from untrusted input (a hand-edited score file,
    /// for instance): drops zeros, sorts descending, truncates.
    pub fn from_entries(entries: Vec<u32>) -> Self {
        let mut entries = entries;
        entries.retain(|score| *score > 0);
        entries.sort_unstable_by(|a, b| b.cmp(a));
        entries.truncate(HIGH_SCORE_CAP);
        Self { entries }
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A score makes the list when it is positive and either the list has
    /// room or it beats the current minimum. Ties with the minimum of a
    /// full list do not qualify.
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < HIGH_SCORE_CAP {
            return true;
        }
        match self.entries.last() {
            Some(min) => score > *min,
            None => true,
        }
    }

    /// Inserts a qualifying score, re-sorts, truncates. Returns whether
    /// the list changed.
    pub fn record(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.entries.push(score);
        self.entries.sort_unstable_by(|a, b| b.cmp(a));
        self.entries.truncate(HIGH_SCORE_CAP);
        true
    }
}
