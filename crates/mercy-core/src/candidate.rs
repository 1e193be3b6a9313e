//! Scored recognition candidates
//!
//! A [`CandidateSet`] is produced fresh for every frame by one recognizer
//! configuration. Every score in a set is on that recognizer's native scale
//! and shares one [`ScoreDirection`], which the caller supplies.

use serde::{Deserialize, Serialize};

/// Which end of a recognizer's score scale is the better match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreDirection {
    /// Distance-like metrics (squared difference)
    MinimizeIsBetter,
    /// Correlation-like metrics and detection counts
    MaximizeIsBetter,
}

impl ScoreDirection {
    /// Strict comparison: `true` only if `candidate` beats `current`
    pub fn is_better(self, candidate: f64, current: f64) -> bool {
        match self {
            ScoreDirection::MinimizeIsBetter => candidate < current,
            ScoreDirection::MaximizeIsBetter => candidate > current,
        }
    }
}

/// One label with the score a recognizer gave it for a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate<L> {
    pub label: L,
    pub score: f64,
}

impl<L> Candidate<L> {
    pub fn new(label: L, score: f64) -> Self {
        Self { label, score }
    }
}

/// Ordered candidates for a single frame
///
/// Order is significant: on an exact tie the first candidate wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet<L> {
    candidates: Vec<Candidate<L>>,
}

impl<L> CandidateSet<L> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, label: L, score: f64) {
        self.candidates.push(Candidate::new(label, score));
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate<L>> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate<L>] {
        &self.candidates
    }
}

impl<L> Default for CandidateSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> FromIterator<Candidate<L>> for CandidateSet<L> {
    fn from_iter<T: IntoIterator<Item = Candidate<L>>>(iter: T) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}

impl<L> FromIterator<(L, f64)> for CandidateSet<L> {
    fn from_iter<T: IntoIterator<Item = (L, f64)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(label, score)| Candidate::new(label, score))
            .collect()
    }
}

impl<L> IntoIterator for CandidateSet<L> {
    type Item = Candidate<L>;
    type IntoIter = std::vec::IntoIter<Candidate<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a, L> IntoIterator for &'a CandidateSet<L> {
    type Item = &'a Candidate<L>;
    type IntoIter = std::slice::Iter<'a, Candidate<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_strict() {
        assert!(ScoreDirection::MaximizeIsBetter.is_better(0.9, 0.2));
        assert!(!ScoreDirection::MaximizeIsBetter.is_better(0.5, 0.5));
        assert!(ScoreDirection::MinimizeIsBetter.is_better(0.1, 0.2));
        assert!(!ScoreDirection::MinimizeIsBetter.is_better(0.2, 0.2));
    }

    #[test]
    fn test_collect_preserves_order() {
        let set: CandidateSet<&str> = vec![("a", 0.3), ("b", 0.1)].into_iter().collect();
        let labels: Vec<_> = set.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
