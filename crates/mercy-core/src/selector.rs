//! Best-candidate selection
//!
//! Scans a [`CandidateSet`] once, keeping the first candidate that no later
//! candidate strictly beats. No threshold is applied: a weak match still wins
//! when nothing scored better.

use crate::candidate::{Candidate, CandidateSet, ScoreDirection};

/// Winning candidate of a frame, or `None` for an empty set
///
/// Candidates with a NaN score are skipped.
pub fn select_candidate<L>(
    candidates: &CandidateSet<L>,
    direction: ScoreDirection,
) -> Option<&Candidate<L>> {
    let mut best: Option<&Candidate<L>> = None;

    for candidate in candidates.iter().filter(|c| !c.score.is_nan()) {
        match best {
            Some(current) if !direction.is_better(candidate.score, current.score) => {}
            _ => best = Some(candidate),
        }
    }

    best
}

/// Winning label of a frame, or `None` for an empty set
pub fn select<L: Clone>(candidates: &CandidateSet<L>, direction: ScoreDirection) -> Option<L> {
    select_candidate(candidates, direction).map(|c| c.label.clone())
}
