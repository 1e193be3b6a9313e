//! Contract between recognizers and the selection layer

use crate::candidate::{CandidateSet, ScoreDirection};
use crate::labels::Label;
use crate::selector::select;
use anyhow::Result;
use tracing::warn;

/// Anything that scores a frame against a fixed list of labels
///
/// The score direction is a property of the recognizer's configuration,
/// never inferred from the scores themselves.
pub trait Recognizer<L: Label> {
    type Frame: ?Sized;

    fn direction(&self) -> ScoreDirection;

    /// One candidate per template or model, in a stable order
    fn score_frame(&self, frame: &Self::Frame) -> Result<CandidateSet<L>>;

    /// Winning label of `frame`, or the sentinel
    ///
    /// A failing recognizer contributes an empty candidate set.
    fn identify(&self, frame: &Self::Frame) -> L {
        let candidates = self.score_frame(frame).unwrap_or_else(|e| {
            warn!("Recognizer failed, treating frame as unscored: {:#}", e);
            CandidateSet::new()
        });

        select(&candidates, self.direction()).unwrap_or(L::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Hero;
    use anyhow::anyhow;

    struct Fixed(Vec<(Hero, f64)>, ScoreDirection);

    impl Recognizer<Hero> for Fixed {
        type Frame = ();

        fn direction(&self) -> ScoreDirection {
            self.1
        }

        fn score_frame(&self, _frame: &()) -> Result<CandidateSet<Hero>> {
            Ok(self.0.iter().copied().collect())
        }
    }

    struct Broken;

    impl Recognizer<Hero> for Broken {
        type Frame = ();

        fn direction(&self) -> ScoreDirection {
            ScoreDirection::MaximizeIsBetter
        }

        fn score_frame(&self, _frame: &()) -> Result<CandidateSet<Hero>> {
            Err(anyhow!("classifier file missing"))
        }
    }

    #[test]
    fn test_identify_uses_configured_direction() {
        let scores = vec![(Hero::Mercy, 0.2), (Hero::Lucio, 0.8)];
        let max = Fixed(scores.clone(), ScoreDirection::MaximizeIsBetter);
        let min = Fixed(scores, ScoreDirection::MinimizeIsBetter);

        assert_eq!(max.identify(&()), Hero::Lucio);
        assert_eq!(min.identify(&()), Hero::Mercy);
    }

    #[test]
    fn test_failure_and_empty_yield_sentinel() {
        assert_eq!(Broken.identify(&()), Hero::NoHero);
        assert_eq!(
            Fixed(Vec::new(), ScoreDirection::MinimizeIsBetter).identify(&()),
            Hero::NoHero
        );
    }
}
