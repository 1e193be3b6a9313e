//! Per-stream label smoothing on top of [`TemporalAggregator`]

use crate::aggregator::{AggregatorError, TemporalAggregator};
use crate::labels::Label;

/// Vote weight of one detected frame
pub const VOTE: f64 = 1.0;

/// Feeds per-frame winners into an aggregator and reports the smoothed label
///
/// Sentinel detections cast no vote, so the previous favorite stands.
#[derive(Debug, Clone)]
pub struct LabelSmoother<L> {
    aggregator: TemporalAggregator<L>,
}

impl<L: Label> LabelSmoother<L> {
    pub fn new<I>(labels: I, window: usize) -> Result<Self, AggregatorError>
    where
        I: IntoIterator<Item = L>,
    {
        Ok(Self {
            aggregator: TemporalAggregator::with_window(labels, window)?,
        })
    }

    /// Record this frame's winner and return the smoothed label
    pub fn observe(&mut self, detected: L) -> L {
        if !detected.is_none() {
            self.aggregator.add_value(&detected, VOTE);
        }
        self.current()
    }

    pub fn current(&self) -> L {
        self.aggregator.current_key().copied().unwrap_or(L::NONE)
    }

    pub fn aggregator(&self) -> &TemporalAggregator<L> {
        &self.aggregator
    }

    pub fn reset(&mut self) {
        self.aggregator.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Hero;

    #[test]
    fn test_single_outlier_is_absorbed() -> Result<(), AggregatorError> {
        let mut smoother = LabelSmoother::new([Hero::Mercy, Hero::Lucio], 10)?;
        assert_eq!(smoother.current(), Hero::NoHero);

        for _ in 0..3 {
            smoother.observe(Hero::Mercy);
        }
        assert_eq!(smoother.observe(Hero::Lucio), Hero::Mercy);
        assert_eq!(smoother.observe(Hero::NoHero), Hero::Mercy);
        Ok(())
    }

    #[test]
    fn test_window_bounds_each_label() -> Result<(), AggregatorError> {
        let mut smoother = LabelSmoother::new([Hero::Mercy, Hero::Lucio], 2)?;
        for _ in 0..5 {
            smoother.observe(Hero::Mercy);
        }
        smoother.observe(Hero::Lucio);
        // two votes each, earlier key wins the tie
        assert_eq!(smoother.observe(Hero::Lucio), Hero::Mercy);

        smoother.reset();
        assert_eq!(smoother.observe(Hero::Lucio), Hero::Lucio);
        Ok(())
    }

    #[test]
    fn test_unconfigured_label_casts_no_vote() -> Result<(), AggregatorError> {
        let mut smoother = LabelSmoother::new([Hero::Mercy], 3)?;
        assert_eq!(smoother.observe(Hero::Ana), Hero::NoHero);
        Ok(())
    }
}
