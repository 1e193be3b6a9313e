//! Temporal vote aggregation
//!
//! Turns noisy per-frame confidences into a label that reflects the last few
//! observations of every key. Each key owns a bounded history, newest value
//! first. A key's score is `-1.0 + sum(history)`; the key with the strictly
//! greatest score wins, earlier keys winning ties. A key only wins with a
//! score above the bias, so negative or zero evidence reports no key.
//!
//! The key set is fixed at construction. Values must be fed in frame order:
//! skipped or reordered frames shift the window silently.

use std::collections::VecDeque;
use std::fmt::Display;
use thiserror::Error;
use tracing::debug;

/// History capacity per key
pub const HISTORY_CAPACITY: usize = 10;

/// Score offset applied to every key before summing its history
const SCORE_BIAS: f64 = -1.0;

/// Reported by [`TemporalAggregator::current_label`] when nothing has been observed
pub const NO_LABEL: &str = "NONE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("aggregator requires at least one key")]
    EmptyKeySet,
    #[error("duplicate aggregator key at position {0}")]
    DuplicateKey(usize),
    #[error("history window must hold at least one value")]
    ZeroWindow,
}

/// Sliding-window vote counter keyed by label
#[derive(Debug, Clone)]
pub struct TemporalAggregator<K> {
    keys: Vec<K>,
    histories: Vec<VecDeque<f64>>,
    window: usize,
}

impl<K: PartialEq> TemporalAggregator<K> {
    /// Create an aggregator with the default window of [`HISTORY_CAPACITY`]
    pub fn new<I>(keys: I) -> Result<Self, AggregatorError>
    where
        I: IntoIterator<Item = K>,
    {
        Self::with_window(keys, HISTORY_CAPACITY)
    }

    pub fn with_window<I>(keys: I, window: usize) -> Result<Self, AggregatorError>
    where
        I: IntoIterator<Item = K>,
    {
        if window == 0 {
            return Err(AggregatorError::ZeroWindow);
        }

        let keys: Vec<K> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(AggregatorError::EmptyKeySet);
        }
        if let Some(position) =
            (1..keys.len()).find(|&i| keys[..i].contains(&keys[i]))
        {
            return Err(AggregatorError::DuplicateKey(position));
        }

        let histories = keys
            .iter()
            .map(|_| VecDeque::with_capacity(window))
            .collect();

        Ok(Self {
            keys,
            histories,
            window,
        })
    }

    /// Record a confidence value for `key`
    ///
    /// Returns `false`, leaving every history untouched, when `key` was not
    /// part of the constructed key set.
    pub fn add_value(&mut self, key: &K, value: f64) -> bool {
        let Some(index) = self.key_index(key) else {
            debug!("rejected value {} for unknown aggregator key", value);
            return false;
        };

        let history = &mut self.histories[index];
        if history.len() >= self.window {
            history.pop_back();
        }
        history.push_front(value);

        true
    }

    /// Index of the currently favored key, or `None` if no score exceeds the bias
    pub fn current_index(&self) -> Option<usize> {
        let mut best = None;
        let mut best_score = SCORE_BIAS;

        for (index, history) in self.histories.iter().enumerate() {
            let score = Self::history_score(history);
            if score > best_score {
                best = Some(index);
                best_score = score;
            }
        }

        best
    }

    /// The currently favored key
    pub fn current_key(&self) -> Option<&K> {
        self.current_index().map(|index| &self.keys[index])
    }

    /// Biased score of `key`, `None` for unknown keys
    pub fn score(&self, key: &K) -> Option<f64> {
        self.key_index(key)
            .map(|index| Self::history_score(&self.histories[index]))
    }

    /// History of `key`, newest value first
    pub fn history(&self, key: &K) -> Option<&VecDeque<f64>> {
        self.key_index(key).map(|index| &self.histories[index])
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Forget every recorded value, keeping the key set
    pub fn clear(&mut self) {
        for history in &mut self.histories {
            history.clear();
        }
    }

    fn key_index(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    fn history_score(history: &VecDeque<f64>) -> f64 {
        history.iter().fold(SCORE_BIAS, |sum, value| sum + value)
    }
}

impl<K: PartialEq + Display> TemporalAggregator<K> {
    /// Display form of the favored key, or `"NONE"`
    pub fn current_label(&self) -> String {
        match self.current_key() {
            Some(key) => key.to_string(),
            None => NO_LABEL.to_string(),
        }
    }
}
