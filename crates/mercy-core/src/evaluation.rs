//! Accuracy bookkeeping per recognition-method variant

use crate::csv;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

/// Correct and total frame counts for one variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalTally {
    pub correct: u64,
    pub total: u64,
}

impl EvalTally {
    /// Percentage of correct frames, `None` when nothing was recorded
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }
}

/// One summarized row: a variant and its final counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRow<V> {
    pub variant: V,
    pub correct: u64,
    pub total: u64,
}

impl<V> EvalRow<V> {
    pub fn tally(&self) -> EvalTally {
        EvalTally {
            correct: self.correct,
            total: self.total,
        }
    }
}

/// Compares detected labels with expected ones and tallies per variant
///
/// Frames without ground truth must be filtered out before `record`.
/// Rows keep the order in which variants were first recorded.
#[derive(Debug, Clone)]
pub struct EvaluationHarness<V> {
    tallies: Vec<(V, EvalTally)>,
}

impl<V: PartialEq + Clone> EvaluationHarness<V> {
    pub fn new() -> Self {
        Self {
            tallies: Vec::new(),
        }
    }

    pub fn record<L: PartialEq>(&mut self, variant: V, expected: &L, detected: &L) {
        let tally = self.tally_mut(variant);
        tally.total += 1;
        if expected == detected {
            tally.correct += 1;
        }
    }

    pub fn tally(&self, variant: &V) -> Option<EvalTally> {
        self.tallies
            .iter()
            .find(|(v, _)| v == variant)
            .map(|(_, tally)| *tally)
    }

    pub fn summarize(&self) -> Vec<EvalRow<V>> {
        self.tallies
            .iter()
            .map(|(variant, tally)| EvalRow {
                variant: variant.clone(),
                correct: tally.correct,
                total: tally.total,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    fn tally_mut(&mut self, variant: V) -> &mut EvalTally {
        let index = match self.tallies.iter().position(|(v, _)| *v == variant) {
            Some(index) => index,
            None => {
                self.tallies.push((variant, EvalTally::default()));
                self.tallies.len() - 1
            }
        };
        &mut self.tallies[index].1
    }
}

impl<V: PartialEq + Clone> Default for EvaluationHarness<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exportable evaluation result for one source (video or frame directory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub rows: Vec<EvalReportRow>,
}

/// `source, detection type, variant, correct, total`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalReportRow {
    pub source: String,
    pub detection_type: String,
    pub variant: String,
    pub correct: u64,
    pub total: u64,
}

impl EvalReport {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append every summarized row of `harness`
    pub fn extend_from<V: PartialEq + Clone + Display>(
        &mut self,
        source: &str,
        detection_type: &str,
        harness: &EvaluationHarness<V>,
    ) {
        self.rows
            .extend(harness.summarize().into_iter().map(|row| EvalReportRow {
                source: source.to_string(),
                detection_type: detection_type.to_string(),
                variant: row.variant.to_string(),
                correct: row.correct,
                total: row.total,
            }));
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.source.clone(),
                    row.detection_type.clone(),
                    row.variant.clone(),
                    row.correct.to_string(),
                    row.total.to_string(),
                ]
            })
            .collect();

        csv::save(&path, &rows)
            .with_context(|| format!("Failed to save evaluation report: {:?}", path.as_ref()))
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut rows = Vec::new();

        for (line_num, fields) in csv::load(path)?.into_iter().enumerate() {
            if fields.len() < 5 {
                tracing::warn!(
                    "Skipping malformed evaluation row {} in {:?}",
                    line_num + 1,
                    path
                );
                continue;
            }

            rows.push(EvalReportRow {
                source: fields[0].clone(),
                detection_type: fields[1].clone(),
                variant: fields[2].clone(),
                correct: fields[3].parse().with_context(|| {
                    format!("Invalid correct count at line {}: '{}'", line_num + 1, fields[3])
                })?,
                total: fields[4].parse().with_context(|| {
                    format!("Invalid total count at line {}: '{}'", line_num + 1, fields[4])
                })?,
            });
        }

        Ok(Self { rows })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize evaluation report")
    }
}

impl Default for EvalReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Hero;

    #[test]
    fn test_record_counts_correct_and_total() {
        let mut harness = EvaluationHarness::new();
        harness.record(0, &"A", &"A");
        harness.record(0, &"A", &"A");
        harness.record(0, &"A", &"B");

        assert_eq!(
            harness.summarize(),
            vec![EvalRow {
                variant: 0,
                correct: 2,
                total: 3
            }]
        );
    }

    #[test]
    fn test_variants_keep_first_recorded_order() {
        let mut harness = EvaluationHarness::new();
        harness.record("sqdiff", &Hero::Mercy, &Hero::Lucio);
        harness.record("ccorr", &Hero::Mercy, &Hero::Mercy);
        harness.record("sqdiff", &Hero::Mercy, &Hero::Mercy);

        let rows = harness.summarize();
        assert_eq!(rows[0].variant, "sqdiff");
        assert_eq!(rows[0].tally(), EvalTally { correct: 1, total: 2 });
        assert_eq!(rows[1].variant, "ccorr");
        assert_eq!(harness.tally(&"ccorr"), Some(EvalTally { correct: 1, total: 1 }));
    }

    #[test]
    fn test_success_rate_guards_empty_tally() {
        assert_eq!(EvalTally::default().success_rate(), None);
        assert_eq!(
            EvalTally { correct: 1, total: 4 }.success_rate(),
            Some(25.0)
        );
    }

    #[test]
    fn test_report_csv_round_trip() -> Result<()> {
        let mut harness = EvaluationHarness::new();
        harness.record(3, &Hero::Lucio, &Hero::Lucio);

        let mut report = EvalReport::new();
        report.extend_from("Lucio/walking1", "Template-Matching", &harness);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("eval.csv");
        report.save_csv(&path)?;

        let loaded = EvalReport::load_csv(&path)?;
        assert_eq!(loaded.rows, report.rows);
        assert_eq!(loaded.rows[0].variant, "3");
        Ok(())
    }
}
