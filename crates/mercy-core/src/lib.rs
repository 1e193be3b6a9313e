//! Mercy detector core
//!
//! Candidate selection and temporal smoothing for labelling gameplay frames.
//! Recognizers score a frame; this crate picks a winner, smooths winners over
//! time and tallies accuracy against ground truth.

pub mod aggregator;
pub mod candidate;
pub mod csv;
pub mod evaluation;
pub mod ground_truth;
pub mod labels;
pub mod recognizer;
pub mod selector;
pub mod smoothing;

pub use aggregator::{AggregatorError, TemporalAggregator};
pub use candidate::{Candidate, CandidateSet, ScoreDirection};
pub use evaluation::{EvalReport, EvalRow, EvalTally, EvaluationHarness};
pub use ground_truth::{ConstantLabel, ExpectedLabels, GroundTruth};
pub use labels::{Hero, Label, LabelError, WeaponAction};
pub use recognizer::Recognizer;
pub use selector::{select, select_candidate};
pub use smoothing::LabelSmoother;
