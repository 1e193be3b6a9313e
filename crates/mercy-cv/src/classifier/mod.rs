//! Cascade classifier ensembles
//!
//! Cascade detection itself lives behind [`CascadeModel`]; the ensemble only
//! prepares frames, asks every model for its occurrence count and turns the
//! counts into candidates.

use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use image::{GrayImage, RgbImage};
use mercy_core::{select_candidate, CandidateSet, Label, Recognizer, ScoreDirection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A trained detector that counts object occurrences in a prepared frame
pub trait CascadeModel {
    fn detect(&self, image: &GrayImage) -> Result<usize>;
}

impl<F> CascadeModel for F
where
    F: Fn(&GrayImage) -> Result<usize>,
{
    fn detect(&self, image: &GrayImage) -> Result<usize> {
        self(image)
    }
}

/// Ordered (label, model) pairs
pub struct ClassifierEnsemble<L, M> {
    models: Vec<(L, M)>,
}

impl<L: Label, M: CascadeModel> ClassifierEnsemble<L, M> {
    pub fn new(models: Vec<(L, M)>) -> Self {
        Self { models }
    }

    /// One model per file in `dir`, labelled by file stem, in file-name order
    ///
    /// Files whose stem is not a known label are skipped with a warning;
    /// a model that fails to load is an error.
    pub fn from_directory<P, F>(dir: P, mut load: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnMut(&Path) -> Result<M>,
    {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read classifier directory: {:?}", dir))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.sort();

        let mut models = Vec::new();
        for path in paths.iter().filter(|p| p.is_file()) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            match L::parse_name(&stem) {
                Ok(label) => {
                    let model = load(path)
                        .with_context(|| format!("Failed to load classifier: {:?}", path))?;
                    models.push((label, model));
                }
                Err(e) => warn!("Skipping classifier {:?}: {}", path, e),
            }
        }

        debug!("Loaded {} classifiers from {:?}", models.len(), dir);
        Ok(Self::new(models))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = L> + '_ {
        self.models.iter().map(|(label, _)| *label)
    }

    /// Grayscale plus histogram equalization
    pub fn prepare(frame: &RgbImage) -> GrayImage {
        ImageUtils::equalize(&ImageUtils::to_gray(frame))
    }

    /// Whether some model bound to `known` fires on the frame
    ///
    /// Models that fail are treated as not firing.
    pub fn evaluate(&self, frame: &RgbImage, known: L) -> bool {
        let prepared = Self::prepare(frame);

        self.models
            .iter()
            .filter(|(label, _)| *label == known)
            .any(|(label, model)| match model.detect(&prepared) {
                Ok(count) => count > 0,
                Err(e) => {
                    warn!("Classifier for {} failed: {:#}", label, e);
                    false
                }
            })
    }
}

impl<L: Label, M: CascadeModel> Recognizer<L> for ClassifierEnsemble<L, M> {
    type Frame = RgbImage;

    fn direction(&self) -> ScoreDirection {
        ScoreDirection::MaximizeIsBetter
    }

    fn score_frame(&self, frame: &RgbImage) -> Result<CandidateSet<L>> {
        let prepared = Self::prepare(frame);
        let mut candidates = CandidateSet::with_capacity(self.models.len());

        for (label, model) in &self.models {
            let count = model.detect(&prepared)?;
            candidates.push(*label, count as f64);
        }

        Ok(candidates)
    }

    /// The label with the most occurrences; no firing model means the sentinel
    fn identify(&self, frame: &RgbImage) -> L {
        let candidates = match self.score_frame(frame) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Classifier ensemble failed: {:#}", e);
                return L::NONE;
            }
        };

        select_candidate(&candidates, self.direction())
            .filter(|best| best.score > 0.0)
            .map(|best| best.label)
            .unwrap_or(L::NONE)
    }
}
