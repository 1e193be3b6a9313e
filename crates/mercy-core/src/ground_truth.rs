//! Per-frame ground truth for a video
//!
//! A ground-truth file holds one row per frame:
//!
//! ```text
//! FRAME_NUMBER, HERO_NAME, WEAPON_ACTION
//! ```
//!
//! Frame numbers are 1-based on disk and 0-based in memory. Rows with fewer
//! than three fields are skipped with a warning, which leaves room for
//! comment lines.

use crate::csv;
use crate::labels::{Hero, Label, WeaponAction};
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{info, warn};

/// Source of expected labels, addressed by frame index
///
/// Out-of-range indices yield the label universe's sentinel.
pub trait ExpectedLabels<L: Label> {
    fn expected_label(&self, frame_index: usize) -> L;
}

/// Identified hero and weapon action for every frame of one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruth {
    heroes: Vec<Hero>,
    actions: Vec<WeaponAction>,
}

impl GroundTruth {
    /// Blank ground truth: every frame is `No Hero` / `No Action`
    pub fn new(frame_count: usize) -> Result<Self> {
        if frame_count == 0 {
            bail!("Ground truth requires at least one frame");
        }

        Ok(Self {
            heroes: vec![Hero::NONE; frame_count],
            actions: vec![WeaponAction::NONE; frame_count],
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let rows = csv::load(path)
            .with_context(|| format!("Failed to load ground truth: {:?}", path))?;

        if rows.is_empty() {
            bail!("Ground truth file has no data: {:?}", path);
        }

        let mut heroes = Vec::with_capacity(rows.len());
        let mut actions = Vec::with_capacity(rows.len());

        for (line_num, row) in rows.iter().enumerate() {
            if row.len() < 3 {
                warn!(
                    "Improperly formatted ground truth on line {} of {:?}, skipping",
                    line_num + 1,
                    path
                );
                continue;
            }

            heroes.push(Hero::from_name(&row[1]));
            actions.push(WeaponAction::from_name(&row[2]));
        }

        if heroes.is_empty() {
            bail!("Ground truth file has no well-formed rows: {:?}", path);
        }

        info!("Loaded ground truth for {} frames from {:?}", heroes.len(), path);
        Ok(Self { heroes, actions })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rows: Vec<Vec<String>> = self
            .heroes
            .iter()
            .zip(&self.actions)
            .enumerate()
            .map(|(index, (hero, action))| {
                vec![
                    (index + 1).to_string(),
                    hero.name().to_string(),
                    action.name().to_string(),
                ]
            })
            .collect();

        csv::save(&path, &rows)
            .with_context(|| format!("Failed to save ground truth: {:?}", path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    /// Hero at `index`, `No Hero` when out of range
    pub fn hero(&self, index: usize) -> Hero {
        self.heroes.get(index).copied().unwrap_or(Hero::NONE)
    }

    /// Weapon action at `index`, `No Action` when out of range
    pub fn action(&self, index: usize) -> WeaponAction {
        self.actions
            .get(index)
            .copied()
            .unwrap_or(WeaponAction::NONE)
    }

    /// Returns `false` for out-of-range indices
    pub fn set_hero(&mut self, index: usize, hero: Hero) -> bool {
        match self.heroes.get_mut(index) {
            Some(slot) => {
                *slot = hero;
                true
            }
            None => false,
        }
    }

    /// Returns `false` for out-of-range indices
    pub fn set_action(&mut self, index: usize, action: WeaponAction) -> bool {
        match self.actions.get_mut(index) {
            Some(slot) => {
                *slot = action;
                true
            }
            None => false,
        }
    }
}

impl ExpectedLabels<Hero> for GroundTruth {
    fn expected_label(&self, frame_index: usize) -> Hero {
        self.hero(frame_index)
    }
}

impl ExpectedLabels<WeaponAction> for GroundTruth {
    fn expected_label(&self, frame_index: usize) -> WeaponAction {
        self.action(frame_index)
    }
}

/// The same expected label for every frame of a bounded clip
///
/// Used when a whole clip is known to show one hero, e.g. a clip filed
/// under that hero's directory.
#[derive(Debug, Clone, Copy)]
pub struct ConstantLabel<L> {
    pub label: L,
    pub frame_count: usize,
}

impl<L: Label> ExpectedLabels<L> for ConstantLabel<L> {
    fn expected_label(&self, frame_index: usize) -> L {
        if frame_index < self.frame_count {
            self.label
        } else {
            L::NONE
        }
    }
}
