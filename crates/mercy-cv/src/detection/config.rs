//! Detection configuration

use crate::template::{PreprocessingMethod, TemplateConfig};
use crate::Result;
use anyhow::{ensure, Context};
use mercy_core::aggregator::HISTORY_CAPACITY;
use mercy_core::{Hero, Label};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub template_config: TemplateConfig,
    pub template_dirs: Vec<PathBuf>,
    /// Heroes with a weapon template, in candidate order
    pub heroes: Vec<Hero>,
    /// Weapon-action template index; no index means no action detection
    pub action_index: Option<PathBuf>,
    /// Use stored `_Edge` templates instead of deriving edge maps
    pub stored_edge_templates: bool,
    pub smoothing: SmoothingConfig,
    pub output_dir: PathBuf,
}

/// Temporal smoothing of per-frame winners
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    /// Votes remembered per label
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: HISTORY_CAPACITY,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            template_config: TemplateConfig::default(),
            template_dirs: vec!["data/templates".into()],
            heroes: vec![Hero::Mercy, Hero::Lucio],
            action_index: None,
            stored_edge_templates: false,
            smoothing: SmoothingConfig::default(),
            output_dir: "data/results".into(),
        }
    }
}

impl DetectionConfig {
    /// Edge-map matching with normalized cross-correlation
    pub fn edge_matching() -> Self {
        Self {
            template_config: TemplateConfig::edge_matching(),
            ..Default::default()
        }
    }

    /// Histogram-equalized grayscale matching
    pub fn equalized() -> Self {
        Self {
            template_config: TemplateConfig::equalized(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.heroes.is_empty(), "At least one hero must be configured");
        ensure!(
            self.heroes.iter().all(|hero| !hero.is_none()),
            "{} is not a detectable hero",
            Hero::NONE
        );
        ensure!(self.smoothing.window > 0, "Smoothing window must be positive");
        Ok(())
    }

    /// Whether templates come from stored edge maps
    pub fn uses_stored_edges(&self) -> bool {
        self.stored_edge_templates
            && self.template_config.preprocessing == PreprocessingMethod::EdgeMap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MatchingMethod;

    #[test]
    fn test_partial_json_takes_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "heroes": ["Mercy", "D.Va"], "smoothing": { "window": 4 } }"#,
        )?;

        let config = DetectionConfig::from_json_file(&path)?;
        assert_eq!(config.heroes, vec![Hero::Mercy, Hero::DVa]);
        assert_eq!(config.smoothing.window, 4);
        assert!(config.smoothing.enabled);
        assert_eq!(config.template_config.matching_method, MatchingMethod::SqDiffNormed);
        Ok(())
    }

    #[test]
    fn test_rejects_sentinel_hero() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "heroes": ["No Hero"] }"#)?;
        assert!(DetectionConfig::from_json_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_presets_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("edge.json");
        let mut config = DetectionConfig::edge_matching();
        config.stored_edge_templates = true;
        config.save_json(&path)?;

        let loaded = DetectionConfig::from_json_file(&path)?;
        assert_eq!(loaded.template_config.preprocessing, PreprocessingMethod::EdgeMap);
        assert!(loaded.uses_stored_edges());
        assert!(!DetectionConfig::equalized().uses_stored_edges());
        Ok(())
    }
}
