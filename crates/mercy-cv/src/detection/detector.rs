//! Frame-level hero and weapon-action detector

use super::config::DetectionConfig;
use crate::template::{ActionTemplateMatcher, HeroTemplateMatcher, MatchingMethod, TemplateLoader};
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::{bail, Context};
use image::RgbImage;
use mercy_core::{Hero, Recognizer, WeaponAction};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// What one matching method saw in one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameDetection {
    pub method: MatchingMethod,
    pub hero: Hero,
    /// `None` when the detected hero has no action templates
    pub action: Option<WeaponAction>,
    pub processing_time_ms: u64,
}

/// Template-matching detector for heroes and their weapon actions
pub struct FrameDetector {
    config: DetectionConfig,
    hero_matcher: HeroTemplateMatcher,
    action_matchers: HashMap<Hero, ActionTemplateMatcher>,
}

impl FrameDetector {
    /// Load every template named by the configuration
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;

        let mut loader = TemplateLoader::new();
        for dir in &config.template_dirs {
            loader = loader.add_template_dir(dir);
        }

        let stored_edges = config.uses_stored_edges();
        let templates = loader.load_hero_templates(&config.heroes, stored_edges)?;
        if templates.is_empty() {
            bail!("No hero templates found in {:?}", config.template_dirs);
        }

        let template_config = config.template_config.clone();
        let hero_matcher = if stored_edges {
            HeroTemplateMatcher::from_prepared(template_config.clone(), templates)
        } else {
            HeroTemplateMatcher::new(template_config.clone(), templates)
        };

        let mut action_matchers = HashMap::new();
        match &config.action_index {
            Some(index_path) if index_path.exists() => {
                for (hero, entries) in loader.load_action_index(index_path, stored_edges)? {
                    let matcher = if stored_edges {
                        ActionTemplateMatcher::from_prepared(template_config.clone(), hero, entries)
                    } else {
                        ActionTemplateMatcher::new(template_config.clone(), hero, entries)
                    };
                    action_matchers.insert(hero, matcher);
                }
            }
            Some(index_path) => warn!("Weapon action index {:?} not found", index_path),
            None => {}
        }

        info!(
            "Detector ready: {} hero templates, action templates for {} heroes",
            hero_matcher.heroes().count(),
            action_matchers.len()
        );

        Ok(Self::from_parts(config, hero_matcher, action_matchers))
    }

    /// Assemble a detector from already built matchers
    pub fn from_parts(
        config: DetectionConfig,
        hero_matcher: HeroTemplateMatcher,
        action_matchers: HashMap<Hero, ActionTemplateMatcher>,
    ) -> Self {
        Self {
            config,
            hero_matcher,
            action_matchers,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Heroes with a loaded template, in candidate order
    pub fn heroes(&self) -> Vec<Hero> {
        self.hero_matcher.heroes().collect()
    }

    pub fn hero_recognizer(&self, method: MatchingMethod) -> HeroTemplateMatcher {
        self.hero_matcher.with_method(method)
    }

    pub fn action_recognizer(&self, hero: Hero, method: MatchingMethod) -> Option<ActionTemplateMatcher> {
        self.action_matchers
            .get(&hero)
            .map(|matcher| matcher.with_method(method))
    }

    /// Detect with the configured matching method
    pub fn detect(&self, frame: &RgbImage) -> FrameDetection {
        self.detect_with(frame, self.config.template_config.matching_method)
    }

    pub fn detect_with(&self, frame: &RgbImage, method: MatchingMethod) -> FrameDetection {
        let start = Instant::now();

        let hero = self.hero_recognizer(method).identify(frame);
        let action = self
            .action_recognizer(hero, method)
            .map(|recognizer| recognizer.identify(frame));

        FrameDetection {
            method,
            hero,
            action,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Detect from an image file with every matching method
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<FrameDetection>> {
        let frame = ImageUtils::load_color(&path)
            .with_context(|| format!("Failed to load frame: {:?}", path.as_ref()))?;

        Ok(MatchingMethod::ALL
            .into_iter()
            .map(|method| self.detect_with(&frame, method))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};
    use std::fs;

    fn patch(seed: u32) -> GrayImage {
        GrayImage::from_fn(10, 10, |x, y| Luma([((x * 29 + y * 53 + seed) % 256) as u8]))
    }

    /// 64x48 frame with the seed-3 patch in the lower right quadrant
    fn frame() -> RgbImage {
        let weapon = patch(3);
        RgbImage::from_fn(64, 48, |x, y| {
            if (40..50).contains(&x) && (30..40).contains(&y) {
                let v = weapon.get_pixel(x - 40, y - 30)[0];
                Rgb([v, v, v])
            } else {
                Rgb([90, 90, 90])
            }
        })
    }

    #[test]
    fn test_detector_from_template_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        patch(3).save(dir.path().join("Mercy.png"))?;
        patch(170).save(dir.path().join("Lucio.png"))?;

        let actions = dir.path().join("Weapon_Actions");
        fs::create_dir_all(&actions)?;
        patch(3).save(actions.join("mercy_pistol.png"))?;
        patch(99).save(actions.join("mercy_staff.png"))?;
        let index = dir.path().join("actions.csv");
        fs::write(
            &index,
            "Mercy\nmercy_staff, Holding Staff, 32, 24, 32, 24\nmercy_pistol, Holding Pistol, 32, 24, 32, 24\n",
        )?;

        let config = DetectionConfig {
            template_dirs: vec![dir.path().to_path_buf()],
            action_index: Some(index),
            ..DetectionConfig::default()
        };
        let detector = FrameDetector::new(config)?;
        assert_eq!(detector.heroes(), vec![Hero::Mercy, Hero::Lucio]);

        let detection = detector.detect_with(&frame(), MatchingMethod::SqDiff);
        assert_eq!(detection.hero, Hero::Mercy);
        assert_eq!(detection.action, Some(WeaponAction::HoldingPistol));

        assert!(detector.action_recognizer(Hero::Lucio, MatchingMethod::SqDiff).is_none());
        Ok(())
    }

    #[test]
    fn test_missing_templates_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = DetectionConfig {
            template_dirs: vec![dir.path().to_path_buf()],
            ..DetectionConfig::default()
        };
        assert!(FrameDetector::new(config).is_err());
        Ok(())
    }

    #[test]
    fn test_detect_file_runs_every_method() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("frame.png");
        frame().save(&path)?;

        let detector = FrameDetector::from_parts(
            DetectionConfig::default(),
            HeroTemplateMatcher::new(Default::default(), vec![(Hero::Mercy, patch(3))]),
            HashMap::new(),
        );

        let detections = detector.detect_file(&path)?;
        let methods: Vec<MatchingMethod> = detections.iter().map(|d| d.method).collect();
        assert_eq!(methods, MatchingMethod::ALL.to_vec());
        assert!(detections.iter().all(|d| d.hero == Hero::Mercy && d.action.is_none()));
        Ok(())
    }
}
