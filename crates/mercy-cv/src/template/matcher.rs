//! Template matching recognizers
//!
//! Each template yields exactly one candidate: the best score it reaches
//! anywhere inside the search area, on the matching method's own scale.

use super::loader::ActionTemplate;
use super::{MatchingMethod, PreprocessingMethod, TemplateConfig};
use crate::utils::{ImageUtils, Region};
use crate::Result;
use image::{GrayImage, RgbImage};
use imageproc::template_matching::match_template;
use mercy_core::{CandidateSet, Hero, Recognizer, ScoreDirection, WeaponAction};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("template {template:?} does not fit inside search area {image:?}")]
    TemplateTooLarge {
        template: (u32, u32),
        image: (u32, u32),
    },
}

/// Best score of one template and where it was reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub score: f64,
    pub location: (u32, u32),
}

/// Scores templates against preprocessed search areas
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    config: TemplateConfig,
}

impl TemplateMatcher {
    pub fn new(config: TemplateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    pub fn method(&self) -> MatchingMethod {
        self.config.matching_method
    }

    pub fn direction(&self) -> ScoreDirection {
        self.config.matching_method.direction()
    }

    /// Preprocess a grayscale image based on configuration
    pub fn preprocess(&self, image: &GrayImage) -> GrayImage {
        let params = &self.config.preprocessing_params;

        match self.config.preprocessing {
            PreprocessingMethod::None => image.clone(),
            PreprocessingMethod::HistogramEqualization => ImageUtils::equalize(image),
            PreprocessingMethod::EdgeMap => ImageUtils::edge_map(
                image,
                params.canny_low,
                params.canny_high,
                params.blur_radius,
            ),
        }
    }

    /// Best score of `template` over every position in `image`
    ///
    /// Positions are scanned row by row; the first position wins ties.
    /// NaN scores (flat, zero-energy windows under normalized methods) are
    /// ignored, and a template whose every position is NaN scores NaN.
    pub fn best_match(&self, image: &GrayImage, template: &GrayImage) -> Result<MatchScore> {
        if template.width() == 0
            || template.height() == 0
            || template.width() > image.width()
            || template.height() > image.height()
        {
            return Err(MatchError::TemplateTooLarge {
                template: template.dimensions(),
                image: image.dimensions(),
            }
            .into());
        }

        let result = match_template(image, template, self.config.matching_method.to_imageproc());
        let direction = self.direction();

        let mut best = MatchScore {
            score: f64::NAN,
            location: (0, 0),
        };
        for (x, y, pixel) in result.enumerate_pixels() {
            let score = pixel[0] as f64;
            if score.is_nan() {
                continue;
            }
            if best.score.is_nan() || direction.is_better(score, best.score) {
                best = MatchScore {
                    score,
                    location: (x, y),
                };
            }
        }

        Ok(best)
    }

    /// One candidate per template, in template order
    pub fn score_all<L>(&self, image: &GrayImage, templates: &[(L, GrayImage)]) -> Result<CandidateSet<L>>
    where
        L: Copy + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        let scores: Vec<(L, f64)> = {
            use rayon::prelude::*;
            templates
                .par_iter()
                .map(|(label, template)| {
                    self.best_match(image, template)
                        .map(|m| (*label, m.score))
                })
                .collect::<Result<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let scores: Vec<(L, f64)> = templates
            .iter()
            .map(|(label, template)| self.best_match(image, template).map(|m| (*label, m.score)))
            .collect::<Result<Vec<_>>>()?;

        Ok(scores.into_iter().collect())
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(TemplateConfig::default())
    }
}

/// Identifies the hero from weapon templates in the lower right quadrant
#[derive(Debug, Clone)]
pub struct HeroTemplateMatcher {
    matcher: TemplateMatcher,
    templates: Vec<(Hero, GrayImage)>,
}

impl HeroTemplateMatcher {
    /// Templates are grayscale and get preprocessed here, once
    pub fn new(config: TemplateConfig, templates: Vec<(Hero, GrayImage)>) -> Self {
        let matcher = TemplateMatcher::new(config);
        let templates = templates
            .into_iter()
            .map(|(hero, image)| (hero, matcher.preprocess(&image)))
            .collect();

        Self { matcher, templates }
    }

    /// Templates that are already preprocessed, such as stored edge maps
    pub fn from_prepared(config: TemplateConfig, templates: Vec<(Hero, GrayImage)>) -> Self {
        Self {
            matcher: TemplateMatcher::new(config),
            templates,
        }
    }

    /// Same templates scored with another method
    pub fn with_method(&self, method: MatchingMethod) -> Self {
        Self {
            matcher: TemplateMatcher::new(self.matcher.config().with_method(method)),
            templates: self.templates.clone(),
        }
    }

    pub fn method(&self) -> MatchingMethod {
        self.matcher.method()
    }

    pub fn heroes(&self) -> impl Iterator<Item = Hero> + '_ {
        self.templates.iter().map(|(hero, _)| *hero)
    }
}

impl Recognizer<Hero> for HeroTemplateMatcher {
    type Frame = RgbImage;

    fn direction(&self) -> ScoreDirection {
        self.matcher.direction()
    }

    fn score_frame(&self, frame: &RgbImage) -> Result<CandidateSet<Hero>> {
        let gray = ImageUtils::to_gray(frame);
        let region = Region::lower_right_quadrant(gray.width(), gray.height());
        let search_area = self.matcher.preprocess(&ImageUtils::crop(&gray, region)?);

        self.matcher.score_all(&search_area, &self.templates)
    }
}

/// Identifies one hero's weapon action from templates at fixed positions
#[derive(Debug, Clone)]
pub struct ActionTemplateMatcher {
    matcher: TemplateMatcher,
    hero: Hero,
    templates: Vec<ActionTemplate>,
}

impl ActionTemplateMatcher {
    pub fn new(config: TemplateConfig, hero: Hero, templates: Vec<ActionTemplate>) -> Self {
        let matcher = TemplateMatcher::new(config);
        let templates = templates
            .into_iter()
            .map(|entry| ActionTemplate {
                image: matcher.preprocess(&entry.image),
                ..entry
            })
            .collect();

        Self {
            matcher,
            hero,
            templates,
        }
    }

    pub fn from_prepared(config: TemplateConfig, hero: Hero, templates: Vec<ActionTemplate>) -> Self {
        Self {
            matcher: TemplateMatcher::new(config),
            hero,
            templates,
        }
    }

    pub fn with_method(&self, method: MatchingMethod) -> Self {
        Self {
            matcher: TemplateMatcher::new(self.matcher.config().with_method(method)),
            hero: self.hero,
            templates: self.templates.clone(),
        }
    }

    pub fn hero(&self) -> Hero {
        self.hero
    }

    pub fn method(&self) -> MatchingMethod {
        self.matcher.method()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Recognizer<WeaponAction> for ActionTemplateMatcher {
    type Frame = RgbImage;

    fn direction(&self) -> ScoreDirection {
        self.matcher.direction()
    }

    /// Entries whose region leaves the frame, or cannot hold the template,
    /// are skipped.
    fn score_frame(&self, frame: &RgbImage) -> Result<CandidateSet<WeaponAction>> {
        let gray = ImageUtils::to_gray(frame);
        let mut candidates = CandidateSet::with_capacity(self.templates.len());

        for entry in &self.templates {
            let (width, height) = entry.image.dimensions();
            if !entry.region.fits_within(gray.width(), gray.height())
                || !entry.region.can_hold(width, height)
            {
                warn!(
                    "Skipping {} template for {}: region {:?} unusable in {}x{} frame",
                    entry.action,
                    self.hero,
                    entry.region,
                    gray.width(),
                    gray.height()
                );
                continue;
            }

            let search_area = self.matcher.preprocess(&ImageUtils::crop(&gray, entry.region)?);
            let best = self.matcher.best_match(&search_area, &entry.image)?;
            candidates.push(entry.action, best.score);
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn mercy_patch() -> GrayImage {
        GrayImage::from_fn(12, 12, |x, y| Luma([((x * 37 + y * 91) % 256) as u8]))
    }

    fn lucio_patch() -> GrayImage {
        GrayImage::from_fn(12, 12, |x, y| Luma([((x * 11 + y * 5 + 128) % 256) as u8]))
    }

    /// 80x60 gray frame with the Mercy patch pasted at (50, 40)
    fn frame() -> RgbImage {
        let patch = mercy_patch();
        RgbImage::from_fn(80, 60, |x, y| {
            if (50..62).contains(&x) && (40..52).contains(&y) {
                let v = patch.get_pixel(x - 50, y - 40)[0];
                Rgb([v, v, v])
            } else {
                Rgb([60, 60, 60])
            }
        })
    }

    fn hero_matcher(method: MatchingMethod) -> HeroTemplateMatcher {
        HeroTemplateMatcher::new(
            TemplateConfig::default().with_method(method),
            vec![(Hero::Lucio, lucio_patch()), (Hero::Mercy, mercy_patch())],
        )
    }

    #[test]
    fn test_exact_patch_wins_for_distance_and_normalized_methods() {
        let frame = frame();
        // Raw CCorr grows with brightness, so a brighter template can outscore the exact patch
        for method in [MatchingMethod::SqDiff, MatchingMethod::SqDiffNormed, MatchingMethod::CCorrNormed] {
            let matcher = hero_matcher(method);
            assert_eq!(matcher.identify(&frame), Hero::Mercy, "method {}", method);
        }
    }

    #[test]
    fn test_one_candidate_per_template() -> Result<()> {
        let candidates = hero_matcher(MatchingMethod::SqDiff).score_frame(&frame())?;
        let labels: Vec<Hero> = candidates.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec![Hero::Lucio, Hero::Mercy]);
        assert_eq!(candidates.as_slice()[1].score, 0.0);
        Ok(())
    }

    #[test]
    fn test_best_match_location() -> Result<()> {
        let matcher = TemplateMatcher::new(TemplateConfig::default().with_method(MatchingMethod::SqDiff));
        let image = ImageUtils::to_gray(&frame());
        let best = matcher.best_match(&image, &mercy_patch())?;
        assert_eq!(best.location, (50, 40));
        assert_eq!(best.score, 0.0);
        Ok(())
    }

    #[test]
    fn test_oversized_template_is_an_error() {
        let matcher = TemplateMatcher::default();
        let small = GrayImage::new(4, 4);
        assert!(matcher.best_match(&small, &mercy_patch()).is_err());
    }

    #[test]
    fn test_tiny_frame_yields_sentinel() {
        let tiny = RgbImage::new(6, 6);
        assert_eq!(hero_matcher(MatchingMethod::SqDiff).identify(&tiny), Hero::NoHero);
    }

    #[test]
    fn test_edge_preprocessing_runs_on_frames_and_templates() -> Result<()> {
        let matcher = HeroTemplateMatcher::new(
            TemplateConfig::edge_matching(),
            vec![(Hero::Mercy, mercy_patch())],
        );
        let candidates = matcher.score_frame(&frame())?;
        assert_eq!(candidates.len(), 1);
        Ok(())
    }

    #[test]
    fn test_action_matcher_skips_unusable_regions() -> Result<()> {
        let templates = vec![
            ActionTemplate {
                action: WeaponAction::Healing,
                image: lucio_patch(),
                region: Region::new(0, 0, 30, 30),
            },
            ActionTemplate {
                action: WeaponAction::Firing,
                image: mercy_patch(),
                region: Region::new(44, 34, 30, 24),
            },
            ActionTemplate {
                action: WeaponAction::Melee,
                image: mercy_patch(),
                region: Region::new(70, 50, 30, 30),
            },
        ];
        let matcher = ActionTemplateMatcher::new(
            TemplateConfig::default().with_method(MatchingMethod::SqDiff),
            Hero::Mercy,
            templates,
        );

        let candidates = matcher.score_frame(&frame())?;
        assert_eq!(candidates.len(), 2);
        assert_eq!(matcher.identify(&frame()), WeaponAction::Firing);
        Ok(())
    }

    #[test]
    fn test_with_method_switches_direction() {
        let matcher = hero_matcher(MatchingMethod::SqDiff);
        assert_eq!(matcher.direction(), ScoreDirection::MinimizeIsBetter);
        let switched = matcher.with_method(MatchingMethod::CCorr);
        assert_eq!(switched.direction(), ScoreDirection::MaximizeIsBetter);
        assert_eq!(switched.heroes().collect::<Vec<_>>(), vec![Hero::Lucio, Hero::Mercy]);
    }
}
