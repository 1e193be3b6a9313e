//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::{ActionTemplate, TemplateLoader};
pub use matcher::{ActionTemplateMatcher, HeroTemplateMatcher, MatchScore, TemplateMatcher};

use image::GrayImage;
use imageproc::template_matching::MatchTemplateMethod;
use mercy_core::ScoreDirection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Template data structure
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: GrayImage,
}

impl Template {
    pub fn new(name: String, image: GrayImage) -> Self {
        Self { name, image }
    }
}

/// Template matching method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingMethod {
    /// Raw squared difference
    SqDiff,
    /// Normalized squared difference
    SqDiffNormed,
    /// Raw cross-correlation
    CCorr,
    /// Normalized cross-correlation (good for general use)
    CCorrNormed,
}

impl MatchingMethod {
    /// Every method, in evaluation variant order
    pub const ALL: [MatchingMethod; 4] = [
        MatchingMethod::SqDiff,
        MatchingMethod::SqDiffNormed,
        MatchingMethod::CCorr,
        MatchingMethod::CCorrNormed,
    ];

    pub fn to_imageproc(self) -> MatchTemplateMethod {
        match self {
            MatchingMethod::SqDiff => MatchTemplateMethod::SumOfSquaredErrors,
            MatchingMethod::SqDiffNormed => MatchTemplateMethod::SumOfSquaredErrorsNormalized,
            MatchingMethod::CCorr => MatchTemplateMethod::CrossCorrelation,
            MatchingMethod::CCorrNormed => MatchTemplateMethod::CrossCorrelationNormalized,
        }
    }

    /// Which end of this method's score scale is the better match
    pub fn direction(self) -> ScoreDirection {
        match self {
            MatchingMethod::SqDiff | MatchingMethod::SqDiffNormed => {
                ScoreDirection::MinimizeIsBetter
            }
            MatchingMethod::CCorr | MatchingMethod::CCorrNormed => {
                ScoreDirection::MaximizeIsBetter
            }
        }
    }

    /// Stable numeric id used in evaluation output
    pub fn variant_id(self) -> usize {
        match self {
            MatchingMethod::SqDiff => 0,
            MatchingMethod::SqDiffNormed => 1,
            MatchingMethod::CCorr => 2,
            MatchingMethod::CCorrNormed => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MatchingMethod::SqDiff => "sqdiff",
            MatchingMethod::SqDiffNormed => "sqdiff-normed",
            MatchingMethod::CCorr => "ccorr",
            MatchingMethod::CCorrNormed => "ccorr-normed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MatchingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Preprocessing applied identically to frames and templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreprocessingMethod {
    /// Plain grayscale
    None,
    /// Histogram equalization (normalize brightness)
    HistogramEqualization,
    /// Blurred Canny edge map (matches outlines, ignores fill color)
    EdgeMap,
}

/// Parameters for preprocessing methods
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingParams {
    /// Canny low threshold
    pub canny_low: f32,
    /// Canny high threshold
    pub canny_high: f32,
    /// Box blur radius before edge detection (1 means a 3x3 kernel)
    pub blur_radius: u32,
}

impl Default for PreprocessingParams {
    fn default() -> Self {
        Self {
            canny_low: 100.0,
            canny_high: 200.0,
            blur_radius: 1,
        }
    }
}

/// Template matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub matching_method: MatchingMethod,
    pub preprocessing: PreprocessingMethod,
    pub preprocessing_params: PreprocessingParams,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            matching_method: MatchingMethod::SqDiffNormed,
            preprocessing: PreprocessingMethod::None,
            preprocessing_params: PreprocessingParams::default(),
        }
    }
}

impl TemplateConfig {
    /// Same configuration with a different matching method
    pub fn with_method(&self, matching_method: MatchingMethod) -> Self {
        Self {
            matching_method,
            ..self.clone()
        }
    }

    /// Configuration for equalized grayscale matching
    pub fn equalized() -> Self {
        Self {
            preprocessing: PreprocessingMethod::HistogramEqualization,
            ..Default::default()
        }
    }

    /// Configuration for edge-based matching
    pub fn edge_matching() -> Self {
        Self {
            matching_method: MatchingMethod::CCorrNormed,
            preprocessing: PreprocessingMethod::EdgeMap,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_table() {
        assert_eq!(
            MatchingMethod::SqDiff.direction(),
            ScoreDirection::MinimizeIsBetter
        );
        assert_eq!(
            MatchingMethod::SqDiffNormed.direction(),
            ScoreDirection::MinimizeIsBetter
        );
        assert_eq!(
            MatchingMethod::CCorr.direction(),
            ScoreDirection::MaximizeIsBetter
        );
        assert_eq!(
            MatchingMethod::CCorrNormed.direction(),
            ScoreDirection::MaximizeIsBetter
        );
    }

    #[test]
    fn test_variant_ids_follow_all_order() {
        for (index, method) in MatchingMethod::ALL.into_iter().enumerate() {
            assert_eq!(method.variant_id(), index);
            assert_eq!(MatchingMethod::from_name(method.name()), Some(method));
        }
        assert_eq!(MatchingMethod::from_name("CCORR-NORMED"), Some(MatchingMethod::CCorrNormed));
        assert_eq!(MatchingMethod::from_name("ccoeff"), None);
    }

    #[test]
    fn test_with_method_keeps_preprocessing() {
        let config = TemplateConfig::edge_matching().with_method(MatchingMethod::SqDiff);
        assert_eq!(config.matching_method, MatchingMethod::SqDiff);
        assert_eq!(config.preprocessing, PreprocessingMethod::EdgeMap);
    }
}
