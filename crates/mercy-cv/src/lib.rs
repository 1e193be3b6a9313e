//! Mercy computer vision library
//!
//! Template-matching and cascade-classifier recognizers for gameplay frames,
//! built on `image` and `imageproc`. Every recognizer implements
//! [`mercy_core::Recognizer`], so selection and smoothing stay backend-agnostic.

pub mod classifier;
pub mod detection;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use classifier::{CascadeModel, ClassifierEnsemble};
pub use detection::{DetectionConfig, FrameDetection, FrameDetector, SmoothingConfig};
pub use template::{
    ActionTemplate, ActionTemplateMatcher, HeroTemplateMatcher, MatchingMethod, PreprocessingMethod,
    TemplateConfig, TemplateLoader, TemplateMatcher,
};
pub use utils::{ImageUtils, Region};

// Error handling
pub type Result<T> = anyhow::Result<T>;
