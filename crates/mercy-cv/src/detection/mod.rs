//! High-level detection module

pub mod config;
pub mod detector;

pub use config::{DetectionConfig, SmoothingConfig};
pub use detector::{FrameDetection, FrameDetector};
