//! Image loading and preprocessing helpers over `image` buffers

use super::region::Region;
use crate::Result;
use anyhow::{Context, ensure};
use image::{GrayImage, RgbImage, imageops};
use imageproc::{contrast, edges, filter};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load image as an RGB frame
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        Ok(image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgb8())
    }

    /// Load image as 8-bit grayscale
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
        Ok(image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_luma8())
    }

    /// Save grayscale image, format chosen by extension
    pub fn save_image<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
        image
            .save(&path)
            .with_context(|| format!("Failed to save image: {:?}", path.as_ref()))
    }

    pub fn to_gray(frame: &RgbImage) -> GrayImage {
        imageops::grayscale(frame)
    }

    /// Copy out `region`, which must lie inside the image
    pub fn crop(image: &GrayImage, region: Region) -> Result<GrayImage> {
        ensure!(
            region.fits_within(image.width(), image.height()),
            "Region {:?} exceeds {}x{} image",
            region,
            image.width(),
            image.height()
        );

        Ok(imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image())
    }

    /// Histogram equalization (normalizes brightness)
    pub fn equalize(image: &GrayImage) -> GrayImage {
        contrast::equalize_histogram(image)
    }

    /// Binary edge map: 3x3 box blur followed by Canny
    pub fn edge_map(image: &GrayImage, low: f32, high: f32, blur_radius: u32) -> GrayImage {
        let blurred = if blur_radius == 0 {
            image.clone()
        } else {
            filter::box_filter(image, blur_radius, blur_radius)
        };

        edges::canny(&blurred, low, high)
    }
}
