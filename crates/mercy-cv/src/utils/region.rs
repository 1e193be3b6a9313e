//! Rectangular search regions within a frame

use serde::{Deserialize, Serialize};

/// Axis-aligned crop rectangle in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Lower right quadrant, where the hero's weapon is drawn
    pub fn lower_right_quadrant(width: u32, height: u32) -> Self {
        Self::new(width / 2, height / 2, width / 2, height / 2)
    }

    /// Whether the region lies completely inside a `width` x `height` frame
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }

    /// Whether a `width` x `height` template can slide inside the region
    pub fn can_hold(&self, width: u32, height: u32) -> bool {
        width > 0 && height > 0 && width <= self.width && height <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_right_quadrant() {
        assert_eq!(
            Region::lower_right_quadrant(1920, 1080),
            Region::new(960, 540, 960, 540)
        );
    }

    #[test]
    fn test_fits_within() {
        assert!(Region::new(10, 10, 20, 20).fits_within(30, 30));
        assert!(!Region::new(10, 10, 21, 20).fits_within(30, 30));
        assert!(!Region::new(0, 0, 0, 5).fits_within(30, 30));
        assert!(!Region::new(u32::MAX, 0, 2, 2).fits_within(30, 30));
    }

    #[test]
    fn test_can_hold() {
        let region = Region::new(0, 0, 8, 4);
        assert!(region.can_hold(8, 4));
        assert!(!region.can_hold(9, 4));
    }
}
