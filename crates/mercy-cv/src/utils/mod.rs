//! Utility modules

pub mod image;
pub mod region;

pub use self::image::ImageUtils;
pub use self::region::Region;
