//! Image import for Retouch.
//!
//! This module provides functionality for:
//! - Decoding common raster formats (PNG, JPEG, BMP, TIFF) into an [`Image`]
//! - Applying EXIF orientation at import time
//! - Resampling images for display
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::decode::open;
//!
//! let image = open(Path::new("photo.jpg"))?;
//! println!("Decoded {}x{} {} image", image.width, image.height, image.format);
//! ```

mod file;
mod resize;
mod types;

pub use file::{decode_image, open};
pub use resize::resize;
pub use types::{DecodeError, FilterType, Image, Orientation, PixelFormat};
