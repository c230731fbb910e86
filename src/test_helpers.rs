//! Shared test utilities: synthetic sources and encode/decode shortcuts.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = gradient_source(320, 180);
//! let bytes = encode_png(&source);
//! let pixels = decode(&bytes);
//! assert_eq!(pixels.dimensions(), (320, 180));
//! ```

use crate::source::ImageSource;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Sources
// =========================================================================

/// Opaque source whose red channel ramps left to right and green top to
/// bottom, so mirrored or rotated copies are told apart.
pub fn gradient_source(width: u32, height: u32) -> ImageSource {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.saturating_sub(1).max(1)) as u8;
        let g = (y * 255 / height.saturating_sub(1).max(1)) as u8;
        Rgba([r, g, 128, 255])
    });
    ImageSource::from_image(DynamicImage::ImageRgba8(pixels), "gradient.png").unwrap()
}

/// Source filled with one colour.
pub fn solid_source(width: u32, height: u32, rgba: [u8; 4]) -> ImageSource {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(rgba));
    ImageSource::from_image(DynamicImage::ImageRgba8(pixels), "solid.png").unwrap()
}

// =========================================================================
// Encoding
// =========================================================================

/// PNG bytes of a source's pixels.
pub fn encode_png(source: &ImageSource) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    source
        .pixels()
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Decode encoded output back to RGBA pixels.
pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().into_rgba8()
}
