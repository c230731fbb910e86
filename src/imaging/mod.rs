//! Image compositing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (see [`crate::source`]) |
//! | **Clip / draw / stroke** | `tiny-skia` raster surface |
//! | **Encode** | `image` JPEG and PNG encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and frame geometry (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`Compositor`] trait + [`SkiaBackend`]
//! - **Operations**: High-level functions combining parameters + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod skia_backend;

pub use backend::{BackendError, Compositor, EncodedImage};
pub use calculations::{
    MIN_BORDER_THICKNESS, calculate_border_thickness, calculate_fit_dimensions,
    calculate_pan_limits, calculate_pan_of, calculate_view_crop,
};
pub use operations::{plan_composite, render, render_preview};
pub use params::{
    CompositeParams, CropRect, EffectOptions, FrameColor, OutputFormat, PALETTE, ParseError,
    Quality, ToneFilters,
};
pub use skia_backend::SkiaBackend;
