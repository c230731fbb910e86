//! Compositor trait and shared types.
//!
//! The [`Compositor`] trait is the single seam between export orchestration
//! and pixel work: given a source and a [`CompositeParams`], produce encoded
//! bytes or fail.
//!
//! The production implementation is
//! [`SkiaBackend`](super::skia_backend::SkiaBackend). Tests use the recording
//! `MockCompositor` in this module's test submodule.

use super::params::{CompositeParams, OutputFormat};
use crate::source::ImageSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Encoded result of one composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Trait for compositing backends.
pub trait Compositor {
    /// Render `params.crop` of `source` with `params.effects` and encode it.
    fn composite(
        &self,
        source: &ImageSource,
        params: &CompositeParams,
    ) -> Result<EncodedImage, BackendError>;
}

impl<C: Compositor + ?Sized> Compositor for &C {
    fn composite(
        &self,
        source: &ImageSource,
        params: &CompositeParams,
    ) -> Result<EncodedImage, BackendError> {
        (**self).composite(source, params)
    }
}
