//! Loading the single source image.
//!
//! An [`ImageSource`] is decoded once and never mutated afterwards. Pixels are
//! held as straight-alpha RGBA behind an `Arc`, so the session, the crop
//! controllers and every compositor call share one buffer.
//!
//! Only one image is accepted per session. When several paths are given, the
//! first wins and the rest are ignored with a warning, the same way a file
//! picker or drop target takes the first file of a multi-selection.

use crate::imaging::skia_backend::orient_pixels;
use image::{DynamicImage, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {name}: {message}")]
    Decode { name: String, message: String },
    #[error("No image given")]
    NoInput,
    #[error("Image has no pixels: {0}")]
    Empty(String),
    #[error("Failed to orient {0}")]
    Orientation(String),
}

/// Extensions whose decoders are compiled in.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pick the one image to work on from whatever the user handed over.
pub fn select_upload(paths: &[PathBuf]) -> Result<&Path, SourceError> {
    let (first, rest) = paths.split_first().ok_or(SourceError::NoInput)?;
    if !rest.is_empty() {
        warn!(
            ignored = rest.len(),
            "only one image is processed at a time; using {}",
            first.display()
        );
    }
    Ok(first)
}

/// Rotation and mirroring applied once at load time.
///
/// The image is rotated about its centre into its rotated bounding box, then
/// mirrored. Crop rectangles refer to the oriented image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub rotation_degrees: f32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Orientation {
    pub fn is_identity(&self) -> bool {
        self.rotation_degrees.rem_euclid(360.0) == 0.0
            && !self.flip_horizontal
            && !self.flip_vertical
    }
}

/// Decoded source image plus the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pixels: Arc<RgbaImage>,
    file_name: String,
}

impl ImageSource {
    /// Read and decode an image file.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(&bytes, &file_name)
    }

    /// Decode in-memory bytes, sniffing the format from content.
    pub fn from_bytes(bytes: &[u8], file_name: &str) -> Result<Self, SourceError> {
        let decode_err = |message: String| SourceError::Decode {
            name: file_name.to_string(),
            message,
        };
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;
        let source = Self::from_image(image, file_name)?;
        debug!(
            file = file_name,
            width = source.width(),
            height = source.height(),
            "decoded source image"
        );
        Ok(source)
    }

    /// Wrap an already-decoded image.
    pub fn from_image(image: DynamicImage, file_name: &str) -> Result<Self, SourceError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SourceError::Empty(file_name.to_string()));
        }
        Ok(Self {
            pixels: Arc::new(image.into_rgba8()),
            file_name: file_name.to_string(),
        })
    }

    /// Return a rotated and/or mirrored copy; identity orientations share pixels.
    pub fn oriented(&self, orientation: &Orientation) -> Result<Self, SourceError> {
        if orientation.is_identity() {
            return Ok(self.clone());
        }
        let pixels = orient_pixels(&self.pixels, orientation)
            .ok_or_else(|| SourceError::Orientation(self.file_name.clone()))?;
        Ok(Self {
            pixels: Arc::new(pixels),
            file_name: self.file_name.clone(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{encode_png, gradient_source};
    use tempfile::TempDir;

    #[test]
    fn select_upload_takes_first_path() {
        let paths = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
        assert_eq!(select_upload(&paths).unwrap(), Path::new("a.jpg"));
    }

    #[test]
    fn select_upload_requires_a_path() {
        assert!(matches!(select_upload(&[]), Err(SourceError::NoInput)));
    }

    #[test]
    fn from_bytes_decodes_png() {
        let bytes = encode_png(&gradient_source(40, 30));
        let source = ImageSource::from_bytes(&bytes, "photo.png").unwrap();
        assert_eq!(source.dimensions(), (40, 30));
        assert_eq!(source.file_name(), "photo.png");
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = ImageSource::from_bytes(b"not an image", "broken.jpg").unwrap_err();
        assert!(matches!(err, SourceError::Decode { ref name, .. } if name == "broken.jpg"));
    }

    #[test]
    fn open_keeps_file_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.HEIC.png");
        std::fs::write(&path, encode_png(&gradient_source(8, 8))).unwrap();

        let source = ImageSource::open(&path).unwrap();
        assert_eq!(source.file_name(), "photo.HEIC.png");
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let err = ImageSource::open(Path::new("/definitely/not/here.jpg")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn identity_orientation_shares_pixels() {
        let source = gradient_source(10, 6);
        let same = source.oriented(&Orientation::default()).unwrap();
        assert!(Arc::ptr_eq(&source.pixels, &same.pixels));
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let source = gradient_source(10, 6);
        let turned = source
            .oriented(&Orientation {
                rotation_degrees: 90.0,
                ..Orientation::default()
            })
            .unwrap();
        assert_eq!(turned.dimensions(), (6, 10));
    }

    #[test]
    fn horizontal_flip_mirrors_pixels() {
        let source = gradient_source(10, 6);
        let flipped = source
            .oriented(&Orientation {
                flip_horizontal: true,
                ..Orientation::default()
            })
            .unwrap();
        assert_eq!(flipped.dimensions(), (10, 6));
        assert_eq!(
            flipped.pixels().get_pixel(0, 3),
            source.pixels().get_pixel(9, 3)
        );
    }
}
