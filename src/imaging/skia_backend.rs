//! Raster compositing backend built on tiny-skia.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Output surface | `tiny_skia::Pixmap` sized to the crop |
//! | Circular clip | `tiny_skia::Mask` filled with a circle path |
//! | Draw cropped source | `Pixmap::draw_pixmap` through the clip |
//! | Frame stroke | `Pixmap::stroke_path` (circle or inset rect) |
//! | Tone filters | per-pixel [`apply_tone`](super::calculations::apply_tone) |
//! | Arbitrary rotation | `draw_pixmap` with a rotate transform, bicubic |
//! | Quarter turns / flips | `image::imageops` (lossless) |
//! | Encode → JPEG / PNG | `image::codecs::{jpeg, png}` |
//!
//! tiny-skia stores premultiplied RGBA while `image` buffers are straight
//! alpha, so pixels are converted on the way in and out.

use super::backend::{BackendError, Compositor, EncodedImage};
use super::calculations::{
    apply_tone, calculate_border_thickness, calculate_clip_radius, calculate_frame_circle_radius,
    calculate_frame_rect, calculate_rotated_size,
};
use super::params::{CompositeParams, FrameColor, OutputFormat, Quality, ToneFilters};
use crate::source::{ImageSource, Orientation};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage, imageops};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};
use tracing::debug;

/// Production compositor: tiny-skia surface + `image` encoders.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkiaBackend;

impl SkiaBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Compositor for SkiaBackend {
    fn composite(
        &self,
        source: &ImageSource,
        params: &CompositeParams,
    ) -> Result<EncodedImage, BackendError> {
        let crop = params.crop;
        let effects = &params.effects;
        let (src_w, src_h) = source.dimensions();
        if !crop.fits_within(src_w, src_h) {
            return Err(BackendError::InvalidCrop(format!(
                "{crop} outside {src_w}x{src_h} source"
            )));
        }

        let (width, height) = (crop.width, crop.height);
        let mut surface = Pixmap::new(width, height).ok_or_else(|| {
            BackendError::Encoding(format!("raster surface unavailable ({width}x{height})"))
        })?;

        let clip = if effects.is_circular {
            Some(circle_mask(width, height)?)
        } else {
            None
        };

        let region = imageops::crop_imm(source.pixels(), crop.x, crop.y, width, height).to_image();
        let layer = to_pixmap(&region, &effects.tone)?;
        surface.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            clip.as_ref(),
        );

        if let Some(color) = effects.frame_color {
            let border = calculate_border_thickness(width, height, effects.frame_thickness_percent);
            stroke_frame(&mut surface, color, border, effects.is_circular, clip.as_ref());
        }

        let pixels = from_pixmap(&surface);
        let format = effects.output_format();
        let bytes = encode(&pixels, format, params.quality)?;
        Ok(EncodedImage {
            bytes,
            format,
            width,
            height,
        })
    }
}

/// Coverage mask for the circular clip, centred in the surface.
fn circle_mask(width: u32, height: u32) -> Result<Mask, BackendError> {
    let mut mask = Mask::new(width, height)
        .ok_or_else(|| BackendError::Encoding("clip mask unavailable".into()))?;
    let circle = PathBuilder::from_circle(
        width as f32 / 2.0,
        height as f32 / 2.0,
        calculate_clip_radius(width, height),
    )
    .ok_or_else(|| BackendError::Encoding("degenerate clip circle".into()))?;
    mask.fill_path(&circle, FillRule::Winding, true, Transform::identity());
    Ok(mask)
}

/// Stroke the frame; the clip (if any) stays active, as on a 2D canvas.
fn stroke_frame(
    surface: &mut Pixmap,
    color: FrameColor,
    border: f32,
    circular: bool,
    clip: Option<&Mask>,
) {
    let (width, height) = (surface.width(), surface.height());
    let path = if circular {
        let radius = calculate_frame_circle_radius(width, height, border);
        PathBuilder::from_circle(width as f32 / 2.0, height as f32 / 2.0, radius)
    } else {
        let (x, y, w, h) = calculate_frame_rect(width, height, border);
        Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect)
    };
    let Some(path) = path else {
        debug!(width, height, border, "frame wider than output, skipping stroke");
        return;
    };

    let [r, g, b, a] = color.rgba();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: border,
        ..Stroke::default()
    };
    surface.stroke_path(&path, &paint, &stroke, Transform::identity(), clip);
}

/// Copy straight-alpha pixels into a premultiplied pixmap, applying tone.
fn to_pixmap(image: &RgbaImage, tone: &ToneFilters) -> Result<Pixmap, BackendError> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
        BackendError::Encoding(format!(
            "raster surface unavailable ({}x{})",
            image.width(),
            image.height()
        ))
    })?;
    let neutral = tone.is_neutral();
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        let [r, g, b] = if neutral {
            [r, g, b]
        } else {
            apply_tone([r, g, b], tone)
        };
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Convert a premultiplied pixmap back into a straight-alpha image.
fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    image
}

/// Encode pixels; JPEG drops alpha (transparent areas become black).
fn encode(pixels: &RgbaImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let (width, height) = pixels.dimensions();
    let mut bytes = Vec::new();
    let result = match format {
        OutputFormat::Png => PngEncoder::new(&mut bytes).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|e| {
        BackendError::Encoding(format!("{} encode failed: {e}", format.mime_type()))
    })?;
    if bytes.is_empty() {
        return Err(BackendError::Encoding(format!(
            "{} encoder produced no output",
            format.mime_type()
        )));
    }
    Ok(bytes)
}

/// Mirror, then rotate about the centre into the rotated bounding box.
///
/// Quarter turns and flips are lossless; other angles are resampled.
/// Returns `None` only if a raster surface cannot be allocated.
pub(crate) fn orient_pixels(image: &RgbaImage, orientation: &Orientation) -> Option<RgbaImage> {
    let mut mirrored = image.clone();
    if orientation.flip_horizontal {
        imageops::flip_horizontal_in_place(&mut mirrored);
    }
    if orientation.flip_vertical {
        imageops::flip_vertical_in_place(&mut mirrored);
    }

    let degrees = orientation.rotation_degrees.rem_euclid(360.0);
    match degrees {
        d if d == 0.0 => Some(mirrored),
        d if d == 90.0 => Some(imageops::rotate90(&mirrored)),
        d if d == 180.0 => Some(imageops::rotate180(&mirrored)),
        d if d == 270.0 => Some(imageops::rotate270(&mirrored)),
        d => rotate_free(&mirrored, d),
    }
}

fn rotate_free(image: &RgbaImage, degrees: f32) -> Option<RgbaImage> {
    let (w, h) = image.dimensions();
    let (bw, bh) = calculate_rotated_size(w, h, degrees);
    let layer = to_pixmap(image, &ToneFilters::NEUTRAL).ok()?;
    let mut target = Pixmap::new(bw, bh)?;

    let transform = Transform::from_translate(bw as f32 / 2.0, bh as f32 / 2.0)
        .pre_rotate(degrees)
        .pre_translate(-(w as f32) / 2.0, -(h as f32) / 2.0);
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(0, 0, layer.as_ref(), &paint, transform, None);
    Some(from_pixmap(&target))
}
