//! Pure calculation functions for crop and frame geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{CropRect, ToneFilters};

/// Smallest frame stroke, in pixels, regardless of the thickness percentage.
pub const MIN_BORDER_THICKNESS: f32 = 5.0;

/// Calculate the frame stroke width for an output of the given size.
///
/// # Examples
/// ```
/// # use multicrop::imaging::calculate_border_thickness;
/// // 1% of a 1000px short edge is 10px
/// assert_eq!(calculate_border_thickness(1000, 1200, 1.0), 10.0);
///
/// // Small outputs never go below 5px
/// assert_eq!(calculate_border_thickness(200, 200, 1.0), 5.0);
/// ```
pub fn calculate_border_thickness(width: u32, height: u32, thickness_percent: f32) -> f32 {
    let short_edge = width.min(height) as f32;
    let scaled = short_edge * thickness_percent / 100.0;
    // NaN from a bad percentage falls through to the minimum
    if scaled.is_nan() {
        return MIN_BORDER_THICKNESS;
    }
    scaled.max(MIN_BORDER_THICKNESS)
}

/// Radius of the circular clip: half the short edge.
pub fn calculate_clip_radius(width: u32, height: u32) -> f32 {
    width.min(height) as f32 / 2.0
}

/// Radius of the circular frame stroke.
///
/// Strokes are centred on the path, so the radius is pulled in by half the
/// border to keep the whole stroke inside the clip.
pub fn calculate_frame_circle_radius(width: u32, height: u32, border: f32) -> f32 {
    calculate_clip_radius(width, height) - border / 2.0
}

/// Inset rectangle `(x, y, width, height)` for a rectangular frame stroke.
pub fn calculate_frame_rect(width: u32, height: u32, border: f32) -> (f32, f32, f32, f32) {
    let half = border / 2.0;
    (half, half, width as f32 - border, height as f32 - border)
}

/// Largest `aspect`-shaped rectangle that fits inside `source`.
///
/// # Examples
/// ```
/// # use multicrop::imaging::calculate_fit_dimensions;
/// // 16:9 inside a 4000x3000 photo spans the full width
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (16, 9)), (4000, 2250));
///
/// // 9:16 inside the same photo spans the full height
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (9, 16)), (1688, 3000));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), aspect: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (aspect_w, aspect_h) = aspect;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = aspect_w as f64 / aspect_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height is the limit
        let w = (src_h as f64 * tgt_aspect).round() as u32;
        (w.clamp(1, src_w), src_h)
    } else {
        // Source is taller: width is the limit
        let h = (src_w as f64 / tgt_aspect).round() as u32;
        (src_w, h.clamp(1, src_h))
    }
}

/// Crop rectangle for a pan/zoom view of the source.
///
/// At zoom 1 the crop is the largest `aspect` rectangle that fits the source.
/// Higher zoom shrinks both sides by `1 / zoom`. `pan` is the offset of the
/// crop centre from the source centre in source pixels; it is clamped so the
/// crop never leaves the image.
pub fn calculate_view_crop(
    source: (u32, u32),
    aspect: (u32, u32),
    zoom: f64,
    pan: (f64, f64),
) -> CropRect {
    let (src_w, src_h) = source;
    let (fit_w, fit_h) = calculate_fit_dimensions(source, aspect);
    let zoom = if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        1.0
    };

    let width = ((fit_w as f64 / zoom).round() as u32).clamp(1, src_w);
    let height = ((fit_h as f64 / zoom).round() as u32).clamp(1, src_h);

    let (max_pan_x, max_pan_y) = calculate_pan_limits(source, (width, height));
    let pan_x = pan.0.clamp(-max_pan_x, max_pan_x);
    let pan_y = pan.1.clamp(-max_pan_y, max_pan_y);

    let left = src_w as f64 / 2.0 + pan_x - width as f64 / 2.0;
    let top = src_h as f64 / 2.0 + pan_y - height as f64 / 2.0;

    let x = (left.round().max(0.0) as u32).min(src_w - width);
    let y = (top.round().max(0.0) as u32).min(src_h - height);

    CropRect {
        x,
        y,
        width,
        height,
    }
}

/// How far the crop centre may move from the source centre on each axis.
pub fn calculate_pan_limits(source: (u32, u32), crop: (u32, u32)) -> (f64, f64) {
    (
        source.0.saturating_sub(crop.0) as f64 / 2.0,
        source.1.saturating_sub(crop.1) as f64 / 2.0,
    )
}

/// Pan offset (crop centre relative to source centre) of an existing rectangle.
pub fn calculate_pan_of(source: (u32, u32), crop: &CropRect) -> (f64, f64) {
    (
        crop.x as f64 + crop.width as f64 / 2.0 - source.0 as f64 / 2.0,
        crop.y as f64 + crop.height as f64 / 2.0 - source.1 as f64 / 2.0,
    )
}

/// Apply brightness, saturation and contrast to one straight-alpha RGB triple.
///
/// Uses the CSS Filter Effects definitions: brightness is a linear multiply,
/// saturate is the luminance-preserving colour matrix, contrast scales around
/// mid-grey. Each step clamps to the displayable range.
pub fn apply_tone(rgb: [u8; 3], tone: &ToneFilters) -> [u8; 3] {
    let b = tone.brightness / 100.0;
    let s = tone.saturation / 100.0;
    let c = tone.contrast / 100.0;

    let mut px = rgb.map(|v| (v as f32 / 255.0 * b).clamp(0.0, 1.0));

    let [r, g, bl] = px;
    px = [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * bl,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * bl,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * bl,
    ]
    .map(|v| v.clamp(0.0, 1.0));

    px.map(|v| (((v - 0.5) * c + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Bounding box of a `width` x `height` image rotated by `degrees`.
pub fn calculate_rotated_size(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let rad = (degrees as f64).to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let (w, h) = (width as f64, height as f64);
    // Round away float noise so 90° turns land on exact integers
    let bw = (cos * w + sin * h - 1e-6).ceil().max(1.0);
    let bh = (sin * w + cos * h - 1e-6).ceil().max(1.0);
    (bw as u32, bh as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Frame geometry
    // =========================================================================

    #[test]
    fn border_never_below_five_pixels() {
        assert_eq!(calculate_border_thickness(100, 100, 1.0), 5.0);
        assert_eq!(calculate_border_thickness(100, 100, 0.0), 5.0);
        assert_eq!(calculate_border_thickness(100, 100, -20.0), 5.0);
        assert_eq!(calculate_border_thickness(1, 1, 100.0), 5.0);
        assert_eq!(calculate_border_thickness(100, 100, f32::NAN), 5.0);
    }

    #[test]
    fn border_scales_with_short_edge() {
        assert_eq!(calculate_border_thickness(2000, 1000, 1.0), 10.0);
        assert_eq!(calculate_border_thickness(800, 800, 2.5), 20.0);
    }

    #[test]
    fn clip_radius_is_half_short_edge() {
        assert_eq!(calculate_clip_radius(400, 400), 200.0);
        assert_eq!(calculate_clip_radius(300, 500), 150.0);
    }

    #[test]
    fn frame_circle_pulls_in_half_border() {
        assert_eq!(calculate_frame_circle_radius(400, 400, 10.0), 195.0);
    }

    #[test]
    fn frame_rect_insets_half_border() {
        assert_eq!(
            calculate_frame_rect(400, 300, 10.0),
            (5.0, 5.0, 390.0, 290.0)
        );
    }

    // =========================================================================
    // Fit and view crops
    // =========================================================================

    #[test]
    fn fit_square_in_landscape() {
        assert_eq!(calculate_fit_dimensions((4000, 3000), (1, 1)), (3000, 3000));
    }

    #[test]
    fn fit_square_in_portrait() {
        assert_eq!(calculate_fit_dimensions((3000, 4000), (1, 1)), (3000, 3000));
    }

    #[test]
    fn fit_landscape_in_panorama() {
        // 3:1 panorama is wider than 16:9, so height limits
        assert_eq!(calculate_fit_dimensions((3000, 1000), (16, 9)), (1778, 1000));
    }

    #[test]
    fn view_crop_at_zoom_one_is_centered_fit() {
        let crop = calculate_view_crop((4000, 3000), (1, 1), 1.0, (0.0, 0.0));
        assert_eq!(crop, CropRect::new(500, 0, 3000, 3000));
    }

    #[test]
    fn view_crop_zoom_shrinks_both_sides() {
        let crop = calculate_view_crop((4000, 3000), (1, 1), 2.0, (0.0, 0.0));
        assert_eq!(crop, CropRect::new(1250, 750, 1500, 1500));
    }

    #[test]
    fn view_crop_pan_is_clamped_to_bounds() {
        let crop = calculate_view_crop((4000, 3000), (1, 1), 1.0, (10_000.0, -10_000.0));
        assert_eq!(crop, CropRect::new(1000, 0, 3000, 3000));
        assert!(crop.fits_within(4000, 3000));
    }

    #[test]
    fn view_crop_pan_moves_within_slack() {
        let crop = calculate_view_crop((4000, 3000), (1, 1), 2.0, (-250.0, 100.0));
        assert_eq!(crop, CropRect::new(1000, 850, 1500, 1500));
    }

    #[test]
    fn view_crop_bad_zoom_falls_back_to_one() {
        let crop = calculate_view_crop((100, 100), (1, 1), f64::NAN, (0.0, 0.0));
        assert_eq!(crop, CropRect::new(0, 0, 100, 100));
    }

    #[test]
    fn view_crop_always_within_tiny_source() {
        for zoom in [1.0, 1.5, 3.0] {
            let crop = calculate_view_crop((3, 1), (9, 16), zoom, (5.0, 5.0));
            assert!(crop.fits_within(3, 1), "{crop:?} at zoom {zoom}");
        }
    }

    #[test]
    fn pan_of_round_trips_view_crop() {
        let crop = calculate_view_crop((4000, 3000), (1, 1), 2.0, (-250.0, 100.0));
        assert_eq!(calculate_pan_of((4000, 3000), &crop), (-250.0, 100.0));
    }

    // =========================================================================
    // Tone and rotation
    // =========================================================================

    #[test]
    fn neutral_tone_is_identity() {
        for rgb in [[0, 0, 0], [255, 255, 255], [12, 130, 240]] {
            assert_eq!(apply_tone(rgb, &ToneFilters::NEUTRAL), rgb);
        }
    }

    #[test]
    fn zero_saturation_is_grey() {
        let tone = ToneFilters {
            saturation: 0.0,
            ..ToneFilters::NEUTRAL
        };
        let [r, g, b] = apply_tone([200, 40, 90], &tone);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let tone = ToneFilters {
            brightness: 200.0,
            ..ToneFilters::NEUTRAL
        };
        assert_eq!(apply_tone([100, 200, 0], &tone), [200, 255, 0]);
    }

    #[test]
    fn zero_contrast_is_mid_grey() {
        let tone = ToneFilters {
            contrast: 0.0,
            ..ToneFilters::NEUTRAL
        };
        assert_eq!(apply_tone([0, 255, 30], &tone), [128, 128, 128]);
    }

    #[test]
    fn rotated_size_quarter_turn_swaps() {
        assert_eq!(calculate_rotated_size(400, 300, 90.0), (300, 400));
        assert_eq!(calculate_rotated_size(400, 300, 180.0), (400, 300));
        assert_eq!(calculate_rotated_size(400, 300, 0.0), (400, 300));
    }

    #[test]
    fn rotated_size_diagonal_grows() {
        let (w, h) = calculate_rotated_size(100, 100, 45.0);
        assert_eq!((w, h), (142, 142));
    }
}
