//! Interactive crop controllers, one per aspect ratio.
//!
//! A controller owns the pan/zoom state for one aspect ratio and the single
//! authoritative [`CropRect`] derived from it. Every interaction recomputes
//! that rectangle and hands it back straight away, so whoever exports always
//! sees the latest crop.
//!
//! Previews are derived from the same value. Each interaction re-arms a
//! debounce deadline; [`CropController::poll_preview`] yields a
//! [`PreviewRequest`] once the deadline passes without further input. Requests
//! carry a generation number that increases with every interaction.
//!
//! Time is passed in explicitly (`now: Instant`) so the debounce is
//! deterministic under test.

use crate::imaging::{
    CropRect, calculate_fit_dimensions, calculate_pan_limits, calculate_pan_of,
    calculate_view_crop,
};
use crate::variant::AspectRatio;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Error, Debug, PartialEq)]
pub enum CropError {
    #[error("crop {crop} does not fit a {width}x{height} image")]
    OutOfBounds {
        crop: CropRect,
        width: u32,
        height: u32,
    },
    #[error("invalid crop spec '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },
}

/// A settled crop ready to be rendered as a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRequest {
    pub crop: CropRect,
    pub generation: u64,
}

/// Pan/zoom state and the crop rectangle it produces.
#[derive(Debug, Clone)]
pub struct CropController {
    aspect: AspectRatio,
    source: (u32, u32),
    zoom: f64,
    pan: (f64, f64),
    crop: CropRect,
    debounce: Duration,
    deadline: Option<Instant>,
    generation: u64,
}

impl CropController {
    /// Mount a controller at zoom 1, centred. The initial crop counts as an
    /// interaction, so a first preview follows after the debounce window.
    pub fn new(aspect: AspectRatio, source: (u32, u32), debounce: Duration, now: Instant) -> Self {
        let crop = calculate_view_crop(source, aspect.ratio(), MIN_ZOOM, (0.0, 0.0));
        let mut controller = Self {
            aspect,
            source,
            zoom: MIN_ZOOM,
            pan: (0.0, 0.0),
            crop,
            debounce,
            deadline: None,
            generation: 0,
        };
        controller.touch(now);
        controller
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> (f64, f64) {
        self.pan
    }

    /// The current crop rectangle.
    pub fn crop(&self) -> CropRect {
        self.crop
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Zoom to `zoom`, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input
    /// resets to `MIN_ZOOM`.
    pub fn set_zoom(&mut self, zoom: f64, now: Instant) -> CropRect {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            MIN_ZOOM
        };
        self.recompute(now)
    }

    /// Move the crop centre to `pan` (relative to the image centre, source
    /// pixels). Clamped so the crop stays inside the image.
    pub fn set_pan(&mut self, pan: (f64, f64), now: Instant) -> CropRect {
        self.pan = pan;
        self.recompute(now)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64, now: Instant) -> CropRect {
        self.set_pan((self.pan.0 + dx, self.pan.1 + dy), now)
    }

    /// Use an explicit rectangle. Pan and zoom are back-derived from it.
    pub fn set_rect(&mut self, rect: CropRect, now: Instant) -> Result<CropRect, CropError> {
        let (width, height) = self.source;
        if !rect.fits_within(width, height) {
            return Err(CropError::OutOfBounds {
                crop: rect,
                width,
                height,
            });
        }
        let (fit_w, _) = calculate_fit_dimensions(self.source, self.aspect.ratio());
        self.zoom = (fit_w as f64 / rect.width as f64).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = calculate_pan_of(self.source, &rect);
        self.crop = rect;
        self.touch(now);
        Ok(rect)
    }

    /// Yield a preview request if the debounce window has passed since the
    /// last interaction. Each settled interaction yields at most one request.
    pub fn poll_preview(&mut self, now: Instant) -> Option<PreviewRequest> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        Some(PreviewRequest {
            crop: self.crop,
            generation: self.generation,
        })
    }

    /// Whether a preview is waiting on its debounce window.
    pub fn preview_pending(&self) -> bool {
        self.deadline.is_some()
    }

    fn recompute(&mut self, now: Instant) -> CropRect {
        self.crop = calculate_view_crop(self.source, self.aspect.ratio(), self.zoom, self.pan);
        // Keep the stored pan within the limits the rectangle was clamped to.
        let (max_x, max_y) =
            calculate_pan_limits(self.source, (self.crop.width, self.crop.height));
        self.pan = (
            self.pan.0.clamp(-max_x, max_x),
            self.pan.1.clamp(-max_y, max_y),
        );
        self.touch(now);
        self.crop
    }

    fn touch(&mut self, now: Instant) {
        self.generation += 1;
        self.deadline = Some(now + self.debounce);
        debug!(
            aspect = %self.aspect,
            crop = %self.crop,
            zoom = self.zoom,
            generation = self.generation,
            "crop changed"
        );
    }
}

/// Where a crop sits, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Centred at zoom 1.
    Default,
    /// Explicit source-pixel rectangle.
    Rect(CropRect),
    /// Zoom and pan, as the interactive controls would set them.
    View { zoom: f64, pan: (f64, f64) },
}

/// A crop given as `aspect[:placement]`.
///
/// - `square`
/// - `square:10,20,300,300`
/// - `landscape:zoom=1.5`
/// - `portrait:zoom=2,pan=30:-10`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSpec {
    pub aspect: AspectRatio,
    pub placement: Placement,
}

impl CropSpec {
    pub fn centred(aspect: AspectRatio) -> Self {
        Self {
            aspect,
            placement: Placement::Default,
        }
    }

    /// Mount a controller for this spec on a source of the given size.
    pub fn mount(
        &self,
        source: (u32, u32),
        debounce: Duration,
        now: Instant,
    ) -> Result<CropController, CropError> {
        let mut controller = CropController::new(self.aspect, source, debounce, now);
        match self.placement {
            Placement::Default => {}
            Placement::Rect(rect) => {
                controller.set_rect(rect, now)?;
            }
            Placement::View { zoom, pan } => {
                controller.set_zoom(zoom, now);
                controller.set_pan(pan, now);
            }
        }
        Ok(controller)
    }
}

impl FromStr for CropSpec {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| CropError::InvalidSpec {
            spec: s.to_string(),
            reason,
        };

        // The aspect itself may contain a colon (`16:9:zoom=2`)
        let split = s
            .match_indices(':')
            .map(|(i, _)| i)
            .find(|&i| s[..i].parse::<AspectRatio>().is_ok());
        let (aspect, rest) = match split {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };
        let aspect: AspectRatio = aspect.parse().map_err(invalid)?;

        let placement = match rest.map(str::trim) {
            None | Some("") => Placement::Default,
            Some(rest) if rest.contains('=') => parse_view(rest).map_err(invalid)?,
            Some(rest) => Placement::Rect(rest.parse().map_err(|e| invalid(format!("{e}")))?),
        };

        Ok(Self { aspect, placement })
    }
}

fn parse_view(s: &str) -> Result<Placement, String> {
    let mut zoom = MIN_ZOOM;
    let mut pan = (0.0, 0.0);
    for pair in s.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{pair}'"))?;
        match key.trim() {
            "zoom" => {
                zoom = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("bad zoom '{value}'"))?;
            }
            "pan" => {
                let (x, y) = value
                    .split_once(':')
                    .ok_or_else(|| format!("pan must be X:Y, got '{value}'"))?;
                pan = (
                    x.trim().parse().map_err(|_| format!("bad pan x '{x}'"))?,
                    y.trim().parse().map_err(|_| format!("bad pan y '{y}'"))?,
                );
            }
            other => return Err(format!("unknown key '{other}'")),
        }
    }
    Ok(Placement::View { zoom, pan })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(aspect: AspectRatio, source: (u32, u32)) -> (CropController, Instant) {
        let t0 = Instant::now();
        (CropController::new(aspect, source, PREVIEW_DEBOUNCE, t0), t0)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    #[test]
    fn mounts_centred_at_largest_fit() {
        let (c, _) = controller(AspectRatio::Landscape, (1600, 1600));
        assert_eq!(c.crop(), CropRect::new(0, 350, 1600, 900));
        assert_eq!(c.zoom(), 1.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let (mut c, t0) = controller(AspectRatio::Square, (900, 600));
        c.set_zoom(10.0, t0);
        assert_eq!(c.zoom(), MAX_ZOOM);
        assert_eq!(c.crop().width, 200);

        c.set_zoom(0.2, t0);
        assert_eq!(c.zoom(), MIN_ZOOM);
        assert_eq!(c.crop().width, 600);

        c.set_zoom(f64::NAN, t0);
        assert_eq!(c.zoom(), MIN_ZOOM);
    }

    #[test]
    fn pan_keeps_crop_inside() {
        let (mut c, t0) = controller(AspectRatio::Square, (900, 600));
        let crop = c.set_pan((10_000.0, -10_000.0), t0);
        assert_eq!(crop, CropRect::new(300, 0, 600, 600));
        assert_eq!(c.pan(), (150.0, 0.0));
        assert!(crop.fits_within(900, 600));
    }

    #[test]
    fn pan_by_accumulates() {
        let (mut c, t0) = controller(AspectRatio::Square, (900, 600));
        c.set_zoom(2.0, t0);
        c.pan_by(50.0, 0.0, t0);
        let crop = c.pan_by(25.0, 10.0, t0);
        assert_eq!(c.pan(), (75.0, 10.0));
        assert_eq!(crop, CropRect::new(375, 160, 300, 300));
    }

    #[test]
    fn interaction_returns_crop_immediately() {
        let (mut c, t0) = controller(AspectRatio::Square, (900, 600));
        let returned = c.set_zoom(2.0, t0);
        assert_eq!(returned, c.crop());
    }

    #[test]
    fn explicit_rect_is_validated() {
        let (mut c, t0) = controller(AspectRatio::Square, (100, 100));
        let err = c.set_rect(CropRect::new(50, 50, 60, 60), t0).unwrap_err();
        assert!(matches!(err, CropError::OutOfBounds { .. }));
        assert!(c.set_rect(CropRect::new(0, 0, 0, 10), t0).is_err());
    }

    #[test]
    fn explicit_rect_back_derives_view() {
        let (mut c, t0) = controller(AspectRatio::Square, (200, 100));
        c.set_rect(CropRect::new(0, 0, 50, 50), t0).unwrap();
        assert_eq!(c.zoom(), 2.0);
        assert_eq!(c.pan(), (-75.0, -25.0));
        assert_eq!(c.crop(), CropRect::new(0, 0, 50, 50));
    }

    // =========================================================================
    // Debounced previews
    // =========================================================================

    #[test]
    fn preview_waits_for_debounce() {
        let (mut c, t0) = controller(AspectRatio::Square, (100, 100));
        assert_eq!(c.poll_preview(t0), None);
        assert_eq!(c.poll_preview(t0 + Duration::from_millis(99)), None);

        let request = c.poll_preview(t0 + PREVIEW_DEBOUNCE).unwrap();
        assert_eq!(request.crop, c.crop());
        assert!(!c.preview_pending());
        assert_eq!(c.poll_preview(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn interaction_rearms_debounce() {
        let (mut c, t0) = controller(AspectRatio::Square, (100, 100));
        let t1 = t0 + Duration::from_millis(80);
        c.set_zoom(2.0, t1);

        assert_eq!(c.poll_preview(t0 + PREVIEW_DEBOUNCE), None);
        let request = c.poll_preview(t1 + PREVIEW_DEBOUNCE).unwrap();
        assert_eq!(request.crop.width, 50);
    }

    #[test]
    fn generation_increases_per_interaction() {
        let (mut c, t0) = controller(AspectRatio::Square, (100, 100));
        let first = c.generation();
        c.set_zoom(1.5, t0);
        c.pan_by(1.0, 0.0, t0);
        assert_eq!(c.generation(), first + 2);
        let request = c.poll_preview(t0 + PREVIEW_DEBOUNCE).unwrap();
        assert_eq!(request.generation, first + 2);
    }

    // =========================================================================
    // Crop specs
    // =========================================================================

    #[test]
    fn parses_bare_aspect() {
        let spec: CropSpec = "square".parse().unwrap();
        assert_eq!(spec.aspect, AspectRatio::Square);
        assert_eq!(spec.placement, Placement::Default);

        let spec: CropSpec = "16:9".parse().unwrap();
        assert_eq!(spec.aspect, AspectRatio::Landscape);
        assert_eq!(spec.placement, Placement::Default);

        let spec: CropSpec = "16:9:zoom=2".parse().unwrap();
        assert_eq!(spec.aspect, AspectRatio::Landscape);
        assert!(matches!(spec.placement, Placement::View { zoom, .. } if zoom == 2.0));
    }

    #[test]
    fn parses_rect() {
        let spec: CropSpec = "square:10,20,300,300".parse().unwrap();
        assert_eq!(spec.placement, Placement::Rect(CropRect::new(10, 20, 300, 300)));
    }

    #[test]
    fn parses_view() {
        let spec: CropSpec = "portrait:zoom=2,pan=30:-10".parse().unwrap();
        assert_eq!(spec.aspect, AspectRatio::Portrait);
        assert_eq!(
            spec.placement,
            Placement::View {
                zoom: 2.0,
                pan: (30.0, -10.0)
            }
        );
    }

    #[test]
    fn rejects_bad_specs() {
        assert!("wide".parse::<CropSpec>().is_err());
        assert!("square:zoom".parse::<CropSpec>().is_err());
        assert!("square:tilt=3".parse::<CropSpec>().is_err());
        assert!("square:1,2,3".parse::<CropSpec>().is_err());
    }

    #[test]
    fn mount_applies_placement() {
        let t0 = Instant::now();
        let spec: CropSpec = "landscape:zoom=2".parse().unwrap();
        let c = spec.mount((1600, 900), PREVIEW_DEBOUNCE, t0).unwrap();
        assert_eq!(c.crop(), CropRect::new(400, 225, 800, 450));

        let spec: CropSpec = "square:0,0,500,500".parse().unwrap();
        assert!(spec.mount((100, 100), PREVIEW_DEBOUNCE, t0).is_err());
    }
}
