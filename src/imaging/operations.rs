//! High-level compositing operations.
//!
//! These functions combine parameter planning with backend execution. They
//! take crop and effect settings, build [`CompositeParams`], and call the
//! backend.

use super::backend::{BackendError, Compositor, EncodedImage};
use super::params::{CompositeParams, CropRect, EffectOptions, Quality, ToneFilters};
use crate::source::ImageSource;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Plan a composite without executing it.
pub fn plan_composite(crop: CropRect, effects: EffectOptions, quality: Quality) -> CompositeParams {
    CompositeParams {
        crop,
        effects,
        quality,
    }
}

/// Render one crop with effects.
pub fn render(
    backend: &impl Compositor,
    source: &ImageSource,
    crop: CropRect,
    effects: EffectOptions,
    quality: Quality,
) -> Result<EncodedImage> {
    let params = plan_composite(crop, effects, quality);
    debug!(
        crop = %crop,
        circular = effects.is_circular,
        framed = effects.frame_color.is_some(),
        "compositing"
    );
    backend.composite(source, &params)
}

/// Render the simplified preview shown while cropping: no frame, no mask.
///
/// Tone filters still apply so the preview matches the exported colours.
pub fn render_preview(
    backend: &impl Compositor,
    source: &ImageSource,
    crop: CropRect,
    tone: ToneFilters,
    quality: Quality,
) -> Result<EncodedImage> {
    let effects = EffectOptions {
        tone,
        ..EffectOptions::none()
    };
    render(backend, source, crop, effects, quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::FrameColor;
    use crate::imaging::OutputFormat;
    use crate::imaging::backend::tests::{MockCompositor, RecordedOp};
    use crate::test_helpers::gradient_source;

    #[test]
    fn plan_composite_carries_settings() {
        let effects = EffectOptions {
            frame_color: Some(FrameColor::WHITE),
            ..EffectOptions::none()
        };
        let params = plan_composite(CropRect::new(1, 2, 3, 4), effects, Quality::new(70));
        assert_eq!(params.crop, CropRect::new(1, 2, 3, 4));
        assert_eq!(params.effects.frame_color, Some(FrameColor::WHITE));
        assert_eq!(params.quality.value(), 70);
    }

    #[test]
    fn render_uses_backend() {
        let backend = MockCompositor::new();
        let source = gradient_source(100, 100);

        let out = render(
            &backend,
            &source,
            CropRect::new(0, 0, 50, 50),
            EffectOptions::none(),
            Quality::default(),
        )
        .unwrap();
        assert_eq!((out.width, out.height), (50, 50));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp { crop, quality: 92, .. } if crop.width == 50
        ));
    }

    #[test]
    fn preview_never_frames_or_masks() {
        let backend = MockCompositor::new();
        let source = gradient_source(100, 100);

        let out = render_preview(
            &backend,
            &source,
            CropRect::new(0, 0, 100, 100),
            ToneFilters::NEUTRAL,
            Quality::default(),
        )
        .unwrap();
        assert_eq!(out.format, OutputFormat::Jpeg);

        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp {
                frame_color: None,
                circular: false,
                ..
            }
        ));
    }
}
