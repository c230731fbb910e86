//! The top-level controller for one editing session.
//!
//! A [`Session`] owns the [`AppState`] and one [`CropController`] per mounted
//! aspect ratio. Crop interactions go to the controller, and the rectangle it
//! returns is written into state straight away; previews are pulled
//! separately once their debounce window has passed.
//!
//! Previews are not cancelled or reordered. Each carries the generation it was
//! requested at, and a consumer that cares can compare it with
//! [`Session::generation`] to spot a stale one.

use crate::config::{Config, ConfigError};
use crate::crop::{CropController, CropError, CropSpec, PreviewRequest};
use crate::export::{self, DeliveryReport, DeliverySettings, ExportError, ExportSettings, SaveSink};
use crate::imaging::{BackendError, Compositor, CropRect, EncodedImage, Quality, render_preview};
use crate::source::ImageSource;
use crate::state::{AppState, Defaults, StateEvent};
use crate::variant::AspectRatio;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded")]
    NoSource,
    #[error("No {0} crop mounted")]
    NotMounted(AspectRatio),
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct Session {
    state: AppState,
    controllers: [Option<CropController>; 3],
    quality: Quality,
    debounce: Duration,
    delivery: DeliverySettings,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, SessionError> {
        Ok(Self {
            state: AppState::new(Defaults::from_config(config)?),
            controllers: [None, None, None],
            quality: config.output.quality(),
            debounce: config.preview.debounce(),
            delivery: DeliverySettings {
                mode: config.export.mode,
                stagger: config.export.stagger(),
                archive_name: config.export.archive_name.clone(),
            },
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn delivery(&self) -> &DeliverySettings {
        &self.delivery
    }

    pub fn delivery_mut(&mut self) -> &mut DeliverySettings {
        &mut self.delivery
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Load a new image. Previously mounted crops are dropped.
    pub fn load(&mut self, source: ImageSource) {
        self.controllers = [None, None, None];
        self.state.apply(StateEvent::SourceLoaded(source));
    }

    /// Apply an event to the session state.
    ///
    /// `CropChanged` goes through the mounted controller like [`set_rect`](Self::set_rect),
    /// so it fails for an unmounted aspect or an out-of-bounds rectangle.
    /// `Reset` and `SourceLoaded` unmount every controller.
    pub fn apply(&mut self, event: StateEvent) -> Result<(), SessionError> {
        match event {
            StateEvent::CropChanged { aspect, crop } => {
                self.set_rect(aspect, crop, Instant::now())?;
            }
            StateEvent::Reset | StateEvent::SourceLoaded(_) => {
                self.controllers = [None, None, None];
                self.state.apply(event);
            }
            other => self.state.apply(other),
        }
        Ok(())
    }

    /// Mount a controller for a crop spec and record its initial crop.
    pub fn mount(&mut self, spec: &CropSpec, now: Instant) -> Result<CropRect, SessionError> {
        let source = self.state.source().ok_or(SessionError::NoSource)?;
        let controller = spec.mount(source.dimensions(), self.debounce, now)?;
        let crop = controller.crop();
        self.controllers[spec.aspect.index()] = Some(controller);
        self.record(spec.aspect, crop);
        Ok(crop)
    }

    /// Mount all three aspect ratios at their default crop.
    pub fn mount_all(&mut self, now: Instant) -> Result<(), SessionError> {
        for aspect in AspectRatio::ALL {
            self.mount(&CropSpec::centred(aspect), now)?;
        }
        Ok(())
    }

    pub fn controller(&self, aspect: AspectRatio) -> Option<&CropController> {
        self.controllers[aspect.index()].as_ref()
    }

    pub fn set_zoom(
        &mut self,
        aspect: AspectRatio,
        zoom: f64,
        now: Instant,
    ) -> Result<CropRect, SessionError> {
        let crop = self.controller_mut(aspect)?.set_zoom(zoom, now);
        self.record(aspect, crop);
        Ok(crop)
    }

    pub fn set_pan(
        &mut self,
        aspect: AspectRatio,
        pan: (f64, f64),
        now: Instant,
    ) -> Result<CropRect, SessionError> {
        let crop = self.controller_mut(aspect)?.set_pan(pan, now);
        self.record(aspect, crop);
        Ok(crop)
    }

    pub fn pan_by(
        &mut self,
        aspect: AspectRatio,
        dx: f64,
        dy: f64,
        now: Instant,
    ) -> Result<CropRect, SessionError> {
        let crop = self.controller_mut(aspect)?.pan_by(dx, dy, now);
        self.record(aspect, crop);
        Ok(crop)
    }

    pub fn set_rect(
        &mut self,
        aspect: AspectRatio,
        rect: CropRect,
        now: Instant,
    ) -> Result<CropRect, SessionError> {
        let crop = self.controller_mut(aspect)?.set_rect(rect, now)?;
        self.record(aspect, crop);
        Ok(crop)
    }

    /// Current interaction count for an aspect, for staleness checks.
    pub fn generation(&self, aspect: AspectRatio) -> Option<u64> {
        self.controller(aspect).map(CropController::generation)
    }

    /// Preview requests whose debounce window has passed, in aspect order.
    pub fn poll_previews(&mut self, now: Instant) -> Vec<(AspectRatio, PreviewRequest)> {
        self.controllers
            .iter_mut()
            .flatten()
            .filter_map(|c| c.poll_preview(now).map(|request| (c.aspect(), request)))
            .collect()
    }

    /// Render a preview request: crop and tone only.
    pub fn render_preview(
        &self,
        backend: &impl Compositor,
        request: &PreviewRequest,
    ) -> Result<EncodedImage, SessionError> {
        let source = self.state.source().ok_or(SessionError::NoSource)?;
        Ok(render_preview(
            backend,
            source,
            request.crop,
            self.state.tone(),
            self.quality,
        )?)
    }

    /// Render every enabled variant and hand the results to `sink`.
    pub fn export(
        &self,
        backend: &impl Compositor,
        sink: &mut impl SaveSink,
    ) -> Result<DeliveryReport, SessionError> {
        let source = self.state.source().ok_or(SessionError::NoSource)?;
        let settings =
            ExportSettings::from_state(&self.state, self.quality).ok_or(SessionError::NoSource)?;
        Ok(export::export(
            backend,
            source,
            self.state.crops(),
            &settings,
            &self.delivery,
            sink,
        )?)
    }

    fn controller_mut(&mut self, aspect: AspectRatio) -> Result<&mut CropController, SessionError> {
        self.controllers[aspect.index()]
            .as_mut()
            .ok_or(SessionError::NotMounted(aspect))
    }

    fn record(&mut self, aspect: AspectRatio, crop: CropRect) {
        self.state.apply(StateEvent::CropChanged { aspect, crop });
    }
}
