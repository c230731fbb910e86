//! Application state and the events that change it.
//!
//! [`AppState`] is owned by the top-level [`Session`](crate::session::Session)
//! and read everywhere else through `&AppState`. All mutation goes through
//! [`AppState::apply`].

use crate::config::{Config, ConfigError};
use crate::imaging::{CropRect, FrameColor, ToneFilters};
use crate::naming;
use crate::source::ImageSource;
use crate::variant::AspectRatio;
use tracing::debug;

/// The latest crop per aspect ratio. `None` until that controller reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropSet([Option<CropRect>; 3]);

impl CropSet {
    pub fn get(&self, aspect: AspectRatio) -> Option<CropRect> {
        self.0[aspect.index()]
    }

    pub fn set(&mut self, aspect: AspectRatio, crop: CropRect) {
        self.0[aspect.index()] = Some(crop);
    }

    pub fn clear(&mut self) {
        self.0 = [None; 3];
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Set crops in aspect order.
    pub fn iter(&self) -> impl Iterator<Item = (AspectRatio, CropRect)> + '_ {
        AspectRatio::ALL
            .into_iter()
            .filter_map(|aspect| self.get(aspect).map(|crop| (aspect, crop)))
    }
}

/// Square-variant options restored on reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defaults {
    pub frame_color: Option<FrameColor>,
    pub circular: bool,
    pub thickness_percent: f32,
}

impl Defaults {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            frame_color: config.frame.frame_color()?,
            circular: config.output.circular,
            thickness_percent: config.frame.thickness_percent,
        })
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            frame_color: Some(FrameColor::WHITE),
            circular: true,
            thickness_percent: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StateEvent {
    /// A new image was loaded. Clears crops and the custom name.
    SourceLoaded(ImageSource),
    CropChanged { aspect: AspectRatio, crop: CropRect },
    FrameColorChanged(Option<FrameColor>),
    CircularChanged(bool),
    ThicknessChanged(f32),
    ToneChanged(ToneFilters),
    CustomNameChanged(String),
    /// Drop the image and restore square options to their defaults.
    Reset,
}

#[derive(Debug, Clone)]
pub struct AppState {
    source: Option<ImageSource>,
    crops: CropSet,
    frame_color: Option<FrameColor>,
    circular: bool,
    thickness_percent: f32,
    tone: ToneFilters,
    custom_name: String,
    defaults: Defaults,
}

impl AppState {
    pub fn new(defaults: Defaults) -> Self {
        Self {
            source: None,
            crops: CropSet::default(),
            frame_color: defaults.frame_color,
            circular: defaults.circular,
            thickness_percent: defaults.thickness_percent,
            tone: ToneFilters::NEUTRAL,
            custom_name: String::new(),
            defaults,
        }
    }

    pub fn apply(&mut self, event: StateEvent) {
        match event {
            StateEvent::SourceLoaded(source) => {
                debug!(file = source.file_name(), "source loaded");
                self.source = Some(source);
                self.crops.clear();
                self.custom_name.clear();
            }
            StateEvent::CropChanged { aspect, crop } => self.crops.set(aspect, crop),
            StateEvent::FrameColorChanged(color) => self.frame_color = color,
            StateEvent::CircularChanged(circular) => self.circular = circular,
            StateEvent::ThicknessChanged(pct) => self.thickness_percent = pct.max(0.0),
            StateEvent::ToneChanged(tone) => self.tone = tone,
            StateEvent::CustomNameChanged(name) => self.custom_name = name,
            StateEvent::Reset => {
                debug!("state reset");
                *self = Self::new(self.defaults);
            }
        }
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn crops(&self) -> &CropSet {
        &self.crops
    }

    pub fn frame_color(&self) -> Option<FrameColor> {
        self.frame_color
    }

    pub fn circular(&self) -> bool {
        self.circular
    }

    pub fn thickness_percent(&self) -> f32 {
        self.thickness_percent
    }

    pub fn tone(&self) -> ToneFilters {
        self.tone
    }

    pub fn custom_name(&self) -> &str {
        &self.custom_name
    }

    /// Base name for exported files, or `None` without a source.
    pub fn base_name(&self) -> Option<String> {
        self.source
            .as_ref()
            .map(|source| naming::base_name(Some(&self.custom_name), source.file_name()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Defaults::default())
    }
}
