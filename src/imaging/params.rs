//! Parameter types for compositing operations.
//!
//! These structs describe *what* to render, not *how*. They are the interface
//! between the high-level [`operations`](super::operations) module (which
//! decides which variant to produce) and the [`backend`](super::backend)
//! (which does the pixel work). Keeping them plain data lets export
//! orchestration run against a recording mock.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 92). Clamped on construction.
//! - [`CropRect`]: Pixel-space sub-region of the source image.
//! - [`FrameColor`]: RGBA stroke colour, parsed from hex or a palette name.
//! - [`ToneFilters`]: Brightness / saturation / contrast percentages.
//! - [`EffectOptions`]: Frame, circular mask and tone settings for one render.
//! - [`OutputFormat`]: JPEG or PNG, with mime type and file extension.
//! - [`CompositeParams`]: Full specification for a single render.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    /// Matches the default JPEG quality of an HTML canvas (0.92).
    fn default() -> Self {
        Self(92)
    }
}

/// Pixel-space rectangle selected from the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle is non-empty and lies fully inside a
    /// `source_width` x `source_height` image.
    pub fn fits_within(&self, source_width: u32, source_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self
                .x
                .checked_add(self.width)
                .is_some_and(|right| right <= source_width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= source_height)
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

impl FromStr for CropRect {
    type Err = ParseError;

    /// Parse `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, w, h] = parts.as_slice() else {
            return Err(ParseError(format!(
                "expected x,y,width,height, got '{s}'"
            )));
        };
        let num = |v: &str| {
            v.parse::<u32>()
                .map_err(|_| ParseError(format!("'{v}' is not a pixel value")))
        };
        Ok(Self::new(num(x)?, num(y)?, num(w)?, num(h)?))
    }
}

/// Failure to parse a user-supplied colour or rectangle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Named frame colours offered by the picker.
pub const PALETTE: &[(&str, [u8; 3])] = &[
    ("red", [0xEF, 0x44, 0x44]),
    ("blue", [0x3B, 0x82, 0xF6]),
    ("green", [0x22, 0xC5, 0x5E]),
    ("yellow", [0xEA, 0xB3, 0x08]),
    ("purple", [0xA8, 0x55, 0xF7]),
    ("white", [0xFF, 0xFF, 0xFF]),
    ("black", [0x00, 0x00, 0x00]),
];

/// An RGBA frame colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameColor(pub [u8; 4]);

impl FrameColor {
    pub const WHITE: Self = Self([0xFF, 0xFF, 0xFF, 0xFF]);

    pub fn rgba(self) -> [u8; 4] {
        self.0
    }

    /// Parse a colour setting where `none` (or an empty string) disables the frame.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, ParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 0xFF {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl FromStr for FrameColor {
    type Err = ParseError;

    /// Accepts `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a [`PALETTE`] name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, [r, g, b])) = PALETTE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
        {
            return Ok(Self([*r, *g, *b, 0xFF]));
        }

        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ParseError(format!("unknown colour '{s}'")))?;
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ParseError(format!("invalid hex colour '{s}'")))
        };
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| ParseError(format!("invalid hex colour '{s}'")))
        };

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseError(format!("invalid hex colour '{s}'")));
        }
        match hex.len() {
            3 => Ok(Self([nibble(0)?, nibble(1)?, nibble(2)?, 0xFF])),
            6 => Ok(Self([byte(0)?, byte(2)?, byte(4)?, 0xFF])),
            8 => Ok(Self([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
            _ => Err(ParseError(format!("invalid hex colour '{s}'"))),
        }
    }
}

/// Tone adjustments in percent, 100 = unchanged.
///
/// Applied in the order brightness, saturation, contrast, matching
/// the filter chain `brightness() saturate() contrast()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneFilters {
    pub brightness: f32,
    pub saturation: f32,
    pub contrast: f32,
}

impl ToneFilters {
    pub const NEUTRAL: Self = Self {
        brightness: 100.0,
        saturation: 100.0,
        contrast: 100.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl Default for ToneFilters {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Optional effects for a single render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectOptions {
    pub frame_color: Option<FrameColor>,
    pub is_circular: bool,
    /// Frame thickness as a percentage of the short edge.
    pub frame_thickness_percent: f32,
    pub tone: ToneFilters,
}

impl EffectOptions {
    /// Default frame thickness when none is configured.
    pub const DEFAULT_THICKNESS_PERCENT: f32 = 1.0;

    /// Plain render: no frame, no mask, neutral tone.
    pub fn none() -> Self {
        Self {
            frame_color: None,
            is_circular: false,
            frame_thickness_percent: Self::DEFAULT_THICKNESS_PERCENT,
            tone: ToneFilters::NEUTRAL,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.is_circular {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self::none()
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Parameters for one composite render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    pub crop: CropRect,
    pub effects: EffectOptions,
    pub quality: Quality,
}
