//! Aspect ratios and the output variants derived from them.
//!
//! Every session crops the source three ways. The square crop fans out into
//! up to three files; the other two produce one file each:
//!
//! | Variant | Aspect | Suffix | Effects |
//! |---|---|---|---|
//! | [`Variant::Square`] | 1:1 | `1x1` | none |
//! | [`Variant::SquareFramed`] | 1:1 | `1x1_framed` | frame |
//! | [`Variant::SquareCircle`] | 1:1 | `1x1_circle` | circle (+ frame if set) |
//! | [`Variant::Landscape`] | 16:9 | `16x9` | none |
//! | [`Variant::Portrait`] | 9:16 | `9x16` | none |

use crate::imaging::{EffectOptions, FrameColor, ToneFilters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three fixed crop shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Square,
    Landscape,
    Portrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [Self::Square, Self::Landscape, Self::Portrait];

    /// Ratio as `(width, height)`.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Landscape => (16, 9),
            Self::Portrait => (9, 16),
        }
    }

    /// Human label, e.g. `16:9`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Filename tag, e.g. `16x9`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Square => "1x1",
            Self::Landscape => "16x9",
            Self::Portrait => "9x16",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Square => 0,
            Self::Landscape => 1,
            Self::Portrait => 2,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" | "1:1" | "1x1" => Ok(Self::Square),
            "landscape" | "16:9" | "16x9" => Ok(Self::Landscape),
            "portrait" | "9:16" | "9x16" => Ok(Self::Portrait),
            other => Err(format!(
                "unknown aspect '{other}' (expected square, landscape or portrait)"
            )),
        }
    }
}

/// One deliverable output file kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Square,
    SquareFramed,
    SquareCircle,
    Landscape,
    Portrait,
}

impl Variant {
    /// Export order.
    pub const ALL: [Variant; 5] = [
        Self::Square,
        Self::SquareFramed,
        Self::SquareCircle,
        Self::Landscape,
        Self::Portrait,
    ];

    pub fn aspect(self) -> AspectRatio {
        match self {
            Self::Square | Self::SquareFramed | Self::SquareCircle => AspectRatio::Square,
            Self::Landscape => AspectRatio::Landscape,
            Self::Portrait => AspectRatio::Portrait,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Square => "1x1",
            Self::SquareFramed => "1x1_framed",
            Self::SquareCircle => "1x1_circle",
            Self::Landscape => "16x9",
            Self::Portrait => "9x16",
        }
    }

    /// Whether this variant is produced under the given square-only options.
    pub fn enabled(self, frame_color: Option<FrameColor>, circular: bool) -> bool {
        match self {
            Self::SquareFramed => frame_color.is_some(),
            Self::SquareCircle => circular,
            _ => true,
        }
    }

    /// Effects for this variant. Tone applies to every variant.
    pub fn effects(
        self,
        frame_color: Option<FrameColor>,
        thickness_percent: f32,
        tone: ToneFilters,
    ) -> EffectOptions {
        let base = EffectOptions {
            frame_thickness_percent: thickness_percent,
            tone,
            ..EffectOptions::none()
        };
        match self {
            Self::SquareFramed => EffectOptions {
                frame_color,
                ..base
            },
            Self::SquareCircle => EffectOptions {
                frame_color,
                is_circular: true,
                ..base
            },
            _ => base,
        }
    }
}
