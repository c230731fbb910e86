//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! photo.jpg
//!     Size: 4000x3000
//!     1:1 → 3000x3000 at (500, 0)
//!     16:9 → 4000x2250 at (0, 375)
//!     9:16 → 1688x3000 at (1156, 0)
//! ```
//!
//! ## Preview
//!
//! ```text
//! 001 1:1 → photo_1x1_preview.jpg
//!     Crop: 3000x3000 at (500, 0)
//! ```
//!
//! ## Export
//!
//! ```text
//! 001 photo_1x1.jpg (image/jpeg, 3000x3000)
//! 002 photo_1x1_circle.png (image/png, 3000x3000)
//! Archive → out/cropped-images.zip
//! Exported 2 files
//! ```

use crate::export::{DeliveryMode, DeliveryReport};
use crate::imaging::{CropRect, calculate_view_crop};
use crate::source::ImageSource;
use crate::variant::AspectRatio;
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// Default crop per aspect ratio, as reported by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultCrop {
    pub aspect: AspectRatio,
    pub crop: CropRect,
}

/// Machine-readable `inspect` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub default_crops: Vec<DefaultCrop>,
}

impl SourceReport {
    pub fn new(source: &ImageSource) -> Self {
        let default_crops = AspectRatio::ALL
            .into_iter()
            .map(|aspect| DefaultCrop {
                aspect,
                crop: calculate_view_crop(source.dimensions(), aspect.ratio(), 1.0, (0.0, 0.0)),
            })
            .collect();
        Self {
            file_name: source.file_name().to_string(),
            width: source.width(),
            height: source.height(),
            default_crops,
        }
    }
}

pub fn format_source_info(report: &SourceReport) -> Vec<String> {
    let mut lines = vec![
        report.file_name.clone(),
        format!("{}Size: {}x{}", indent(1), report.width, report.height),
    ];
    for DefaultCrop { aspect, crop } in &report.default_crops {
        lines.push(format!("{}{} \u{2192} {}", indent(1), aspect, crop));
    }
    lines
}

pub fn print_source_info(report: &SourceReport) {
    for line in format_source_info(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

/// One preview written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPreview {
    pub aspect: AspectRatio,
    pub crop: CropRect,
    pub file_name: String,
}

pub fn format_previews(previews: &[WrittenPreview]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, preview) in previews.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            preview.aspect,
            preview.file_name
        ));
        lines.push(format!("{}Crop: {}", indent(1), preview.crop));
    }
    lines
}

pub fn print_previews(previews: &[WrittenPreview]) {
    for line in format_previews(previews) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

pub fn format_delivery(report: &DeliveryReport, out_dir: &Path) -> Vec<String> {
    if report.artifacts.is_empty() {
        return vec!["Nothing to export: no crops set".to_string()];
    }

    let mut lines: Vec<String> = report
        .artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "{} {} ({}, {}x{})",
                format_index(i + 1),
                a.name,
                a.mime_type,
                a.width,
                a.height
            )
        })
        .collect();

    match report.mode {
        DeliveryMode::Archive => {
            for save in &report.saves {
                lines.push(format!(
                    "Archive \u{2192} {}",
                    out_dir.join(&save.file_name).display()
                ));
            }
        }
        DeliveryMode::Sequential => {
            lines.push(format!("Sequential \u{2192} {}", out_dir.display()));
            for save in &report.saves {
                lines.push(format!(
                    "{}+{}ms {}",
                    indent(1),
                    save.offset_ms,
                    save.file_name
                ));
            }
        }
    }

    lines.push(format!("Exported {}", plural(report.artifacts.len(), "file")));
    lines
}

pub fn print_delivery(report: &DeliveryReport, out_dir: &Path) {
    for line in format_delivery(report, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ScheduledSave;
    use crate::types::ArtifactSummary;
    use crate::variant::Variant;
    use crate::test_helpers::gradient_source;

    fn summary(name: &str, mime_type: &'static str) -> ArtifactSummary {
        ArtifactSummary {
            name: name.to_string(),
            variant: Variant::Square,
            mime_type,
            width: 90,
            height: 90,
            bytes: 10,
        }
    }

    fn save(name: &str, offset_ms: u64) -> ScheduledSave {
        ScheduledSave {
            file_name: name.to_string(),
            offset_ms,
            bytes: 10,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_words() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(3, "file"), "3 files");
    }

    #[test]
    fn source_info_lists_default_crops() {
        let report = SourceReport::new(&gradient_source(400, 300));
        let lines = format_source_info(&report);
        assert_eq!(
            lines,
            vec![
                "gradient.png",
                "    Size: 400x300",
                "    1:1 \u{2192} 300x300 at (50, 0)",
                "    16:9 \u{2192} 400x225 at (0, 38)",
                "    9:16 \u{2192} 169x300 at (116, 0)",
            ]
        );
    }

    #[test]
    fn source_report_serializes() {
        let report = SourceReport::new(&gradient_source(16, 9));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["width"], 16);
        assert_eq!(json["default_crops"][1]["aspect"], "landscape");
        assert_eq!(json["default_crops"][1]["crop"]["width"], 16);
    }

    #[test]
    fn previews_are_indexed() {
        let lines = format_previews(&[WrittenPreview {
            aspect: AspectRatio::Landscape,
            crop: CropRect::new(0, 38, 400, 225),
            file_name: "photo_16x9_preview.jpg".into(),
        }]);
        assert_eq!(
            lines,
            vec![
                "001 16:9 \u{2192} photo_16x9_preview.jpg",
                "    Crop: 400x225 at (0, 38)",
            ]
        );
    }

    #[test]
    fn archive_delivery() {
        let report = DeliveryReport {
            mode: DeliveryMode::Archive,
            artifacts: vec![
                summary("p_1x1.jpg", "image/jpeg"),
                summary("p_1x1_circle.png", "image/png"),
            ],
            saves: vec![save("cropped-images.zip", 0)],
        };
        let lines = format_delivery(&report, Path::new("out"));
        assert_eq!(
            lines,
            vec![
                "001 p_1x1.jpg (image/jpeg, 90x90)",
                "002 p_1x1_circle.png (image/png, 90x90)",
                "Archive \u{2192} out/cropped-images.zip",
                "Exported 2 files",
            ]
        );
    }

    #[test]
    fn sequential_delivery_shows_offsets() {
        let report = DeliveryReport {
            mode: DeliveryMode::Sequential,
            artifacts: vec![summary("a.jpg", "image/jpeg"), summary("b.jpg", "image/jpeg")],
            saves: vec![save("a.jpg", 0), save("b.jpg", 500)],
        };
        let lines = format_delivery(&report, Path::new("out"));
        assert_eq!(lines[2], "Sequential \u{2192} out");
        assert_eq!(lines[3], "    +0ms a.jpg");
        assert_eq!(lines[4], "    +500ms b.jpg");
        assert_eq!(lines[5], "Exported 2 files");
    }

    #[test]
    fn empty_delivery() {
        let report = DeliveryReport {
            mode: DeliveryMode::Archive,
            artifacts: vec![],
            saves: vec![],
        };
        assert_eq!(
            format_delivery(&report, Path::new("out")),
            vec!["Nothing to export: no crops set"]
        );
    }
}
