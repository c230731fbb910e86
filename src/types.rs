//! Types shared between export orchestration, delivery and CLI output.

use crate::imaging::{EncodedImage, OutputFormat};
use crate::variant::Variant;
use serde::Serialize;

/// One finished output file ready for delivery.
///
/// Produced at export time, never cached, consumed once by delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub name: String,
    pub variant: Variant,
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl OutputArtifact {
    pub fn from_encoded(name: String, variant: Variant, encoded: EncodedImage) -> Self {
        Self {
            name,
            variant,
            bytes: encoded.bytes,
            format: encoded.format,
            width: encoded.width,
            height: encoded.height,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            name: self.name.clone(),
            variant: self.variant,
            mime_type: self.mime_type(),
            width: self.width,
            height: self.height,
            bytes: self.bytes.len(),
        }
    }
}

/// Byte-free description of an artifact for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub name: String,
    pub variant: Variant,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}
