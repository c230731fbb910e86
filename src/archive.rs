//! ZIP bundling for archive delivery.
//!
//! Entries are stored without compression; JPEG and PNG payloads are already
//! compressed.

use crate::types::OutputArtifact;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate entry name: {0}")]
    DuplicateEntry(String),
}

/// Bundle artifacts into an in-memory ZIP, one entry per artifact, in order.
pub fn bundle(artifacts: &[OutputArtifact]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (i, artifact) in artifacts.iter().enumerate() {
        if artifacts[..i].iter().any(|a| a.name == artifact.name) {
            return Err(ArchiveError::DuplicateEntry(artifact.name.clone()));
        }
        writer.start_file(artifact.name.as_str(), options)?;
        writer.write_all(&artifact.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use crate::variant::Variant;
    use std::io::Read;
    use zip::ZipArchive;

    fn artifact(name: &str, bytes: &[u8]) -> OutputArtifact {
        OutputArtifact {
            name: name.to_string(),
            variant: Variant::Square,
            bytes: bytes.to_vec(),
            format: OutputFormat::Jpeg,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn bundle_contains_every_artifact_in_order() {
        let zip = bundle(&[artifact("a_1x1.jpg", b"first"), artifact("a_16x9.jpg", b"second")])
            .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(zip)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "a_1x1.jpg");
        let mut body = Vec::new();
        entry.read_to_end(&mut body).unwrap();
        assert_eq!(body, b"first");
        drop(entry);

        assert_eq!(archive.by_index(1).unwrap().name(), "a_16x9.jpg");
    }

    #[test]
    fn entries_are_stored() {
        let zip = bundle(&[artifact("x.jpg", b"payload")]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(zip)).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn empty_bundle_is_a_valid_zip() {
        let zip = bundle(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(zip)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = bundle(&[artifact("x.jpg", b"1"), artifact("x.jpg", b"2")]);
        assert!(matches!(result, Err(ArchiveError::DuplicateEntry(name)) if name == "x.jpg"));
    }
}
