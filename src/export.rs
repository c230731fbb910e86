//! Export orchestration: plan, render, deliver.
//!
//! ```text
//! CropSet + settings ──plan_exports──▶ [ArtifactPlan]   (≤ 5, fixed order)
//!                    ──generate_artifacts──▶ [OutputArtifact]   (all or nothing)
//!                    ──deliver──▶ SaveSink   (one archive, or staggered files)
//! ```
//!
//! Rendering runs in sequence and stops at the first failure. Nothing is
//! delivered unless every artifact rendered, and a batch with zero artifacts
//! triggers no saves at all.
//!
//! Sequential delivery schedules save `i` at `i × stagger`. The schedule is a
//! fixed set of offsets, not a chain of completions. If a save fails, the
//! ones before it are discarded through [`SaveSink::discard`].

use crate::archive::{self, ArchiveError};
use crate::imaging::{
    BackendError, Compositor, CropRect, EffectOptions, FrameColor, Quality, ToneFilters, render,
};
use crate::naming::artifact_file_name;
use crate::source::ImageSource;
use crate::state::{AppState, CropSet};
use crate::types::{ArtifactSummary, OutputArtifact};
use crate::variant::Variant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to render {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Save failed: {0}")]
    Save(#[from] std::io::Error),
}

impl ExportError {
    /// The one message shown to the user, whatever went wrong.
    pub fn user_message(&self, mode: DeliveryMode) -> &'static str {
        match mode {
            DeliveryMode::Archive => "Failed to generate the ZIP archive.",
            DeliveryMode::Sequential => "Failed to generate images.",
        }
    }
}

/// How finished artifacts reach the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// One ZIP holding every artifact.
    #[default]
    Archive,
    /// One save per artifact, staggered.
    Sequential,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Archive => "archive",
            Self::Sequential => "sequential",
        })
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive" | "zip" => Ok(Self::Archive),
            "sequential" | "files" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown delivery mode '{other}' (expected archive or sequential)"
            )),
        }
    }
}

/// Everything besides crops that decides what gets rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub base_name: String,
    pub frame_color: Option<FrameColor>,
    pub thickness_percent: f32,
    pub circular: bool,
    pub tone: ToneFilters,
    pub quality: Quality,
}

impl ExportSettings {
    /// Settings from the current state, or `None` without a source.
    pub fn from_state(state: &AppState, quality: Quality) -> Option<Self> {
        Some(Self {
            base_name: state.base_name()?,
            frame_color: state.frame_color(),
            thickness_percent: state.thickness_percent(),
            circular: state.circular(),
            tone: state.tone(),
            quality,
        })
    }
}

/// Delivery parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySettings {
    pub mode: DeliveryMode,
    pub stagger: Duration,
    pub archive_name: String,
}

/// One artifact to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPlan {
    pub name: String,
    pub variant: Variant,
    pub crop: CropRect,
    pub effects: EffectOptions,
}

/// Decide which artifacts to produce, in export order.
///
/// A variant is planned when its aspect ratio has a crop and, for the framed
/// and circular squares, when the frame colour or circular flag is set.
pub fn plan_exports(crops: &CropSet, settings: &ExportSettings) -> Vec<ArtifactPlan> {
    Variant::ALL
        .into_iter()
        .filter(|variant| variant.enabled(settings.frame_color, settings.circular))
        .filter_map(|variant| {
            let crop = crops.get(variant.aspect())?;
            let effects =
                variant.effects(settings.frame_color, settings.thickness_percent, settings.tone);
            let name = artifact_file_name(
                &settings.base_name,
                variant.suffix(),
                effects.output_format().extension(),
            );
            Some(ArtifactPlan {
                name,
                variant,
                crop,
                effects,
            })
        })
        .collect()
}

/// Render every plan in order. The first failure aborts the batch and
/// nothing rendered so far is returned.
pub fn generate_artifacts(
    backend: &impl Compositor,
    source: &ImageSource,
    plans: &[ArtifactPlan],
    quality: Quality,
) -> Result<Vec<OutputArtifact>, ExportError> {
    plans
        .iter()
        .map(|plan| {
            let encoded = render(backend, source, plan.crop, plan.effects, quality).map_err(
                |err| ExportError::Render {
                    name: plan.name.clone(),
                    source: err,
                },
            )?;
            debug!(name = %plan.name, bytes = encoded.bytes.len(), "rendered artifact");
            Ok(OutputArtifact::from_encoded(
                plan.name.clone(),
                plan.variant,
                encoded,
            ))
        })
        .collect()
}

/// Destination for delivered files.
pub trait SaveSink {
    /// Save `bytes` as `file_name`, `offset` after delivery started.
    fn schedule_save(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        offset: Duration,
    ) -> std::io::Result<()>;

    /// Take back a file saved earlier in the same delivery. Sinks that cannot
    /// undo a save leave this as a no-op.
    fn discard(&mut self, _file_name: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writes files into a directory, holding each until its offset has elapsed.
///
/// Only plain file names are accepted; anything with a directory part is
/// refused before it touches the disk.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    started: Instant,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            started: Instant::now(),
            saved: Vec::new(),
        })
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl SaveSink for DirectorySink {
    fn schedule_save(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        offset: Duration,
    ) -> std::io::Result<()> {
        let mut components = Path::new(file_name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) || file_name.contains('\\')
        {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("'{file_name}' is not a plain file name"),
            ));
        }
        let due = self.started + offset;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), "saved");
        self.saved.push(path);
        Ok(())
    }

    fn discard(&mut self, file_name: &str) -> std::io::Result<()> {
        let path = self.dir.join(file_name);
        fs::remove_file(&path)?;
        self.saved.retain(|p| p != &path);
        Ok(())
    }
}

/// One save handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledSave {
    pub file_name: String,
    pub offset_ms: u64,
    pub bytes: usize,
}

/// What an export produced and how it was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub mode: DeliveryMode,
    pub artifacts: Vec<ArtifactSummary>,
    pub saves: Vec<ScheduledSave>,
}

/// Hand artifacts to the sink. No artifacts, no saves.
pub fn deliver(
    artifacts: &[OutputArtifact],
    settings: &DeliverySettings,
    sink: &mut impl SaveSink,
) -> Result<DeliveryReport, ExportError> {
    let mut saves = Vec::new();
    if !artifacts.is_empty() {
        match settings.mode {
            DeliveryMode::Archive => {
                let zip = archive::bundle(artifacts)?;
                sink.schedule_save(&settings.archive_name, &zip, Duration::ZERO)?;
                saves.push(ScheduledSave {
                    file_name: settings.archive_name.clone(),
                    offset_ms: 0,
                    bytes: zip.len(),
                });
            }
            DeliveryMode::Sequential => {
                for (i, artifact) in artifacts.iter().enumerate() {
                    let offset = settings.stagger * i as u32;
                    if let Err(err) = sink.schedule_save(&artifact.name, &artifact.bytes, offset) {
                        roll_back(sink, &saves);
                        return Err(err.into());
                    }
                    saves.push(ScheduledSave {
                        file_name: artifact.name.clone(),
                        offset_ms: offset.as_millis() as u64,
                        bytes: artifact.bytes.len(),
                    });
                }
            }
        }
    }

    Ok(DeliveryReport {
        mode: settings.mode,
        artifacts: artifacts.iter().map(OutputArtifact::summary).collect(),
        saves,
    })
}

/// Discard earlier saves of a failed sequential delivery, newest first.
fn roll_back(sink: &mut impl SaveSink, saves: &[ScheduledSave]) {
    for save in saves.iter().rev() {
        if let Err(err) = sink.discard(&save.file_name) {
            warn!(file = %save.file_name, error = %err, "could not remove partial save");
        }
    }
}

/// Plan, render and deliver in one go.
pub fn export(
    backend: &impl Compositor,
    source: &ImageSource,
    crops: &CropSet,
    settings: &ExportSettings,
    delivery: &DeliverySettings,
    sink: &mut impl SaveSink,
) -> Result<DeliveryReport, ExportError> {
    let plans = plan_exports(crops, settings);
    if plans.is_empty() {
        info!("nothing to export");
    }
    let artifacts = generate_artifacts(backend, source, &plans, settings.quality)?;
    let report = deliver(&artifacts, delivery, sink)?;
    info!(
        artifacts = report.artifacts.len(),
        saves = report.saves.len(),
        mode = %delivery.mode,
        "export complete"
    );
    Ok(report)
}
