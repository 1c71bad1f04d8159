//! Conversion jobs and their lifecycle states.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tf_core::{JobId, MediaKind};

/// One unit of work: turn a single source artifact into one thumbnail.
///
/// Jobs are immutable once built; the executor shares them behind `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    id: JobId,
    kind: MediaKind,
    source: PathBuf,
    destination: PathBuf,
    album: Option<String>,
}

impl ConversionJob {
    /// Create a job with a fresh [`JobId`].
    pub fn new(kind: MediaKind, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            id: JobId::new(),
            kind,
            source: source.into(),
            destination: destination.into(),
            album: None,
        }
    }

    /// Builder: tag the job with the album it was derived from.
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    /// Short label for logs: the album name, or the source file name.
    pub fn label(&self) -> String {
        match &self.album {
            Some(album) => album.clone(),
            None => self
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| self.source.display().to_string()),
        }
    }
}

/// Per-job state machine: `Pending -> Running -> {Succeeded, Failed}`.
///
/// A cancelled job that never ran goes straight from `Pending` to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
