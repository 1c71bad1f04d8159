//! Staged output for a single thumbnail.
//!
//! A [`StagedOutput`] reserves a hidden temp file next to the destination,
//! carrying the destination's extension so tools pick the right encoder. The
//! tool writes there; [`StagedOutput::finalize`] validates the result and
//! renames it onto the destination. Dropping an unfinalized stage deletes the
//! temp file, so a failed conversion never leaves a partial thumbnail behind.
//!
//! [`StagedOutput::new`] and [`StagedOutput::finalize`] block on the
//! filesystem. Async callers run them through `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tf_core::ConversionError;

pub struct StagedOutput {
    temp: TempPath,
    destination: PathBuf,
}

impl StagedOutput {
    /// Create the destination's parent directory and reserve a staging file.
    pub fn new(destination: &Path) -> Result<Self, ConversionError> {
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        std::fs::create_dir_all(parent).map_err(|e| ConversionError::Output {
            path: parent.to_path_buf(),
            source: e,
        })?;

        let suffix = destination
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(".thumbforge-")
            .suffix(&suffix)
            .tempfile_in(parent)
            .map_err(|e| ConversionError::Output {
                path: destination.to_path_buf(),
                source: e,
            })?
            .into_temp_path();

        Ok(Self {
            temp,
            destination: destination.to_path_buf(),
        })
    }

    /// Path the tool should write to.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Validate the staged file and move it onto the destination.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::InvalidOutput`] if the staged file is missing or
    ///   empty.
    /// - [`ConversionError::Output`] if the rename fails.
    pub fn finalize(self) -> Result<PathBuf, ConversionError> {
        let size = match std::fs::metadata(&self.temp) {
            Ok(meta) => meta.len(),
            Err(e) => {
                return Err(ConversionError::InvalidOutput {
                    path: self.destination,
                    reason: format!("tool produced no file: {e}"),
                })
            }
        };

        if size == 0 {
            return Err(ConversionError::InvalidOutput {
                path: self.destination,
                reason: "tool produced an empty file".into(),
            });
        }

        let Self { temp, destination } = self;
        temp.persist(&destination)
            .map_err(|e| ConversionError::Output {
                path: destination.clone(),
                source: e.error,
            })?;

        Ok(destination)
    }
}

impl std::fmt::Debug for StagedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedOutput")
            .field("path", &self.path())
            .field("destination", &self.destination)
            .finish()
    }
}
