//! One complete source-to-thumbnail conversion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tf_core::{ConversionError, MediaKind};

use crate::profile::ThumbnailProfile;
use crate::staging::StagedOutput;
use crate::tools::ToolRegistry;

/// Convert `source` into a thumbnail at `destination`.
///
/// The external tool runs at most once and is killed if it outlives
/// `timeout` or if the returned future is dropped. On success the destination
/// holds a non-empty file; on failure it is left untouched.
///
/// # Errors
///
/// - [`ConversionError::SourceMissing`] if `source` cannot be stat'ed.
/// - [`ConversionError::ToolNotFound`] if the tool for `kind` is unavailable.
/// - Any error from [`ToolCommand::execute`](crate::ToolCommand::execute).
/// - [`ConversionError::InvalidOutput`] / [`ConversionError::Output`] from
///   finalizing the staged file.
pub async fn generate_thumbnail(
    tools: &ToolRegistry,
    profile: &ThumbnailProfile,
    kind: MediaKind,
    source: &Path,
    destination: &Path,
    timeout: Duration,
) -> Result<PathBuf, ConversionError> {
    tokio::fs::metadata(source)
        .await
        .map_err(|e| ConversionError::SourceMissing {
            path: source.to_path_buf(),
            source: e,
        })?;

    let stage = {
        let destination = destination.to_path_buf();
        blocking(move || StagedOutput::new(&destination)).await?
    };
    let cmd = profile.command(tools, kind, source, stage.path(), timeout)?;

    tracing::debug!(
        %kind,
        source = %source.display(),
        destination = %destination.display(),
        "generating thumbnail"
    );

    let output = cmd.execute().await?;
    if !output.stderr.trim().is_empty() {
        tracing::debug!(stderr = %output.stderr.trim(), "tool diagnostics");
    }

    blocking(move || stage.finalize()).await
}

/// Run blocking filesystem work off the async worker threads.
async fn blocking<T, F>(work: F) -> Result<T, ConversionError>
where
    F: FnOnce() -> Result<T, ConversionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ConversionError::Panicked {
            message: format!("staging task failed: {e}"),
        })?
}
