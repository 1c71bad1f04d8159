//! The [`Converter`] trait is the executor's only view of the external tools.
//!
//! The executor treats a conversion as an opaque, awaitable capability: run
//! it, get success or a [`ConversionError`]. [`ToolConverter`] is the
//! production implementation; tests substitute fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tf_av::{ThumbnailProfile, ToolRegistry};
use tf_core::config::Config;
use tf_core::ConversionError;

use crate::job::ConversionJob;

/// Performs one job's conversion.
///
/// Implementations must be cancel-safe in the sense that dropping the
/// returned future stops any work it started (the executor relies on this
/// for cancellation).
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `job.source()` into `job.destination()`.
    async fn convert(&self, job: &ConversionJob) -> Result<(), ConversionError>;
}

/// Converts jobs by running ImageMagick or ffmpeg.
#[derive(Debug, Clone)]
pub struct ToolConverter {
    tools: Arc<ToolRegistry>,
    profile: ThumbnailProfile,
    timeout: Duration,
}

impl ToolConverter {
    pub fn new(tools: Arc<ToolRegistry>, profile: ThumbnailProfile, timeout: Duration) -> Self {
        Self {
            tools,
            profile,
            timeout,
        }
    }

    /// Discover tools and read profile and timeout from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ToolRegistry::discover(&config.tools)),
            ThumbnailProfile::from_config(&config.thumbnails),
            config.pipeline.timeout(),
        )
    }
}

#[async_trait]
impl Converter for ToolConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<(), ConversionError> {
        tf_av::generate_thumbnail(
            &self.tools,
            &self.profile,
            job.kind(),
            job.source(),
            job.destination(),
            self.timeout,
        )
        .await
        .map(|_| ())
    }
}
