//! Argument templates for the two thumbnail tools.
//!
//! Stills go through ImageMagick (resize to a target height, re-encode at a
//! fixed quality); videos go through ffmpeg (seek, grab one frame). The
//! profile is selected by [`MediaKind`] rather than by trait dispatch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tf_core::config::ThumbnailConfig;
use tf_core::{ConversionError, MediaKind};

use crate::command::ToolCommand;
use crate::tools::{ToolRegistry, FFMPEG, IMAGEMAGICK};

/// Fixed encoding settings shared by every job in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailProfile {
    /// Target height for stills; `0` keeps the original size.
    pub height: u32,
    /// Encoder quality for stills.
    pub quality: u8,
    /// Offset of the extracted video frame, in seconds.
    pub video_seek_secs: u32,
}

impl Default for ThumbnailProfile {
    fn default() -> Self {
        Self::from_config(&ThumbnailConfig::default())
    }
}

impl ThumbnailProfile {
    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self {
            height: config.height,
            quality: config.quality,
            video_seek_secs: config.video_seek_secs,
        }
    }

    /// Registry name of the tool that handles `kind`.
    pub fn tool(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Image => IMAGEMAGICK,
            MediaKind::Video => FFMPEG,
        }
    }

    /// Tool arguments converting `source` into `destination`.
    ///
    /// The destination extension selects the output encoder for both tools.
    pub fn args(&self, kind: MediaKind, source: &Path, destination: &Path) -> Vec<String> {
        let source = source.to_string_lossy().to_string();
        let destination = destination.to_string_lossy().to_string();

        match kind {
            MediaKind::Image => {
                let mut args = vec![source, "-auto-orient".to_string()];
                if self.height > 0 {
                    args.push("-resize".into());
                    args.push(format!("x{}", self.height));
                }
                args.push("-quality".into());
                args.push(self.quality.to_string());
                args.push(destination);
                args
            }
            MediaKind::Video => vec![
                "-hide_banner".into(),
                "-loglevel".into(),
                "error".into(),
                "-y".into(),
                "-ss".into(),
                self.video_seek_secs.to_string(),
                "-i".into(),
                source,
                "-frames:v".into(),
                "1".into(),
                destination,
            ],
        }
    }

    /// Build the complete command for one conversion.
    pub fn command(
        &self,
        tools: &ToolRegistry,
        kind: MediaKind,
        source: &Path,
        destination: &Path,
        timeout: Duration,
    ) -> Result<ToolCommand, ConversionError> {
        let tool = tools.require(Self::tool(kind))?;
        let mut cmd = ToolCommand::new(PathBuf::from(&tool.path));
        cmd.args(self.args(kind, source, destination)).timeout(timeout);
        Ok(cmd)
    }
}
