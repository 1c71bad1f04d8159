//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! tool, thumbnail and pipeline sections. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub thumbnails: ThumbnailConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Configuration(format!("config parse error: {e}")))
    }

    /// Load configuration strictly: a missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.thumbnails.height == 0 {
            warnings.push("thumbnails.height is 0; images will not be resized".into());
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            warnings.push(format!(
                "thumbnails.quality {} is outside 1..=100",
                self.thumbnails.quality
            ));
        }
        if self.thumbnails.format.trim().is_empty() {
            warnings.push("thumbnails.format is empty".into());
        }
        if self.pipeline.parallelism == Some(0) {
            warnings.push("pipeline.parallelism is 0; runs will be rejected".into());
        }
        if self.pipeline.timeout_secs == 0 {
            warnings.push("pipeline.timeout_secs is 0; every conversion will time out".into());
        }

        for (name, path) in [
            ("ffmpeg_path", &self.tools.ffmpeg_path),
            ("magick_path", &self.tools.magick_path),
        ] {
            if let Some(p) = path {
                if !p.exists() {
                    warnings.push(format!(
                        "tools.{name} {} does not exist; falling back to PATH",
                        p.display()
                    ));
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub magick_path: Option<PathBuf>,
}

/// Thumbnail naming and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Directory receiving one thumbnail per album.
    pub output_dir: PathBuf,
    /// Target height in pixels for still images; width keeps the aspect ratio.
    pub height: u32,
    /// Lossy encoder quality (1-100) for still images.
    pub quality: u8,
    /// Offset into a video, in seconds, of the extracted frame.
    pub video_seek_secs: u32,
    /// Output file extension, which also selects the encoder.
    pub format: String,
    /// Appended to the album name to form the thumbnail file stem.
    pub suffix: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("thumbnails"),
            height: 300,
            quality: 80,
            video_seek_secs: 1,
            format: "webp".into(),
            suffix: "_thumb".into(),
        }
    }
}

/// Executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum concurrent conversions; `None` means one per CPU core.
    pub parallelism: Option<usize>,
    /// Deadline for each external tool invocation.
    pub timeout_secs: u64,
    /// Skip albums whose thumbnail already exists.
    pub skip_existing: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            timeout_secs: 120,
            skip_existing: false,
        }
    }
}

impl PipelineConfig {
    /// The configured parallelism, or the number of available CPU cores.
    ///
    /// An explicit zero is returned unchanged so the executor can reject it.
    pub fn resolve_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(num_cpus::get)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.thumbnails.output_dir, PathBuf::from("thumbnails"));
        assert_eq!(cfg.thumbnails.height, 300);
        assert_eq!(cfg.thumbnails.quality, 80);
        assert_eq!(cfg.thumbnails.video_seek_secs, 1);
        assert_eq!(cfg.thumbnails.format, "webp");
        assert_eq!(cfg.pipeline.timeout(), Duration::from_secs(120));
        assert!(cfg.pipeline.parallelism.is_none());
    }

    #[test]
    fn default_config_no_warnings() {
        let warnings = Config::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"thumbnails": {"height": 200}, "pipeline": {"parallelism": 3}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.thumbnails.height, 200);
        assert_eq!(cfg.thumbnails.quality, 80);
        assert_eq!(cfg.pipeline.resolve_parallelism(), 3);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.thumbnails.format, "webp");
        assert!(cfg.pipeline.resolve_parallelism() >= 1);
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn zero_parallelism_warns() {
        let mut cfg = Config::default();
        cfg.pipeline.parallelism = Some(0);
        assert_eq!(cfg.pipeline.resolve_parallelism(), 0);
        assert!(cfg.validate().iter().any(|w| w.contains("parallelism")));
    }

    #[test]
    fn bad_quality_warns() {
        let mut cfg = Config::default();
        cfg.thumbnails.quality = 0;
        assert!(cfg.validate().iter().any(|w| w.contains("quality")));
    }

    #[test]
    fn missing_tool_override_warns() {
        let mut cfg = Config::default();
        cfg.tools.ffmpeg_path = Some(PathBuf::from("/nonexistent/ffmpeg"));
        assert!(cfg.validate().iter().any(|w| w.contains("ffmpeg_path")));
    }

    #[test]
    fn negative_parallelism_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumbforge.json");
        std::fs::write(&path, r#"{"pipeline": {"parallelism": -1}}"#).unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("-1")));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumbforge.json");
        std::fs::write(&path, r#"{"pipeline": {"timeout_secs": 5}}"#).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.pipeline.timeout_secs, 5);
        assert!(Config::load(&dir.path().join("absent.json")).is_err());
    }
}
