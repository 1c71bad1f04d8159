//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the two
//! conversion tools (ffmpeg for video frames, ImageMagick for stills) and
//! provides lookup methods for the rest of the crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tf_core::config::ToolsConfig;
use tf_core::ConversionError;

/// Registry name of the video frame extractor.
pub const FFMPEG: &str = "ffmpeg";

/// Registry name of the still-image resizer.
pub const IMAGEMAGICK: &str = "magick";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[FFMPEG, IMAGEMAGICK];

/// Executables tried on `PATH` for each registry name, in order.
/// ImageMagick 6 only ships the `convert` entry point.
fn candidates(name: &str) -> &'static [&'static str] {
    match name {
        FFMPEG => &["ffmpeg"],
        IMAGEMAGICK => &["magick", "convert"],
        _ => &[],
    }
}

/// Configuration for a single external tool.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Registry name (e.g. "ffmpeg").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of version output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// For each known tool, if the [`ToolsConfig`] supplies a custom path
    /// **and** that path exists, it is used directly. Otherwise
    /// [`which::which`] is used to locate the tool in `PATH`. Tools that are
    /// not found are omitted from the registry.
    pub fn discover(tools_config: &ToolsConfig) -> Self {
        let mut registry = Self::default();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                FFMPEG => tools_config.ffmpeg_path.as_deref(),
                IMAGEMAGICK => tools_config.magick_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(tool = name, path = %p.display(), "configured tool path does not exist; searching PATH");
                    search_path(name)
                }
                None => search_path(name),
            };

            match resolved {
                Some(path) => {
                    tracing::debug!(tool = name, path = %path.display(), "tool discovered");
                    registry.insert(name, path);
                }
                None => tracing::debug!(tool = name, "tool not found"),
            }
        }

        registry
    }

    /// Register (or replace) a tool at an explicit path.
    pub fn insert(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.tools.insert(
            name.to_string(),
            ToolConfig {
                name: name.to_string(),
                path: path.into(),
            },
        );
    }

    /// Return a reference to the [`ToolConfig`] for the given tool, or
    /// [`ConversionError::ToolNotFound`] if it was not found during discovery.
    pub fn require(&self, name: &str) -> Result<&ToolConfig, ConversionError> {
        self.tools.get(name).ok_or_else(|| ConversionError::ToolNotFound {
            tool: name.to_string(),
        })
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(name, &cfg.path),
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

fn search_path(name: &str) -> Option<PathBuf> {
    candidates(name)
        .iter()
        .find_map(|candidate| which::which(candidate).ok())
}

/// Run `<tool> -version` (or `--version` for ImageMagick) and return the
/// first line of stdout.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        FFMPEG => "-version",
        _ => "--version",
    };

    let output = std::process::Command::new(path)
        .arg(version_arg)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_with_default_config() {
        let registry = ToolRegistry::discover(&ToolsConfig::default());
        // We cannot guarantee any tool is installed in CI,
        // but the call itself must not panic.
        let _ = registry.check_all();
    }

    #[test]
    fn require_missing_tool_returns_error() {
        let registry = ToolRegistry::default();
        let err = registry.require(FFMPEG).unwrap_err();
        assert!(matches!(err, ConversionError::ToolNotFound { ref tool } if tool == "ffmpeg"));
    }

    #[test]
    fn check_all_returns_known_tools() {
        let registry = ToolRegistry::default();
        let infos = registry.check_all();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ffmpeg", "magick"]);
        assert!(infos.iter().all(|i| !i.available));
    }

    #[test]
    fn configured_path_is_used_when_present() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = ToolsConfig {
            ffmpeg_path: Some(tmp.path().to_path_buf()),
            magick_path: None,
        };
        let registry = ToolRegistry::discover(&cfg);
        assert_eq!(registry.require(FFMPEG).unwrap().path, tmp.path());
    }

    #[test]
    fn insert_overrides() {
        let mut registry = ToolRegistry::default();
        registry.insert(IMAGEMAGICK, "/opt/im/magick");
        assert_eq!(
            registry.require(IMAGEMAGICK).unwrap().path,
            PathBuf::from("/opt/im/magick")
        );
        assert!(registry.require(FFMPEG).is_err());
    }
}
