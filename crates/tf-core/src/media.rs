//! Media classification by file extension.
//!
//! [`MediaKind`] decides which external tool turns a source artifact into a
//! thumbnail. It serializes in lowercase and implements `Display` manually for
//! consistent string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Supported still-image extensions.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "heic", "avif",
];

/// Supported video extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "avi", "webm", "wmv", "flv", "ts", "3gp",
];

/// Kind of source artifact a job converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A still image, resized and re-encoded.
    Image,
    /// A video, from which a single frame is extracted.
    Video,
}

impl MediaKind {
    /// Classify an extension (without the leading dot), case-insensitively.
    ///
    /// ```
    /// use tf_core::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Image));
    /// assert_eq!(MediaKind::from_extension("mp4"), Some(MediaKind::Video));
    /// assert_eq!(MediaKind::from_extension("txt"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}
