//! # tf-av
//!
//! External tool management and thumbnail generation for the thumbforge
//! pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ImageMagick.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Tool profiles** ([`ThumbnailProfile`]) -- the fixed argument templates
//!   for still images and videos.
//! - **Staged output** ([`StagedOutput`]) -- temp file beside the destination
//!   that is validated and renamed into place.
//! - **[`generate_thumbnail`]** -- one complete conversion of a source
//!   artifact into a thumbnail file.

pub mod command;
pub mod profile;
pub mod staging;
pub mod thumbnail;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use profile::ThumbnailProfile;
pub use staging::StagedOutput;
pub use thumbnail::generate_thumbnail;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry, FFMPEG, IMAGEMAGICK};
