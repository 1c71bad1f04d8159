//! tf-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for the other tf-* crates,
//! providing the typed job identifier, the media-kind classification used to
//! pick a conversion tool, the error taxonomy for catalog entries, conversion
//! jobs and fatal configuration problems, and the JSON configuration model.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{ConversionError, EnumerationError, Error, Result};
pub use ids::*;
pub use media::*;
