//! Error types for thumbforge.
//!
//! Failures fall into three tiers:
//!
//! - [`EnumerationError`]: one catalog location could not produce a job.
//!   Recorded per entry; the rest of the catalog is unaffected.
//! - [`ConversionError`]: one job's external tool run failed. Recorded as that
//!   job's failed outcome; sibling jobs keep running.
//! - [`Error`]: a fatal problem (bad configuration) that stops a run before
//!   any job is dispatched.

use std::path::PathBuf;
use std::time::Duration;

/// Fatal error type for operations that cannot be reported per entry or per job.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run or the configuration file is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single catalog location produced no job.
#[derive(Debug, thiserror::Error)]
pub enum EnumerationError {
    #[error("{}: location does not exist", location.display())]
    Missing { location: PathBuf },

    #[error("{}: location is not a directory", location.display())]
    NotADirectory { location: PathBuf },

    #[error("{}: cannot read location: {source}", location.display())]
    Unreadable {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: no eligible media file", location.display())]
    NoEligibleArtifact { location: PathBuf },

    #[error("{}: unrecognized media extension on {}", location.display(), file.display())]
    UnrecognizedExtension { location: PathBuf, file: PathBuf },

    #[error(
        "{}: destination {} is already claimed by another location",
        location.display(),
        destination.display()
    )]
    DuplicateDestination {
        location: PathBuf,
        destination: PathBuf,
    },
}

impl EnumerationError {
    /// The location this error belongs to.
    pub fn location(&self) -> &std::path::Path {
        match self {
            Self::Missing { location }
            | Self::NotADirectory { location }
            | Self::Unreadable { location, .. }
            | Self::NoEligibleArtifact { location }
            | Self::UnrecognizedExtension { location, .. }
            | Self::DuplicateDestination { location, .. } => location,
        }
    }
}

/// Why a single conversion job failed.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The job's source artifact could not be read.
    #[error("source {} is not readable: {source}", path.display())]
    SourceMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external tool is not installed or not on `PATH`.
    #[error("{tool} not found; is it installed and in PATH?")]
    ToolNotFound { tool: String },

    /// The external tool could not be started.
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool exited unsuccessfully.
    #[error("{tool} exited with {}: {stderr}", exit_code_display(*code))]
    Exit {
        tool: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Trimmed diagnostic output.
        stderr: String,
    },

    /// The external tool exceeded its deadline and was killed.
    #[error("{tool} timed out after {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    /// The destination could not be prepared or written.
    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool reported success but produced no usable file.
    #[error("invalid output {}: {reason}", path.display())]
    InvalidOutput { path: PathBuf, reason: String },

    /// The run was cancelled before or during this job.
    #[error("cancelled")]
    Cancelled,

    /// The task running this job panicked.
    #[error("conversion task panicked: {message}")]
    Panicked { message: String },
}

fn exit_code_display(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl ConversionError {
    /// Whether this failure is a filesystem problem rather than a tool problem.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::SourceMissing { .. } | Self::Output { .. } | Self::InvalidOutput { .. }
        )
    }

    /// Whether this failure came from cancellation rather than the job itself.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_display() {
        let err = Error::configuration("parallelism must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: parallelism must be at least 1"
        );
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn enumeration_location() {
        let err = EnumerationError::UnrecognizedExtension {
            location: PathBuf::from("/albums/notes"),
            file: PathBuf::from("/albums/notes/readme.txt"),
        };
        assert_eq!(err.location(), std::path::Path::new("/albums/notes"));
        assert_eq!(
            err.to_string(),
            "/albums/notes: unrecognized media extension on /albums/notes/readme.txt"
        );
    }

    #[test]
    fn exit_display() {
        let err = ConversionError::Exit {
            tool: "ffmpeg".into(),
            code: Some(1),
            stderr: "Invalid data found".into(),
        };
        assert_eq!(
            err.to_string(),
            "ffmpeg exited with status 1: Invalid data found"
        );

        let err = ConversionError::Exit {
            tool: "magick".into(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
    }

    #[test]
    fn io_classification() {
        let missing = ConversionError::SourceMissing {
            path: PathBuf::from("missing.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(missing.is_io());
        assert!(!ConversionError::ToolNotFound { tool: "ffmpeg".into() }.is_io());
        assert!(ConversionError::Cancelled.is_cancelled());
        assert!(!ConversionError::Cancelled.is_io());
    }
}
