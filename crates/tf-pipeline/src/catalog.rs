//! Job catalog builder.
//!
//! Turns a list of album directories into conversion jobs. Each directory
//! contributes at most one job, built from its first (by file name) visible
//! regular file. Directories that cannot produce a job are reported in
//! [`Catalog::errors`] or [`Catalog::up_to_date`], never dropped silently.
//!
//! Building a catalog only reads the filesystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tf_core::config::Config;
use tf_core::{EnumerationError, MediaKind};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::job::ConversionJob;

/// How catalog entries map to destination paths.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Directory receiving every thumbnail.
    pub output_dir: PathBuf,
    /// Thumbnail extension (selects the encoder).
    pub format: String,
    /// Appended to the album name.
    pub suffix: String,
    /// Report albums whose thumbnail already exists instead of building a job.
    pub skip_existing: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CatalogOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.thumbnails.output_dir.clone(),
            format: config.thumbnails.format.clone(),
            suffix: config.thumbnails.suffix.clone(),
            skip_existing: config.pipeline.skip_existing,
        }
    }

    /// Destination for an album: `<output_dir>/<album><suffix>.<format>`.
    pub fn destination_for(&self, album: &str) -> PathBuf {
        self.output_dir
            .join(format!("{album}{}.{}", self.suffix, self.format))
    }
}

/// Result of scanning a set of locations.
#[derive(Debug, Default)]
pub struct Catalog {
    /// One job per location that produced one, in input order.
    pub jobs: Vec<ConversionJob>,
    /// Locations that could not produce a job.
    pub errors: Vec<EnumerationError>,
    /// Locations skipped because their thumbnail already exists.
    pub up_to_date: Vec<PathBuf>,
}

/// Build one conversion job per location.
///
/// Never fails as a whole: every location ends up as a job, an entry in
/// [`Catalog::errors`], or an entry in [`Catalog::up_to_date`].
pub fn build_catalog(locations: &[PathBuf], options: &CatalogOptions) -> Catalog {
    let mut catalog = Catalog::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for location in locations {
        match catalog_entry(location, options) {
            Ok(job) => {
                if !claimed.insert(job.destination().to_path_buf()) {
                    warn!(location = %location.display(), "duplicate thumbnail destination");
                    catalog.errors.push(EnumerationError::DuplicateDestination {
                        location: location.clone(),
                        destination: job.destination().to_path_buf(),
                    });
                } else if options.skip_existing && is_nonempty_file(job.destination()) {
                    debug!(location = %location.display(), "thumbnail already exists");
                    catalog.up_to_date.push(location.clone());
                } else {
                    debug!(
                        album = job.label(),
                        kind = %job.kind(),
                        source = %job.source().display(),
                        "catalogued"
                    );
                    catalog.jobs.push(job);
                }
            }
            Err(e) => {
                warn!("Skipping location: {e}");
                catalog.errors.push(e);
            }
        }
    }

    info!(
        jobs = catalog.jobs.len(),
        errors = catalog.errors.len(),
        up_to_date = catalog.up_to_date.len(),
        "Catalog built from {} locations",
        locations.len()
    );

    catalog
}

fn catalog_entry(
    location: &Path,
    options: &CatalogOptions,
) -> Result<ConversionJob, EnumerationError> {
    let meta = std::fs::metadata(location).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EnumerationError::Missing {
                location: location.to_path_buf(),
            }
        } else {
            EnumerationError::Unreadable {
                location: location.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !meta.is_dir() {
        return Err(EnumerationError::NotADirectory {
            location: location.to_path_buf(),
        });
    }

    let source = first_artifact(location)?.ok_or_else(|| EnumerationError::NoEligibleArtifact {
        location: location.to_path_buf(),
    })?;

    let kind = MediaKind::from_path(&source).ok_or_else(|| {
        EnumerationError::UnrecognizedExtension {
            location: location.to_path_buf(),
            file: source.clone(),
        }
    })?;

    let album = album_name(location);
    let destination = options.destination_for(&album);

    Ok(ConversionJob::new(kind, source, destination).with_album(album))
}

/// First visible regular file in `location`, ordered by file name.
///
/// Scans the same way as [`list_albums`]: one level deep, sorted, following
/// symlinks.
fn first_artifact(location: &Path) -> Result<Option<PathBuf>, EnumerationError> {
    for entry in WalkDir::new(location)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| EnumerationError::Unreadable {
            location: location.to_path_buf(),
            source: std::io::Error::from(e),
        })?;
        if entry.file_type().is_file() && !is_hidden(entry.path()) {
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}

/// Name used for an album's thumbnail: the directory's last component.
fn album_name(location: &Path) -> String {
    if let Some(name) = location.file_name() {
        return name.to_string_lossy().to_string();
    }

    // `.` and `..` have no name of their own.
    std::fs::canonicalize(location)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "root".to_string())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn is_nonempty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Expand a library directory into its album directories.
///
/// Returns the immediate, non-hidden subdirectories of `root`, sorted by name.
pub fn list_albums(root: &Path) -> tf_core::Result<Vec<PathBuf>> {
    let mut albums = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| tf_core::Error::from(std::io::Error::from(e)))?;
        if entry.file_type().is_dir() && !is_hidden(entry.path()) {
            albums.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), albums = albums.len(), "Listed albums");
    Ok(albums)
}
