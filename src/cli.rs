use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "thumbforge")]
#[command(author, version, about = "Generate one thumbnail per album folder")]
pub struct Cli {
    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where album folders come from.
#[derive(Args, Debug, Clone)]
pub struct Locations {
    /// Album folders, one thumbnail each
    pub locations: Vec<PathBuf>,

    /// Library folder whose subfolders are albums
    #[arg(short, long)]
    pub library: Option<PathBuf>,

    /// Directory receiving the thumbnails
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip albums whose thumbnail already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the catalog and generate every thumbnail
    Generate {
        #[command(flatten)]
        locations: Locations,

        /// Maximum concurrent conversions (default: CPU cores)
        #[arg(short = 'j', long)]
        parallelism: Option<usize>,

        /// Target thumbnail height for images
        #[arg(long)]
        height: Option<u32>,
    },

    /// Show the jobs that would run, without converting anything
    Catalog {
        #[command(flatten)]
        locations: Locations,
    },

    /// Check that ffmpeg and ImageMagick are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
