mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Locations};
use serde::Serialize;
use tf_core::config::Config;
use tf_core::EnumerationError;
use tf_pipeline::{
    build_catalog, list_albums, Catalog, CatalogOptions, PipelineExecutor, RunReport,
    ToolConverter,
};
use tokio_util::sync::CancellationToken;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "thumbforge=debug,tf_pipeline=debug,tf_av=debug,tf_core=debug".to_string()
        } else {
            "thumbforge=info,tf_pipeline=info,tf_av=info,tf_core=info".to_string()
        }
    });

    // Logs go to stderr so `--json` output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            locations,
            parallelism,
            height,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_overrides(&mut config, &locations);
            if parallelism.is_some() {
                config.pipeline.parallelism = parallelism;
            }
            if let Some(height) = height {
                config.thumbnails.height = height;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(generate(&locations, config))
        }
        Commands::Catalog { locations } => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_overrides(&mut config, &locations);
            show_catalog(&locations, &config)
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("thumbforge {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// An explicit `--config` must load cleanly; without one the defaults apply.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn apply_overrides(config: &mut Config, locations: &Locations) {
    if let Some(ref dir) = locations.output_dir {
        config.thumbnails.output_dir = dir.clone();
    }
    if locations.skip_existing {
        config.pipeline.skip_existing = true;
    }
}

/// Album folders named on the command line plus those under `--library`.
fn resolve_locations(locations: &Locations) -> Result<Vec<PathBuf>> {
    let mut resolved = locations.locations.clone();

    if let Some(ref library) = locations.library {
        let albums = list_albums(library)
            .with_context(|| format!("Failed to list albums in {}", library.display()))?;
        tracing::info!("Found {} albums in {}", albums.len(), library.display());
        resolved.extend(albums);
    }

    if resolved.is_empty() {
        anyhow::bail!("No album folders given; pass folders or --library <DIR>");
    }

    Ok(resolved)
}

#[derive(Serialize)]
struct CatalogEntryReport {
    album: Option<String>,
    kind: tf_core::MediaKind,
    source: String,
    destination: String,
}

#[derive(Serialize)]
struct EntryErrorReport {
    location: String,
    error: String,
}

impl From<&EnumerationError> for EntryErrorReport {
    fn from(err: &EnumerationError) -> Self {
        Self {
            location: err.location().display().to_string(),
            error: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CatalogReport {
    jobs: Vec<CatalogEntryReport>,
    errors: Vec<EntryErrorReport>,
    up_to_date: Vec<String>,
}

impl From<&Catalog> for CatalogReport {
    fn from(catalog: &Catalog) -> Self {
        Self {
            jobs: catalog
                .jobs
                .iter()
                .map(|j| CatalogEntryReport {
                    album: j.album().map(str::to_string),
                    kind: j.kind(),
                    source: j.source().display().to_string(),
                    destination: j.destination().display().to_string(),
                })
                .collect(),
            errors: catalog.errors.iter().map(EntryErrorReport::from).collect(),
            up_to_date: catalog
                .up_to_date
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct GenerateReport {
    catalog_errors: Vec<EntryErrorReport>,
    up_to_date: Vec<String>,
    run: RunReport,
}

fn print_catalog_problems(catalog: &Catalog) {
    for err in &catalog.errors {
        println!("  skipped: {err}");
    }
    for location in &catalog.up_to_date {
        println!("  up to date: {}", location.display());
    }
}

fn show_catalog(locations: &Locations, config: &Config) -> Result<ExitCode> {
    let paths = resolve_locations(locations)?;
    let catalog = build_catalog(&paths, &CatalogOptions::from_config(config));

    if locations.json {
        println!("{}", serde_json::to_string_pretty(&CatalogReport::from(&catalog))?);
    } else {
        println!("Jobs: {}", catalog.jobs.len());
        for job in &catalog.jobs {
            println!(
                "  {} [{}] {} -> {}",
                job.label(),
                job.kind(),
                job.source().display(),
                job.destination().display()
            );
        }
        print_catalog_problems(&catalog);
    }

    Ok(if catalog.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn generate(locations: &Locations, config: Config) -> Result<ExitCode> {
    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }

    let paths = resolve_locations(locations)?;
    let mut catalog = build_catalog(&paths, &CatalogOptions::from_config(&config));
    let jobs = std::mem::take(&mut catalog.jobs);

    let converter = ToolConverter::from_config(&config);
    let cancel = CancellationToken::new();
    let executor = PipelineExecutor::new(Arc::new(converter))
        .with_parallelism(config.pipeline.resolve_parallelism())
        .with_cancellation(cancel.clone());

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; cancelling remaining conversions");
            cancel.cancel();
        }
    });

    let run = executor.run(jobs).await;
    ctrl_c.abort();
    let run = run?;

    if locations.json {
        let report = GenerateReport {
            catalog_errors: catalog.errors.iter().map(EntryErrorReport::from).collect(),
            up_to_date: catalog
                .up_to_date
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            run: run.report(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in run.succeeded() {
            println!(
                "  ok      {} -> {}",
                outcome.job.label(),
                outcome.job.destination().display()
            );
        }
        for outcome in run.failed() {
            if let Some(ref e) = outcome.error {
                println!("  failed  {}: {e}", outcome.job.label());
            }
        }
        print_catalog_problems(&catalog);

        let summary = run.summary();
        println!(
            "\n{} succeeded, {} failed, {} skipped, {} up to date",
            summary.succeeded,
            summary.failed,
            catalog.errors.len(),
            catalog.up_to_date.len()
        );
    }

    Ok(if run.all_succeeded() && catalog.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check_tools(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let registry = tf_av::ToolRegistry::discover(&config.tools);

    println!("Checking external tools...\n");
    for info in registry.check_all() {
        if info.available {
            println!(
                "  {:<8} available  {}",
                info.name,
                info.version.as_deref().unwrap_or("(unknown version)")
            );
            if let Some(path) = info.path {
                println!("  {:<8} path       {}", "", path.display());
            }
        } else {
            println!("  {:<8} NOT FOUND", info.name);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn validate_config(config_path: Option<&Path>) -> Result<ExitCode> {
    let Some(path) = config_path else {
        anyhow::bail!("No config file specified");
    };

    let config = load_config(Some(path))?;

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid: {}", path.display());
    } else {
        println!("Configuration loaded with warnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
