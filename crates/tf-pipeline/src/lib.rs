//! # tf-pipeline
//!
//! Catalog building and bounded-concurrency execution of thumbnail jobs.
//!
//! This crate provides:
//!
//! - **[`build_catalog`]** -- derives one [`ConversionJob`] per album
//!   directory, reporting every location that could not produce a job.
//! - **[`Converter`]** trait -- the seam between the executor and the
//!   external tools, with [`ToolConverter`] as the production implementation.
//! - **[`PipelineExecutor`]** -- runs every job exactly once with at most `P`
//!   conversions in flight and returns a complete [`PipelineRun`].
//! - **[`ProgressSender`]** -- observer for per-job state transitions.

pub mod catalog;
pub mod converter;
pub mod executor;
pub mod job;
pub mod progress;
pub mod run;

// Re-export key types at the crate root.
pub use catalog::{build_catalog, list_albums, Catalog, CatalogOptions};
pub use converter::{Converter, ToolConverter};
pub use executor::PipelineExecutor;
pub use job::{ConversionJob, JobState};
pub use progress::{JobEvent, ProgressSender};
pub use run::{JobOutcome, PipelineRun, RunReport, RunSummary};
