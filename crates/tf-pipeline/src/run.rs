//! Outcomes of a pipeline run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tf_core::{ConversionError, JobId, MediaKind, RunId};

use crate::job::ConversionJob;

/// Terminal result of one job.
#[derive(Debug)]
pub struct JobOutcome {
    /// The job this outcome belongs to.
    pub job: Arc<ConversionJob>,
    /// `None` on success.
    pub error: Option<ConversionError>,
    /// Time from dispatch to termination; zero if the job never ran.
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failed jobs whose failure was a cancellation.
    pub cancelled: usize,
}

/// A complete batch: every job plus exactly one outcome per job.
#[derive(Debug)]
pub struct PipelineRun {
    pub id: RunId,
    /// All jobs, in dispatch order.
    pub jobs: Vec<Arc<ConversionJob>>,
    /// One outcome per job, keyed by job id.
    pub outcomes: HashMap<JobId, JobOutcome>,
    /// Permit pool size the run used.
    pub parallelism: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineRun {
    /// Whether every job has exactly one outcome.
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.jobs.len()
            && self.jobs.iter().all(|j| self.outcomes.contains_key(&j.id()))
    }

    pub fn outcome(&self, id: JobId) -> Option<&JobOutcome> {
        self.outcomes.get(&id)
    }

    /// Outcomes in dispatch order.
    pub fn outcomes_in_order(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs.iter().filter_map(|j| self.outcomes.get(&j.id()))
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes_in_order().filter(|o| o.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes_in_order().filter(|o| !o.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.is_complete() && self.outcomes.values().all(JobOutcome::succeeded)
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.jobs.len(),
            ..RunSummary::default()
        };
        for outcome in self.outcomes.values() {
            match &outcome.error {
                None => summary.succeeded += 1,
                Some(e) => {
                    summary.failed += 1;
                    if e.is_cancelled() {
                        summary.cancelled += 1;
                    }
                }
            }
        }
        summary
    }

    /// Serializable view of the run, jobs in dispatch order.
    pub fn report(&self) -> RunReport {
        RunReport {
            run_id: self.id,
            parallelism: self.parallelism,
            started_at: self.started_at,
            finished_at: self.finished_at,
            summary: self.summary(),
            jobs: self
                .outcomes_in_order()
                .map(|o| JobReport {
                    job_id: o.job.id(),
                    album: o.job.album().map(str::to_string),
                    kind: o.job.kind(),
                    source: o.job.source().display().to_string(),
                    destination: o.job.destination().display().to_string(),
                    succeeded: o.succeeded(),
                    error: o.error.as_ref().map(|e| e.to_string()),
                    elapsed_ms: o.elapsed.as_millis() as u64,
                })
                .collect(),
        }
    }
}

/// JSON-friendly run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub parallelism: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub jobs: Vec<JobReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    pub kind: MediaKind,
    pub source: String,
    pub destination: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}
