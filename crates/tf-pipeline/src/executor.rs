//! Bounded pipeline executor: runs every job exactly once with at most `P`
//! conversions in flight.
//!
//! Dispatch is sequential in the caller's task. Before each job is spawned
//! the dispatcher takes one permit from a counting semaphore, so once `P`
//! permits are out it suspends until a running conversion finishes. Each
//! spawned task drops its permit the moment the conversion resolves, before
//! any bookkeeping, then hands `(slot, outcome)` back through a `JoinSet`.
//! Draining the `JoinSet` is the completion barrier; each slot of the outcome
//! arena is written exactly once.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use tf_core::{ConversionError, Error, RunId};

use crate::converter::Converter;
use crate::job::{ConversionJob, JobState};
use crate::progress::{JobEvent, ProgressSender};
use crate::run::{JobOutcome, PipelineRun};

/// Runs a catalog of jobs through a [`Converter`] under a permit pool.
pub struct PipelineExecutor {
    converter: Arc<dyn Converter>,
    parallelism: usize,
    cancellation: CancellationToken,
    progress: Arc<ProgressSender>,
}

impl PipelineExecutor {
    /// Create an executor sized to the number of CPU cores.
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self {
            converter,
            parallelism: num_cpus::get(),
            cancellation: CancellationToken::new(),
            progress: Arc::new(ProgressSender::noop()),
        }
    }

    /// Builder: set the permit pool size. Zero is rejected by [`run`](Self::run).
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Builder: attach a cancellation token.
    ///
    /// Once cancelled, undispatched jobs are recorded as cancelled without
    /// running and in-flight conversions are dropped, killing their process.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builder: attach a progress sender.
    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    /// Execute every job and return once each has a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] before anything is dispatched if the
    /// parallelism is zero or two jobs share an id. Job failures are never
    /// errors here; they are recorded in the returned run.
    pub async fn run(&self, jobs: Vec<ConversionJob>) -> tf_core::Result<PipelineRun> {
        if self.parallelism == 0 {
            return Err(Error::configuration("parallelism must be at least 1"));
        }

        let mut seen = HashSet::with_capacity(jobs.len());
        for job in &jobs {
            if !seen.insert(job.id()) {
                return Err(Error::configuration(format!(
                    "job {} appears more than once in the catalog",
                    job.id()
                )));
            }
        }

        let run_id = RunId::new();
        let started_at = Utc::now();
        let total = jobs.len();
        let jobs: Vec<Arc<ConversionJob>> = jobs.into_iter().map(Arc::new).collect();

        tracing::info!(
            run_id = %run_id,
            jobs = total,
            parallelism = self.parallelism,
            "Starting pipeline run"
        );

        for job in &jobs {
            self.progress.send(JobEvent {
                job: job.id(),
                state: JobState::Pending,
                completed: 0,
                total,
            });
        }

        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks: JoinSet<(usize, JobOutcome)> = JoinSet::new();
        let mut dispatched = 0;

        for (index, job) in jobs.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => {
                    tracing::info!(run_id = %run_id, dispatched, "Run cancelled; skipping remaining jobs");
                    break;
                }
                permit = semaphore.clone().acquire_owned() => permit
                    .map_err(|_| Error::Internal("permit pool closed during dispatch".into()))?,
            };

            let span = tracing::info_span!(
                "job",
                job_id = %job.id(),
                album = %job.label(),
                kind = %job.kind(),
            );

            let converter = self.converter.clone();
            let cancellation = self.cancellation.clone();
            let progress = self.progress.clone();
            let completed = completed.clone();
            let job = job.clone();

            tasks.spawn(
                async move {
                    progress.send(JobEvent {
                        job: job.id(),
                        state: JobState::Running,
                        completed: completed.load(Ordering::SeqCst),
                        total,
                    });
                    tracing::debug!(source = %job.source().display(), "Running");

                    let started = Instant::now();
                    let result = {
                        let conversion = AssertUnwindSafe(converter.convert(&job)).catch_unwind();
                        tokio::select! {
                            r = conversion => r.unwrap_or_else(|panic| {
                                Err(ConversionError::Panicked {
                                    message: panic_message(panic.as_ref()),
                                })
                            }),
                            _ = cancellation.cancelled() => Err(ConversionError::Cancelled),
                        }
                    };
                    // The permit covers the conversion only.
                    drop(permit);
                    let elapsed = started.elapsed();

                    let state = match &result {
                        Ok(()) => {
                            tracing::info!(
                                destination = %job.destination().display(),
                                elapsed_ms = elapsed.as_millis() as u64,
                                "Thumbnail written"
                            );
                            JobState::Succeeded
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Conversion failed");
                            JobState::Failed
                        }
                    };

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress.send(JobEvent {
                        job: job.id(),
                        state,
                        completed: done,
                        total,
                    });

                    (
                        index,
                        JobOutcome {
                            job,
                            error: result.err(),
                            elapsed,
                        },
                    )
                }
                .instrument(span),
            );
            dispatched += 1;
        }

        // Completion barrier: one slot per job, each written once.
        let mut slots: Vec<Option<JobOutcome>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    debug_assert!(slots[index].is_none(), "outcome slot {index} written twice");
                    slots[index] = Some(outcome);
                }
                Err(e) => tracing::error!(run_id = %run_id, "Conversion task failed to join: {e}"),
            }
        }

        let mut outcomes = HashMap::with_capacity(total);
        for (index, (slot, job)) in slots.into_iter().zip(&jobs).enumerate() {
            let outcome = match slot {
                Some(outcome) => outcome,
                None => {
                    let error = if index < dispatched {
                        ConversionError::Panicked {
                            message: "task ended without reporting".into(),
                        }
                    } else {
                        ConversionError::Cancelled
                    };
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    self.progress.send(JobEvent {
                        job: job.id(),
                        state: JobState::Failed,
                        completed: done,
                        total,
                    });
                    JobOutcome {
                        job: job.clone(),
                        error: Some(error),
                        elapsed: Duration::ZERO,
                    }
                }
            };
            outcomes.insert(job.id(), outcome);
        }

        let run = PipelineRun {
            id: run_id,
            jobs,
            outcomes,
            parallelism: self.parallelism,
            started_at,
            finished_at: Utc::now(),
        };

        let summary = run.summary();
        tracing::info!(
            run_id = %run_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Pipeline run finished"
        );

        Ok(run)
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
