//! Background jobs.
//!
//! Long operations run on the blocking pool behind a concurrency limit. Each
//! job publishes its lifecycle on the event bus and its progress on a `watch`
//! channel, and can be cancelled through its handle or through
//! [`AudioToolkit::cancel_all`](crate::AudioToolkit::cancel_all).

use crate::error::{CoreError, Result};
use core_async::cancel::CancellationToken;
use core_async::sync::{watch, Semaphore};
use core_async::task::{self, JoinHandle};
use core_audio::{AudioFormat, ConversionResult, ConversionStatus, ProgressSink, WaveformResult};
use core_runtime::events::{CoreEvent, EventBus, JobEvent, JobKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which operation a job runs.
pub type Operation = JobKind;

/// Outcome types a job can produce.
pub(crate) trait JobOutput: Send + 'static {
    /// The work stopped early on request without raising an error.
    fn was_cancelled(&self) -> bool {
        false
    }
}

impl JobOutput for ConversionResult {
    fn was_cancelled(&self) -> bool {
        self.status == ConversionStatus::Cancelled
    }
}

impl JobOutput for WaveformResult {}

/// Cancellation tokens of jobs that have not finished yet.
#[derive(Default)]
pub(crate) struct JobRegistry {
    active: Mutex<HashMap<Uuid, (JobKind, CancellationToken)>>,
}

impl JobRegistry {
    fn insert(&self, id: Uuid, kind: JobKind, token: CancellationToken) {
        self.active.lock().insert(id, (kind, token));
    }

    fn remove(&self, id: &Uuid) {
        self.active.lock().remove(id);
    }

    pub(crate) fn len(&self) -> usize {
        self.active.lock().len()
    }

    pub(crate) fn cancel_all(&self) -> usize {
        let active = self.active.lock();
        for (id, (kind, token)) in active.iter() {
            debug!("Cancelling {} job {}", kind, id);
            token.cancel();
        }
        active.len()
    }
}

/// Everything a job needs from the toolkit.
#[derive(Clone)]
pub(crate) struct JobContext {
    pub(crate) limiter: Arc<Semaphore>,
    pub(crate) events: EventBus,
    pub(crate) registry: Arc<JobRegistry>,
}

impl JobContext {
    /// Spawn `work` on the blocking pool once a slot is free.
    ///
    /// Must be called from within a runtime.
    pub(crate) fn spawn<T, F>(
        &self,
        kind: JobKind,
        source: String,
        target_format: Option<AudioFormat>,
        work: F,
    ) -> JobHandle<T>
    where
        T: JobOutput,
        F: FnOnce(&CancellationToken, &dyn ProgressSink) -> core_audio::Result<T> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(0.0_f64);
        self.registry.insert(id, kind, cancel.clone());

        let ctx = self.clone();
        let worker_cancel = cancel.clone();
        let inner = task::spawn(async move {
            let job_id = id.to_string();
            let outcome = ctx
                .run(&job_id, kind, source, worker_cancel, progress_tx, work)
                .await;
            ctx.registry.remove(&id);
            ctx.finish(&job_id, kind, &outcome);
            outcome.map(|(value, _)| value)
        });

        JobHandle {
            id,
            operation: kind,
            cancel,
            progress: progress_rx,
            target_format,
            inner,
        }
    }

    async fn run<T, F>(
        &self,
        job_id: &str,
        kind: JobKind,
        source: String,
        cancel: CancellationToken,
        progress_tx: watch::Sender<f64>,
        work: F,
    ) -> Result<(T, u64)>
    where
        T: JobOutput,
        F: FnOnce(&CancellationToken, &dyn ProgressSink) -> core_audio::Result<T> + Send + 'static,
    {
        let _permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|e| CoreError::JobFailed {
                job_id: job_id.to_string(),
                message: e.to_string(),
            })?;

        info!("Starting {} job {} for {}", kind, job_id, source);
        self.emit(JobEvent::Started {
            job_id: job_id.to_string(),
            kind,
            source,
        });

        let started = Instant::now();
        let events = self.events.clone();
        let progress_id = job_id.to_string();
        let joined = task::spawn_blocking(move || {
            let sink = move |fraction: f64| {
                progress_tx.send_replace(fraction);
                let _ = events.emit(CoreEvent::Job(JobEvent::Progress {
                    job_id: progress_id.clone(),
                    kind,
                    fraction,
                }));
            };
            work(&cancel, &sink)
        })
        .await;

        let value = match joined {
            Ok(result) => result?,
            Err(e) => {
                return Err(CoreError::JobFailed {
                    job_id: job_id.to_string(),
                    message: e.to_string(),
                })
            }
        };
        Ok((value, started.elapsed().as_millis() as u64))
    }

    fn finish<T: JobOutput>(&self, job_id: &str, kind: JobKind, outcome: &Result<(T, u64)>) {
        let job_id = job_id.to_string();
        let event = match outcome {
            Ok((value, _)) if value.was_cancelled() => JobEvent::Cancelled { job_id, kind },
            Ok((_, elapsed_ms)) => {
                info!("{} job {} completed in {}ms", kind, job_id, elapsed_ms);
                JobEvent::Completed {
                    job_id,
                    kind,
                    elapsed_ms: *elapsed_ms,
                }
            }
            Err(e) if e.is_cancelled() => JobEvent::Cancelled { job_id, kind },
            Err(e) => {
                warn!("{} job {} failed: {}", kind, job_id, e);
                JobEvent::Failed {
                    job_id,
                    kind,
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: JobEvent) {
        // No subscribers is not an error for a job.
        let _ = self.events.emit(CoreEvent::Job(event));
    }
}

/// Handle to a running job.
///
/// Dropping the handle does not stop the job; call [`cancel`](Self::cancel).
pub struct JobHandle<T> {
    id: Uuid,
    operation: Operation,
    cancel: CancellationToken,
    progress: watch::Receiver<f64>,
    target_format: Option<AudioFormat>,
    inner: JoinHandle<Result<T>>,
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Request cancellation. Takes effect at the next block boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Latest reported progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        *self.progress.borrow()
    }

    /// Receiver that observes every progress change.
    pub fn progress_receiver(&self) -> watch::Receiver<f64> {
        self.progress.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the job to end.
    pub async fn wait(self) -> Result<T> {
        let job_id = self.id.to_string();
        match self.inner.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::JobFailed {
                job_id,
                message: e.to_string(),
            }),
        }
    }
}

impl JobHandle<ConversionResult> {
    /// Wait for the job and fold any error into a failed result record, the
    /// shape hosts receive for `convertAudio` and `trimAudio`.
    pub async fn into_report(self) -> ConversionResult {
        let format = self.target_format.unwrap_or(AudioFormat::Wav);
        match self.wait().await {
            Ok(result) => result,
            Err(e) => ConversionResult::from_report(format, e.report()),
        }
    }
}

impl<T> std::fmt::Debug for JobHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("operation", &self.operation)
            .field("progress", &self.progress())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
