//! Progress reporting for long-running operations.

use crate::config::ProcessingConfig;
use std::time::{Duration, Instant};

/// Receives progress as a fraction in `[0.0, 1.0]`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

/// Throttles and orders updates before they reach a [`ProgressSink`].
///
/// Reported values never decrease. After the first report, an update is only
/// forwarded once it has advanced by `min_step` and `min_interval` has
/// elapsed. [`ProgressReporter::complete`] always forwards `1.0`.
pub struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
    min_step: f64,
    min_interval: Duration,
    last_value: Option<f64>,
    last_at: Option<Instant>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a dyn ProgressSink, min_step: f64, min_interval: Duration) -> Self {
        Self {
            sink,
            min_step,
            min_interval,
            last_value: None,
            last_at: None,
        }
    }

    pub fn from_config(sink: &'a dyn ProgressSink, config: &ProcessingConfig) -> Self {
        Self::new(sink, config.progress_min_step, config.progress_min_interval)
    }

    /// Reports `done / total`, or nothing when `total` is zero.
    pub fn update_frames(&mut self, done: u64, total: u64) {
        if total > 0 {
            self.update(done as f64 / total as f64);
        }
    }

    pub fn update(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);

        let (last_value, last_at) = match (self.last_value, self.last_at) {
            (Some(value), Some(at)) => (value, at),
            _ => {
                self.emit(fraction);
                return;
            }
        };

        if fraction <= last_value {
            return;
        }
        if fraction - last_value < self.min_step {
            return;
        }
        if last_at.elapsed() < self.min_interval {
            return;
        }

        self.emit(fraction);
    }

    pub fn complete(&mut self) {
        if self.last_value != Some(1.0) {
            self.emit(1.0);
        }
    }

    pub fn last_reported(&self) -> Option<f64> {
        self.last_value
    }

    fn emit(&mut self, fraction: f64) {
        self.last_value = Some(fraction);
        self.last_at = Some(Instant::now());
        self.sink.report(fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<f64>>);

    impl ProgressSink for Recorder {
        fn report(&self, fraction: f64) {
            self.0.lock().unwrap().push(fraction);
        }
    }

    impl Recorder {
        fn values(&self) -> Vec<f64> {
            self.0.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_first_update_always_forwarded() {
        let recorder = Recorder::default();
        let mut reporter = ProgressReporter::new(&recorder, 0.5, Duration::from_secs(60));

        reporter.update(0.001);
        assert_eq!(recorder.values(), vec![0.001]);
    }

    #[test]
    fn test_step_and_interval_throttle() {
        let recorder = Recorder::default();
        let mut reporter = ProgressReporter::new(&recorder, 0.1, Duration::ZERO);

        for i in 0..=100 {
            reporter.update(i as f64 / 100.0);
        }
        reporter.complete();

        let values = recorder.values();
        assert!(values.len() <= 12, "got {:?}", values);
        assert_eq!(values.last(), Some(&1.0));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_interval_suppresses_rapid_updates() {
        let recorder = Recorder::default();
        let mut reporter = ProgressReporter::new(&recorder, 0.0, Duration::from_secs(60));

        reporter.update(0.1);
        reporter.update(0.5);
        reporter.update(0.9);
        reporter.complete();

        assert_eq!(recorder.values(), vec![0.1, 1.0]);
    }

    #[test]
    fn test_never_decreases_and_clamps() {
        let recorder = Recorder::default();
        let mut reporter = ProgressReporter::new(&recorder, 0.0, Duration::ZERO);

        reporter.update(0.6);
        reporter.update(0.4);
        reporter.update(7.0);
        reporter.complete();

        assert_eq!(recorder.values(), vec![0.6, 1.0]);
    }

    #[test]
    fn test_update_frames_ignores_zero_total() {
        let recorder = Recorder::default();
        let mut reporter = ProgressReporter::new(&recorder, 0.0, Duration::ZERO);

        reporter.update_frames(10, 0);
        assert!(recorder.values().is_empty());

        reporter.update_frames(1, 4);
        assert_eq!(reporter.last_reported(), Some(0.25));
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |fraction: f64| seen.lock().unwrap().push(fraction);
        let mut reporter = ProgressReporter::new(&sink, 0.0, Duration::ZERO);

        reporter.update(0.5);
        reporter.complete();
        assert_eq!(*seen.lock().unwrap(), vec![0.5, 1.0]);
    }
}
