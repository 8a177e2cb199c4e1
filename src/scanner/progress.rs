//! Scan progress tracking and cooperative stop

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::InstrumentOutcome;
use crate::telemetry::{set_gauge, GaugeMetric};

/// Point-in-time copy of a scan's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Counters shared between the scan and whoever is watching it
#[derive(Debug, Default)]
pub struct ScanProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a scan of `total` instruments
    pub fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.skipped.store(0, Ordering::Relaxed);
        set_gauge(GaugeMetric::ScanTotal, total as f64);
        set_gauge(GaugeMetric::ScanCompleted, 0.0);
    }

    pub fn record(&self, outcome: &InstrumentOutcome) {
        match outcome {
            InstrumentOutcome::Failed(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            InstrumentOutcome::Skipped(_) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            InstrumentOutcome::Analyzed(_) | InstrumentOutcome::Filtered(_) => {}
        }
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        set_gauge(GaugeMetric::ScanCompleted, completed as f64);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Handle for stopping a running scan
///
/// Instruments already being fetched finish; the rest are skipped.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
