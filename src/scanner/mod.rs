//! Market scanner module
//!
//! Repeats the streak analysis across a universe of instruments, keeps the
//! ones whose next-period odds clear a threshold and ranks them by market cap.

mod engine;
mod filter;
mod progress;
mod types;

pub use engine::MarketScanner;
pub use filter::{FilterResult, RejectReason, ThresholdFilter};
pub use progress::{ProgressSnapshot, ScanProgress, StopHandle};
pub use types::{
    FailureReason, FilteredOut, InstrumentOutcome, QualifiedSides, ScanConfig, ScanError,
    ScanFailure, ScanMode, ScanReport, ScanResult,
};
