//! Progress observations emitted while scanning.

use tracing::info;

use super::source::ScanStats;

/// Which pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Counting,
    CountingTransactions,
    Building,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Counting => "counting items",
            Stage::CountingTransactions => "counting transactions",
            Stage::Building => "building transactions",
        }
    }
}

/// Receives periodic row counts. Not part of any correctness contract.
pub trait ProgressObserver {
    fn on_progress(&mut self, stage: Stage, rows_examined: u64);

    fn on_finish(&mut self, _stage: Stage, _stats: &ScanStats) {}
}

/// Discards all observations.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _stage: Stage, _rows_examined: u64) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, stage: Stage, rows_examined: u64) {
        info!(stage = stage.label(), rows = rows_examined, "scan progress");
    }

    fn on_finish(&mut self, stage: Stage, stats: &ScanStats) {
        info!(
            stage = stage.label(),
            examined = stats.examined,
            accepted = stats.accepted,
            skipped = stats.skipped,
            sampled_out = stats.sampled_out,
            "scan finished"
        );
    }
}
