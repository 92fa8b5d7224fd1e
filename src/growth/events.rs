//! Growth outcomes reported to the host

use serde::{Deserialize, Serialize};

use crate::catalog::TemplateId;

use super::branch::BranchId;

/// Scheduler state of a plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantState {
    /// Setup is incomplete. Nothing grows until a restart succeeds.
    MissingData,
    Growing,
    /// Idle. Only an explicit restart grows the plant again.
    Done,
}

/// Why growth finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Species branch limit reached
    MaxBranches,
    /// No branch has an open socket left
    NoOpenSockets,
    /// Every branch type is at its quota or count limit
    NoGrowableTypes,
    /// Too many placement attempts failed in a row
    Blocked,
}

impl StopReason {
    /// Whether the plant finished normally, as opposed to getting stuck.
    pub fn is_fully_grown(self) -> bool {
        self != StopReason::Blocked
    }
}

/// Queued notification, drained by the host with `Plant::drain_events`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GrowthEvent {
    Started,
    BranchAdded {
        branch: BranchId,
        template: TemplateId,
        depth: u32,
    },
    Completed {
        reason: StopReason,
    },
}

/// Attempt counters of the current growth run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthStats {
    pub grow_succeeded: u64,
    pub grow_failed: u64,
    pub failed_attempts_since_success: u32,
}

impl GrowthStats {
    pub fn record_success(&mut self) {
        self.grow_succeeded += 1;
        self.failed_attempts_since_success = 0;
    }

    pub fn record_failure(&mut self) {
        self.grow_failed += 1;
        self.failed_attempts_since_success += 1;
    }

    pub fn attempts(&self) -> u64 {
        self.grow_succeeded + self.grow_failed
    }

    /// How hard the plant was to grow, in `[0, 1]`.
    ///
    /// Zero when every attempt succeeded, one when the success rate is as
    /// low as one in `max_failed_attempts` (or nothing succeeded).
    pub fn difficulty(&self, max_failed_attempts: u32) -> f32 {
        let attempts = self.attempts();
        if attempts == 0 {
            return 0.0;
        }
        if self.grow_succeeded == 0 {
            return 1.0;
        }
        if max_failed_attempts <= 1 {
            return if self.grow_failed > 0 { 1.0 } else { 0.0 };
        }
        let rate = self.grow_succeeded as f64 / attempts as f64;
        let scale = (max_failed_attempts as f64).log10();
        (-rate.log10() / scale).clamp(0.0, 1.0) as f32
    }
}
