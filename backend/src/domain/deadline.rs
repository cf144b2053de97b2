//! Per-call time budgets for cache operations.
//!
//! Every cache call receives an explicit [`Deadline`] rather than inheriting
//! the caller's cancellation scope. The backfill path builds a fresh deadline
//! inside its detached task, so a request that has already responded (or was
//! dropped) does not shorten the write's budget.

use std::time::Duration;

use tokio::time::Instant;

/// Point in time by which a cache call must complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Instant at which the deadline expires.
    pub const fn instant(&self) -> Instant {
        self.at
    }

    /// Budget the deadline was created with.
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// True once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}
