//! Process model
//!
//! A process is a resumable state machine owned by the [`Simulation`]. Each
//! resume runs to completion at a single virtual instant; a process that
//! neither reschedules itself, nor waits on a resource, nor passivates is
//! finished and is dropped by the scheduler.
//!
//! [`Simulation`]: crate::Simulation

use crate::scheduler::{Context, ResourceId};
use std::fmt;

/// Unique identifier for a spawned process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub(crate) u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Dispatch rank at tied timestamps.
///
/// Control processes (round bookkeeping, orchestration, watchdogs) run
/// before ordinary bidder processes scheduled at the same instant, so a
/// round is settled before any bidder waking at the closing time gets to
/// act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Control,
    Bidder,
}

/// Why a process was resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A timed wait elapsed (or the process was explicitly activated).
    Timer,
    /// The process reached the front of a resource wait queue and now holds
    /// the resource.
    Granted(ResourceId),
}

/// A resumable simulation process.
pub trait Process {
    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_>);
}
