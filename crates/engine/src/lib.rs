//! Gavel discrete-event engine
//!
//! A cooperative, single-threaded virtual-time simulation kernel. All
//! concurrency is multiple suspended processes sharing one logical clock,
//! resumed in time order; at tied timestamps, control processes outrank
//! ordinary ones.
//!
//! The kernel provides:
//! - virtual time ([`SimTime`]) and an event calendar
//! - process suspension and timed or explicit reactivation ([`Simulation`],
//!   [`Context`])
//! - an exclusive-resource primitive with a FIFO wait queue and
//!   wake-on-release grants
//! - seeded random-variate sampling ([`RandomSource`])
//! - a categorical outcome sink ([`Tally`])

mod process;
mod random;
mod scheduler;
mod tally;
mod time;

pub use process::{Priority, Process, ProcessId, Wake};
pub use random::RandomSource;
pub use scheduler::{Context, ResourceId, Simulation};
pub use tally::Tally;
pub use time::SimTime;
