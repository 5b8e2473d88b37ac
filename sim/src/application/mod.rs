//! Application layer: the auction processes.
//!
//! Contains:
//! - **arbiter**: the exclusive bid-submission critical section
//! - **bidders**: the three bidder strategy state machines
//! - **population**: staggered bidder population generation
//! - **watchdog**: the first-bid grace monitor
//! - **round**: one auction's lifecycle and settlement
//! - **orchestrator**: the sequential round loop and run entry point

pub mod arbiter;
pub mod bidders;
pub mod orchestrator;
pub mod population;
pub mod round;
pub mod watchdog;

pub use arbiter::{BidOutcome, BiddingArbiter};
pub use bidders::{AgentBidder, RatchetBidder, SniperBidder};
pub use orchestrator::{AuctionOrchestrator, run};
pub use population::PopulationGenerator;
pub use round::{Round, Roster};
pub use watchdog::FirstBidWatchdog;
