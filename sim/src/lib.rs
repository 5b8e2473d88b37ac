//! Ascending-price auction round simulator
//!
//! Simulates a sequence of fixed-duration ascending-price auctions, each
//! contested by a population of bidder agents following one of three
//! strategies (aggressive "agent" bidding, incremental "ratchet" bidding,
//! last-moment "sniping"), to study how the strategy mix and timing
//! parameters affect which strategy wins and at what price.
//!
//! Built on the `gavel-engine` discrete-event kernel: every bidder, the
//! population generator, the first-bid watchdog, each round and the
//! orchestrator are cooperative processes sharing one virtual clock, and
//! the right to raise the price is serialized through a single exclusive
//! arbiter.

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export key types at crate root
pub use application::{
    AgentBidder, AuctionOrchestrator, BidOutcome, BiddingArbiter, FirstBidWatchdog,
    PopulationGenerator, RatchetBidder, Round, SniperBidder, run,
};
pub use domain::{BidderId, Patience, RoundBoard, RoundId, RoundStatus, StrategyKind};
pub use infrastructure::{
    BidEntry, BidSink, BidderBlueprint, ConfigError, FileBidLog, MemoryBidLog, RoundReport,
    RoundScript, RunSummary, SharedSink, SimulationConfig, StatisticsCollector, StrategyMix,
    StrategyTuning,
};
