//! Infrastructure layer: configuration, the bid trace sink and run
//! statistics.

mod bid_log;
mod config;
mod stats;

pub use bid_log::{BidEntry, BidSink, FileBidLog, MemoryBidLog, SharedSink};
pub use config::{
    BidderBlueprint, ConfigError, RoundScript, SimulationConfig, StrategyMix, StrategyTuning,
};
pub use stats::{RoundReport, RunSummary, StatisticsCollector, SharedStats};
