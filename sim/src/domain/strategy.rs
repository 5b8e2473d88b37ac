//! Bidder strategy taxonomy and identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three competing bidding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Aggressive late bidder: quiet until the final quarter, then bids
    /// whenever its decaying patience lets go.
    Agent,
    /// Incremental bidder: same decision shape as Agent but active from
    /// early in the round; occasionally has no price ceiling at all.
    Ratchet,
    /// One-shot bidder: dormant until just before close, bids once, never
    /// retries.
    Sniper,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Agent,
        StrategyKind::Ratchet,
        StrategyKind::Sniper,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Agent => "agent",
            StrategyKind::Ratchet => "ratchet",
            StrategyKind::Sniper => "sniper",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unique identifier for a bidder within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BidderId(pub String);

impl BidderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BidderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
