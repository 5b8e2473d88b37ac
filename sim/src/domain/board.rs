//! Shared per-round state.
//!
//! The board is the one piece of shared mutable state in a round: the
//! current price, the winner-of-record and the round status. It is owned by
//! the round and handed out behind an `Arc<RwLock>`; bidders only read it,
//! and all mutation goes through the arbiter or the round itself.

use crate::domain::strategy::{BidderId, StrategyKind};
use gavel_engine::SimTime;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sequential round identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundId(pub u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round lifecycle status. Exactly one terminal state is ever assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundStatus {
    Running,
    Sold,
    Discarded,
}

/// The round's shared state.
#[derive(Debug)]
pub struct RoundBoard {
    pub id: RoundId,
    pub opened_at: SimTime,
    pub closes_at: SimTime,
    /// Latent fair value of the item; bidder valuations are sampled
    /// around it, the board itself never reveals it to bidders.
    pub real_value: f64,
    pub starting_price: f64,
    /// Monotonically non-decreasing within the round.
    pub current_price: f64,
    pub status: RoundStatus,
    /// Holder of the highest accepted bid so far.
    pub leader: Option<(BidderId, StrategyKind)>,
    pub bid_count: u64,
}

pub type SharedBoard = Arc<RwLock<RoundBoard>>;

impl RoundBoard {
    pub fn open(
        id: RoundId,
        opened_at: SimTime,
        closes_at: SimTime,
        real_value: f64,
        starting_price: f64,
    ) -> Self {
        Self {
            id,
            opened_at,
            closes_at,
            real_value,
            starting_price,
            current_price: starting_price,
            status: RoundStatus::Running,
            leader: None,
            bid_count: 0,
        }
    }

    pub fn shared(self) -> SharedBoard {
        Arc::new(RwLock::new(self))
    }

    pub fn is_running(&self) -> bool {
        self.status == RoundStatus::Running
    }

    pub fn duration(&self) -> f64 {
        self.closes_at - self.opened_at
    }

    pub fn leads(&self, bidder: &BidderId) -> bool {
        matches!(&self.leader, Some((id, _)) if id == bidder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_board() {
        let board = RoundBoard::open(
            RoundId(1),
            SimTime::new(10.0),
            SimTime::new(70.0),
            1000.0,
            800.0,
        );
        assert!(board.is_running());
        assert_eq!(board.current_price, 800.0);
        assert_eq!(board.duration(), 60.0);
        assert_eq!(board.bid_count, 0);
        assert!(board.leader.is_none());
    }

    #[test]
    fn test_leads() {
        let mut board = RoundBoard::open(
            RoundId(1),
            SimTime::ZERO,
            SimTime::new(60.0),
            1000.0,
            800.0,
        );
        let me = BidderId::new("agent-1-0");
        assert!(!board.leads(&me));
        board.leader = Some((me.clone(), StrategyKind::Agent));
        assert!(board.leads(&me));
        assert!(!board.leads(&BidderId::new("sniper-1-2")));
    }
}
