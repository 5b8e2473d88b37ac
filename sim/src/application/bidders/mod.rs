//! Bidder strategy processes
//!
//! Each strategy is an engine process with the same overall shape:
//! Deciding → (patience-decay sleep) → wants to bid → (reaction/network
//! delay) → contend for the arbiter → bid accepted or abandoned →
//! Deciding or Terminated. They differ in timing and in the patience
//! curve:
//!
//! - **AgentBidder**: quiet until roughly three quarters of the round,
//!   then bids whenever its decaying patience lets go
//! - **RatchetBidder**: same shape, eligible much earlier, occasionally
//!   has no valuation ceiling
//! - **SniperBidder**: sleeps until just before close, bids once, never
//!   retries

mod agent;
mod ratchet;
mod sniper;

pub use agent::AgentBidder;
pub use ratchet::RatchetBidder;
pub use sniper::SniperBidder;

use crate::domain::{BidderId, SharedBoard};
use gavel_engine::SimTime;

/// Where a bidder is inside its decision/submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BidPhase {
    /// Sleeping between decision ticks.
    Deciding,
    /// Decided to bid; waiting out the reaction/network delay.
    Reacting,
    /// Queued on the arbiter slot.
    AwaitingGrant,
    /// Holding the slot while the bid is processed.
    Submitting,
}

/// Read-only snapshot a bidder takes of its round's board.
pub(crate) struct BoardView {
    pub price: f64,
    pub opened_at: SimTime,
    pub closes_at: SimTime,
    pub leading: bool,
}

/// Snapshot the board if the round is still open at `now`; `None` means
/// the bidder should terminate.
pub(crate) fn open_view(board: &SharedBoard, bidder: &BidderId, now: SimTime) -> Option<BoardView> {
    let b = board.read();
    if !b.is_running() || now >= b.closes_at {
        return None;
    }
    Some(BoardView {
        price: b.current_price,
        opened_at: b.opened_at,
        closes_at: b.closes_at,
        leading: b.leads(bidder),
    })
}
