//! Bid submission arbiter
//!
//! The arbiter pairs the engine's exclusive slot with the bid critical
//! section. A bidder first acquires the slot (queueing FIFO if it is
//! held), then calls [`BiddingArbiter::submit`], which re-validates
//! against the live board, since the price may have moved while the
//! bidder waited, and applies at most one increment.
//!
//! Validity rule: a bid is accepted only if price plus increment is
//! strictly below the bidder's valuation. Rejections are normal branches,
//! not errors.
//!
//! The arbiter persists across rounds and keeps no per-round state; the
//! board is passed per call.

use crate::domain::{BidderId, RoundStatus, SharedBoard, StrategyKind};
use crate::infrastructure::{BidEntry, SharedSink};
use gavel_engine::{ResourceId, SimTime};

/// Result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BidOutcome {
    /// The increment was applied; `price` is the new current price.
    Accepted { price: f64 },
    /// Price plus increment reached the bidder's valuation. Since the
    /// price never falls, the bidder can never bid in this round again.
    PricedOut,
    /// The round is no longer running (settled or past its end time).
    RoundClosed,
}

pub struct BiddingArbiter {
    slot: ResourceId,
    sink: SharedSink,
    increment_ratio: f64,
}

impl BiddingArbiter {
    pub fn new(slot: ResourceId, sink: SharedSink, increment_ratio: f64) -> Self {
        Self {
            slot,
            sink,
            increment_ratio,
        }
    }

    /// The exclusive slot bidders contend for.
    pub fn slot(&self) -> ResourceId {
        self.slot
    }

    /// Increment for a given current price.
    pub fn increment(&self, price: f64) -> f64 {
        price * self.increment_ratio
    }

    /// Run the bid critical section. Must only be called while holding
    /// the slot.
    pub fn submit(
        &self,
        board: &SharedBoard,
        bidder: &BidderId,
        strategy: StrategyKind,
        valuation: f64,
        now: SimTime,
    ) -> BidOutcome {
        let mut b = board.write();
        if b.status != RoundStatus::Running || now >= b.closes_at {
            return BidOutcome::RoundClosed;
        }
        let proposed = b.current_price + self.increment(b.current_price);
        if proposed >= valuation {
            return BidOutcome::PricedOut;
        }

        b.current_price = proposed;
        b.bid_count += 1;
        b.leader = Some((bidder.clone(), strategy));
        let entry = BidEntry {
            round: b.id,
            elapsed: now - b.opened_at,
            price: proposed,
        };
        log::debug!(
            "round {} bid #{} by {} ({}): price {:.2}",
            b.id,
            b.bid_count,
            bidder,
            strategy,
            proposed
        );
        drop(b);

        self.sink.lock().record(&entry);
        BidOutcome::Accepted { price: proposed }
    }
}
