//! Sniper bidder
//!
//! The last-moment strategy: dormant until a snipe instant computed as
//! round close minus a small random offset (human reaction plus network
//! delay, sampled at creation). Wakes once, attempts a single bid and
//! terminates whatever the outcome: a sniper never retries.

use super::BidPhase;
use crate::application::arbiter::{BidOutcome, BiddingArbiter};
use crate::domain::{BidderId, SharedBoard, StrategyKind};
use gavel_engine::{Context, Process, Wake};
use std::sync::Arc;

pub struct SniperBidder {
    id: BidderId,
    board: SharedBoard,
    arbiter: Arc<BiddingArbiter>,
    valuation: f64,
    hold_time: f64,
    phase: BidPhase,
}

impl SniperBidder {
    /// The caller schedules the process at the snipe instant; the sniper
    /// itself holds no timing state beyond that.
    pub fn new(
        id: BidderId,
        board: SharedBoard,
        arbiter: Arc<BiddingArbiter>,
        valuation: f64,
        hold_time: f64,
    ) -> Self {
        Self {
            id,
            board,
            arbiter,
            valuation,
            hold_time,
            phase: BidPhase::Deciding,
        }
    }

    fn on_snipe(&mut self, ctx: &mut Context<'_>) {
        let open = {
            let b = self.board.read();
            b.is_running() && ctx.now() < b.closes_at
        };
        if !open {
            return;
        }
        if ctx.request(self.arbiter.slot()) {
            self.on_granted(ctx);
        } else {
            self.phase = BidPhase::AwaitingGrant;
        }
    }

    fn on_granted(&mut self, ctx: &mut Context<'_>) {
        let outcome = self.arbiter.submit(
            &self.board,
            &self.id,
            StrategyKind::Sniper,
            self.valuation,
            ctx.now(),
        );
        match outcome {
            BidOutcome::Accepted { price } => {
                log::trace!("{} sniped at {:.2}", self.id, price);
                self.phase = BidPhase::Submitting;
                ctx.hold(self.hold_time);
            }
            BidOutcome::PricedOut | BidOutcome::RoundClosed => {
                // One attempt only.
                ctx.release(self.arbiter.slot());
            }
        }
    }
}

impl Process for SniperBidder {
    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_>) {
        match wake {
            Wake::Granted(_) => self.on_granted(ctx),
            Wake::Timer => match self.phase {
                BidPhase::Deciding => self.on_snipe(ctx),
                // Bid processed: release and terminate.
                BidPhase::Submitting => ctx.release(self.arbiter.slot()),
                BidPhase::Reacting | BidPhase::AwaitingGrant => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoundBoard, RoundId};
    use crate::infrastructure::MemoryBidLog;
    use gavel_engine::{Priority, SimTime, Simulation};
    use parking_lot::Mutex;

    fn harness(valuation: f64) -> (Simulation, SharedBoard, Arc<Mutex<MemoryBidLog>>) {
        let mut sim = Simulation::with_seed(5);
        let slot = sim.create_resource();
        let sink = Arc::new(Mutex::new(MemoryBidLog::new()));
        let arbiter = Arc::new(BiddingArbiter::new(slot, sink.clone(), 0.01));
        let board = RoundBoard::open(
            RoundId(1),
            SimTime::ZERO,
            SimTime::new(60.0),
            140.0,
            100.0,
        )
        .shared();

        let sniper = SniperBidder::new(
            BidderId::new("sniper-1-0"),
            board.clone(),
            arbiter,
            valuation,
            0.02,
        );
        // Snipe instant just before close.
        sim.spawn(Box::new(sniper), Priority::Bidder, SimTime::new(59.6));
        (sim, board, sink)
    }

    #[test]
    fn test_single_late_bid() {
        let (mut sim, board, sink) = harness(150.0);
        sim.run();

        let b = board.read();
        assert_eq!(b.bid_count, 1);
        assert_eq!(b.current_price, 101.0);
        assert!(b.leads(&BidderId::new("sniper-1-0")));
        assert_eq!(sink.lock().entries()[0].elapsed, 59.6);
    }

    #[test]
    fn test_priced_out_sniper_never_retries() {
        let (mut sim, board, sink) = harness(90.0);
        sim.run();

        let b = board.read();
        assert_eq!(b.bid_count, 0);
        assert_eq!(b.current_price, 100.0);
        assert!(b.leader.is_none());
        assert!(sink.lock().entries().is_empty());
    }

    #[test]
    fn test_no_attempt_after_close() {
        let mut sim = Simulation::with_seed(5);
        let slot = sim.create_resource();
        let sink: Arc<Mutex<MemoryBidLog>> = Arc::new(Mutex::new(MemoryBidLog::new()));
        let arbiter = Arc::new(BiddingArbiter::new(slot, sink.clone(), 0.01));
        let board = RoundBoard::open(
            RoundId(1),
            SimTime::ZERO,
            SimTime::new(60.0),
            140.0,
            100.0,
        )
        .shared();
        let sniper = SniperBidder::new(
            BidderId::new("sniper-1-0"),
            board.clone(),
            arbiter,
            150.0,
            0.02,
        );
        // A sniper whose snipe instant lands after close does nothing.
        sim.spawn(Box::new(sniper), Priority::Bidder, SimTime::new(61.0));
        sim.run();

        assert_eq!(board.read().bid_count, 0);
    }
}
