//! Ratchet bidder
//!
//! The incremental strategy: the same decision shape as the agent bidder
//! but bid-eligible from much earlier in the round, so it is usually a
//! ratchet that opens the bidding and keeps nudging the price up. A small
//! fraction of ratchets have no valuation ceiling at all and never stop
//! raising.

use super::{BidPhase, open_view};
use crate::application::arbiter::{BidOutcome, BiddingArbiter};
use crate::domain::{BidderId, Patience, SharedBoard, StrategyKind};
use crate::infrastructure::StrategyTuning;
use gavel_engine::{Context, Process, SimTime, Wake};
use std::sync::Arc;

pub struct RatchetBidder {
    id: BidderId,
    board: SharedBoard,
    arbiter: Arc<BiddingArbiter>,
    /// Private ceiling; `f64::INFINITY` for the unbounded variant.
    valuation: f64,
    patience: Patience,
    eligible_at: SimTime,
    min_poll: f64,
    submit_delay_mean: f64,
    hold_time: f64,
    confidence_boost: Option<f64>,
    phase: BidPhase,
    leading: bool,
}

impl RatchetBidder {
    pub fn new(
        id: BidderId,
        board: SharedBoard,
        arbiter: Arc<BiddingArbiter>,
        valuation: f64,
        eligible_at: SimTime,
        patience: Patience,
        tuning: &StrategyTuning,
    ) -> Self {
        Self {
            id,
            board,
            arbiter,
            valuation,
            patience,
            eligible_at,
            min_poll: tuning.min_poll,
            submit_delay_mean: tuning.submit_delay_mean,
            hold_time: tuning.hold_time,
            confidence_boost: tuning.confidence_boost,
            phase: BidPhase::Deciding,
            leading: false,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.valuation.is_infinite()
    }

    fn poll_interval(&self) -> f64 {
        self.patience.value().max(self.min_poll)
    }

    fn on_poll(&mut self, ctx: &mut Context<'_>) {
        let now = ctx.now();
        let Some(view) = open_view(&self.board, &self.id, now) else {
            return;
        };
        if view.price >= self.valuation {
            return;
        }

        self.patience
            .refresh(now, view.opened_at, view.closes_at, ctx.rng());
        if self.patience.exhausted() {
            log::trace!("{} abandons: patience exhausted", self.id);
            return;
        }

        self.leading = view.leading;
        let proposed = view.price + self.arbiter.increment(view.price);
        if now >= self.eligible_at
            && !self.leading
            && proposed < self.valuation
            && ctx.rng().uniform() > self.patience.value()
        {
            self.phase = BidPhase::Reacting;
            let reaction = ctx.rng().exponential(self.submit_delay_mean);
            ctx.hold(reaction);
            return;
        }

        ctx.hold(self.poll_interval());
    }

    fn on_reacted(&mut self, ctx: &mut Context<'_>) {
        if open_view(&self.board, &self.id, ctx.now()).is_none() {
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
            StrategyKind::Ratchet,
            self.valuation,
            ctx.now(),
        );
        match outcome {
            BidOutcome::Accepted { .. } => {
                self.leading = true;
                if let Some(boost) = self.confidence_boost {
                    self.patience.reward(boost);
                }
                self.phase = BidPhase::Submitting;
                ctx.hold(self.hold_time);
            }
            BidOutcome::PricedOut | BidOutcome::RoundClosed => {
                ctx.release(self.arbiter.slot());
            }
        }
    }

    fn on_released(&mut self, ctx: &mut Context<'_>) {
        ctx.release(self.arbiter.slot());
        self.phase = BidPhase::Deciding;
        if open_view(&self.board, &self.id, ctx.now()).is_some() {
            ctx.hold(self.poll_interval());
        }
    }
}

impl Process for RatchetBidder {
    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_>) {
        match wake {
            Wake::Granted(_) => self.on_granted(ctx),
            Wake::Timer => match self.phase {
                BidPhase::Deciding => self.on_poll(ctx),
                BidPhase::Reacting => self.on_reacted(ctx),
                BidPhase::Submitting => self.on_released(ctx),
                BidPhase::AwaitingGrant => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoundBoard, RoundId};
    use crate::infrastructure::MemoryBidLog;
    use gavel_engine::{Priority, Simulation};
    use parking_lot::Mutex;

    fn spawn_ratchet(
        sim: &mut Simulation,
        board: &SharedBoard,
        arbiter: &Arc<BiddingArbiter>,
        name: &str,
        valuation: f64,
        eligible_at: f64,
    ) {
        let tuning = StrategyTuning::default();
        let patience = Patience::new(60.0, tuning.patience_noise_mean, tuning.late_drop, 0.001);
        let bidder = RatchetBidder::new(
            BidderId::new(name),
            board.clone(),
            arbiter.clone(),
            valuation,
            SimTime::new(eligible_at),
            patience,
            &tuning,
        );
        sim.spawn(Box::new(bidder), Priority::Bidder, SimTime::new(1.0));
    }

    fn harness() -> (Simulation, SharedBoard, Arc<BiddingArbiter>) {
        let mut sim = Simulation::with_seed(9);
        let slot = sim.create_resource();
        let sink = Arc::new(Mutex::new(MemoryBidLog::new()));
        let arbiter = Arc::new(BiddingArbiter::new(slot, sink, 0.01));
        let board = RoundBoard::open(
            RoundId(1),
            SimTime::ZERO,
            SimTime::new(60.0),
            140.0,
            100.0,
        )
        .shared();
        (sim, board, arbiter)
    }

    #[test]
    fn test_early_eligibility_opens_bidding() {
        let (mut sim, board, arbiter) = harness();
        spawn_ratchet(&mut sim, &board, &arbiter, "ratchet-1-0", 150.0, 0.0);
        sim.run();

        let b = board.read();
        assert!(b.bid_count >= 1);
        assert!(b.current_price > 100.0);
        assert!(b.current_price < 150.0);
    }

    #[test]
    fn test_two_ratchets_outbid_each_other() {
        let (mut sim, board, arbiter) = harness();
        spawn_ratchet(&mut sim, &board, &arbiter, "ratchet-1-0", 140.0, 0.0);
        spawn_ratchet(&mut sim, &board, &arbiter, "ratchet-1-1", 145.0, 0.0);
        sim.run();

        let b = board.read();
        // Competition: the loser keeps re-bidding, so more than one bid
        // lands and the price climbs toward the lower ceiling.
        assert!(b.bid_count >= 2, "bids: {}", b.bid_count);
        assert!(b.current_price < 145.0);
    }

    #[test]
    fn test_unbounded_ratchet_never_priced_out() {
        let (mut sim, board, arbiter) = harness();
        spawn_ratchet(&mut sim, &board, &arbiter, "ratchet-1-0", f64::INFINITY, 0.0);
        spawn_ratchet(&mut sim, &board, &arbiter, "ratchet-1-1", 120.0, 0.0);
        sim.run();

        let b = board.read();
        // The unbounded ratchet always answers, so it must end leading.
        assert!(b.leads(&BidderId::new("ratchet-1-0")));
    }
}
