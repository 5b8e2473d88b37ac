//! Agent bidder
//!
//! The aggressive strategy: watches the round from arrival but stays
//! quiet through an early period anchored just before three quarters of
//! the round. Once eligible, every decision tick draws a uniform value
//! and bids when it exceeds the current (decaying) patience, so bidding
//! pressure rises exactly as patience collapses in the final quarter.

use super::{BidPhase, open_view};
use crate::application::arbiter::{BidOutcome, BiddingArbiter};
use crate::domain::{BidderId, Patience, SharedBoard, StrategyKind};
use crate::infrastructure::StrategyTuning;
use gavel_engine::{Context, Process, SimTime, Wake};
use std::sync::Arc;

pub struct AgentBidder {
    id: BidderId,
    board: SharedBoard,
    arbiter: Arc<BiddingArbiter>,
    /// Private ceiling price, fixed for the bidder's lifetime.
    valuation: f64,
    patience: Patience,
    /// Instant this bidder becomes willing to bid.
    eligible_at: SimTime,
    min_poll: f64,
    submit_delay_mean: f64,
    hold_time: f64,
    confidence_boost: Option<f64>,
    phase: BidPhase,
    leading: bool,
}

impl AgentBidder {
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

    fn poll_interval(&self) -> f64 {
        self.patience.value().max(self.min_poll)
    }

    /// One decision tick. Terminates (by not rescheduling) when the round
    /// is over, the price passed the valuation, or patience ran out.
    fn on_poll(&mut self, ctx: &mut Context<'_>) {
        let now = ctx.now();
        let Some(view) = open_view(&self.board, &self.id, now) else {
            return;
        };
        if view.price >= self.valuation {
            log::trace!("{} out: price passed valuation", self.id);
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
            // Decided to bid; the price is re-validated after the slot is
            // actually acquired.
            self.phase = BidPhase::Reacting;
            let reaction = ctx.rng().exponential(self.submit_delay_mean);
            ctx.hold(reaction);
            return;
        }

        ctx.hold(self.poll_interval());
    }

    /// Reaction delay elapsed: contend for the arbiter.
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

    /// Holding the slot: run the critical section.
    fn on_granted(&mut self, ctx: &mut Context<'_>) {
        let outcome = self.arbiter.submit(
            &self.board,
            &self.id,
            StrategyKind::Agent,
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
            BidOutcome::PricedOut => {
                // The price moved while waiting; it can only keep rising,
                // so this bidder is done.
                ctx.release(self.arbiter.slot());
            }
            BidOutcome::RoundClosed => {
                ctx.release(self.arbiter.slot());
            }
        }
    }

    /// Processing time over: release the slot and go back to watching.
    fn on_released(&mut self, ctx: &mut Context<'_>) {
        ctx.release(self.arbiter.slot());
        self.phase = BidPhase::Deciding;
        if open_view(&self.board, &self.id, ctx.now()).is_some() {
            ctx.hold(self.poll_interval());
        }
    }
}

impl Process for AgentBidder {
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
