//! Bidder population generation
//!
//! One generator process per round. In sampled mode it spawns one bidder
//! per resume and sleeps an exponential inter-arrival gap, so the
//! population trickles in rather than appearing at once. In scripted mode
//! it schedules an explicit blueprint list, which makes scenarios exactly
//! reproducible.
//!
//! Every spawned bidder is registered in the round's roster so the round
//! can cancel stragglers at settlement.

use crate::application::arbiter::BiddingArbiter;
use crate::application::bidders::{AgentBidder, RatchetBidder, SniperBidder};
use crate::application::round::Roster;
use crate::domain::{BidderId, Patience, SharedBoard, StrategyKind};
use crate::infrastructure::{BidderBlueprint, SimulationConfig, StrategyTuning};
use gavel_engine::{Context, Priority, Process, RandomSource, SimTime, Wake};
use std::sync::Arc;

/// How the round's population comes to be.
pub enum Plan {
    /// Spawn `remaining` bidders with sampled strategies and valuations.
    Sampled { remaining: u32 },
    /// Replay an explicit blueprint list.
    Scripted { pending: Vec<BidderBlueprint> },
}

pub struct PopulationGenerator {
    board: SharedBoard,
    arbiter: Arc<BiddingArbiter>,
    roster: Roster,
    tuning: StrategyTuning,
    weights: [f64; 3],
    arrival_gap_mean: f64,
    real_value: f64,
    plan: Plan,
    spawned: u32,
}

impl PopulationGenerator {
    pub fn new(
        board: SharedBoard,
        arbiter: Arc<BiddingArbiter>,
        roster: Roster,
        config: &SimulationConfig,
        plan: Plan,
        real_value: f64,
    ) -> Self {
        Self {
            board,
            arbiter,
            roster,
            tuning: config.tuning,
            weights: config.mix.weights(),
            arrival_gap_mean: config.arrival_gap_mean,
            real_value,
            plan,
            spawned: 0,
        }
    }

    fn bidder_id(&self, strategy: StrategyKind, ordinal: u32) -> BidderId {
        let round = self.board.read().id;
        BidderId::new(format!("{}-{}-{}", strategy, round, ordinal))
    }

    /// Eligibility instant: anchored just before `eligibility_anchor` of
    /// the round, pulled earlier by an exponential head start.
    fn sample_eligible_at(&self, rng: &mut RandomSource, head_start_mean: f64) -> SimTime {
        let (opened_at, duration) = {
            let b = self.board.read();
            (b.opened_at, b.duration())
        };
        let fraction = (self.tuning.eligibility_anchor - rng.exponential(head_start_mean)).max(0.0);
        opened_at + duration * fraction
    }

    fn sample_patience(&self, rng: &mut RandomSource) -> Patience {
        let duration = self.board.read().duration();
        Patience::new(
            duration,
            self.tuning.patience_noise_mean,
            self.tuning.late_drop,
            rng.exponential(self.tuning.abandon_threshold_mean),
        )
    }

    /// Snipe instant: close minus |reaction| + network delay, never before
    /// `earliest`.
    fn sample_snipe_at(&self, rng: &mut RandomSource, earliest: SimTime) -> SimTime {
        let closes_at = self.board.read().closes_at;
        let offset = rng
            .normal(self.tuning.snipe_reaction_mean, self.tuning.snipe_reaction_std)
            .abs()
            + rng.exponential(self.tuning.snipe_network_mean);
        (closes_at + (-offset)).max(earliest)
    }

    /// Spawn one bidder arriving at `arrival` (an absolute instant, at or
    /// after now).
    fn spawn_bidder(
        &mut self,
        ctx: &mut Context<'_>,
        strategy: StrategyKind,
        valuation: f64,
        arrival: SimTime,
    ) {
        let ordinal = self.spawned;
        self.spawned += 1;
        let id = self.bidder_id(strategy, ordinal);
        let now = ctx.now();

        let pid = match strategy {
            StrategyKind::Agent => {
                let eligible_at = self.sample_eligible_at(ctx.rng(), self.tuning.agent_head_start);
                let patience = self.sample_patience(ctx.rng());
                let bidder = AgentBidder::new(
                    id,
                    self.board.clone(),
                    self.arbiter.clone(),
                    valuation,
                    eligible_at,
                    patience,
                    &self.tuning,
                );
                ctx.spawn_in(Box::new(bidder), Priority::Bidder, arrival - now)
            }
            StrategyKind::Ratchet => {
                let eligible_at =
                    self.sample_eligible_at(ctx.rng(), self.tuning.ratchet_head_start);
                let patience = self.sample_patience(ctx.rng());
                let bidder = RatchetBidder::new(
                    id,
                    self.board.clone(),
                    self.arbiter.clone(),
                    valuation,
                    eligible_at,
                    patience,
                    &self.tuning,
                );
                ctx.spawn_in(Box::new(bidder), Priority::Bidder, arrival - now)
            }
            StrategyKind::Sniper => {
                let snipe_at = self.sample_snipe_at(ctx.rng(), arrival);
                let bidder = SniperBidder::new(
                    id,
                    self.board.clone(),
                    self.arbiter.clone(),
                    valuation,
                    self.tuning.hold_time,
                );
                ctx.spawn_in(Box::new(bidder), Priority::Bidder, snipe_at - now)
            }
        };
        self.roster.lock().push(pid);
    }

    fn sample_strategy(&self, rng: &mut RandomSource) -> StrategyKind {
        StrategyKind::ALL[rng.categorical(&self.weights)]
    }

    /// Valuation: real value times a normal markup, snipers assessed more
    /// tightly; the markup is floored so valuations stay positive.
    fn sample_valuation(&self, rng: &mut RandomSource, strategy: StrategyKind) -> f64 {
        if strategy == StrategyKind::Ratchet
            && rng.uniform() < self.tuning.ratchet_unbounded_prob
        {
            return f64::INFINITY;
        }
        let std = match strategy {
            StrategyKind::Sniper => self.tuning.sniper_markup_std,
            _ => self.tuning.valuation_markup_std,
        };
        let markup = rng.normal(self.tuning.valuation_markup_mean, std).max(0.05);
        self.real_value * markup
    }
}

impl Process for PopulationGenerator {
    fn resume(&mut self, _wake: Wake, ctx: &mut Context<'_>) {
        if !self.board.read().is_running() {
            return;
        }

        if let Plan::Scripted { pending } = &mut self.plan {
            let opened_at = self.board.read().opened_at;
            for blueprint in std::mem::take(pending) {
                let arrival = (opened_at + blueprint.arrival).max(ctx.now());
                self.spawn_bidder(ctx, blueprint.strategy, blueprint.valuation, arrival);
            }
            return;
        }

        let Plan::Sampled { remaining } = &mut self.plan else {
            return;
        };
        let left = *remaining;
        if left == 0 {
            return;
        }
        *remaining = left - 1;

        let strategy = self.sample_strategy(ctx.rng());
        let valuation = self.sample_valuation(ctx.rng(), strategy);
        let now = ctx.now();
        self.spawn_bidder(ctx, strategy, valuation, now);

        if left > 1 {
            let gap = ctx.rng().exponential(self.arrival_gap_mean);
            ctx.hold(gap);
        }
    }
}
