//! Auction round lifecycle
//!
//! One process per round: on entry it prices the item, opens the board
//! and spawns the population generator and the first-bid watchdog, then
//! suspends until the scheduled close. Settlement runs exactly once,
//! either at the close or earlier when the watchdog discards a silent
//! round and cuts the wait short, and ends by cancelling every child
//! process and reporting the outcome.

use crate::application::arbiter::BiddingArbiter;
use crate::application::population::{Plan, PopulationGenerator};
use crate::application::watchdog::FirstBidWatchdog;
use crate::domain::{RoundBoard, RoundId, RoundStatus, SharedBoard};
use crate::infrastructure::{RoundReport, SharedStats, SimulationConfig};
use gavel_engine::{Context, Priority, Process, ProcessId, Wake};
use parking_lot::Mutex;
use std::sync::Arc;

/// Non-owning list of the bidder processes spawned for a round; the round
/// always outlives its bidders and cancels the stragglers at settlement.
pub type Roster = Arc<Mutex<Vec<ProcessId>>>;

enum RoundPhase {
    Initializing,
    Open,
}

pub struct Round {
    id: RoundId,
    config: Arc<SimulationConfig>,
    arbiter: Arc<BiddingArbiter>,
    stats: SharedStats,
    orchestrator: ProcessId,
    phase: RoundPhase,
    board: Option<SharedBoard>,
    roster: Roster,
    children: Vec<ProcessId>,
}

impl Round {
    pub fn new(
        id: RoundId,
        config: Arc<SimulationConfig>,
        arbiter: Arc<BiddingArbiter>,
        stats: SharedStats,
        orchestrator: ProcessId,
    ) -> Self {
        Self {
            id,
            config,
            arbiter,
            stats,
            orchestrator,
            phase: RoundPhase::Initializing,
            board: None,
            roster: Arc::new(Mutex::new(Vec::new())),
            children: Vec::new(),
        }
    }

    /// Price the item and open the round.
    fn open(&mut self, ctx: &mut Context<'_>) {
        let now = ctx.now();
        let duration = self.config.round_duration;

        let (real_value, starting_price, plan) = match &self.config.script {
            Some(script) => (
                script.real_value,
                script.starting_price,
                Plan::Scripted {
                    pending: script.bidders.clone(),
                },
            ),
            None => {
                // Latent value: exponential, scaled by a noisy multiplier;
                // the price opens below fair value.
                let value = ctx.rng().exponential(self.config.base_item_value)
                    * ctx.rng().normal(1.0, self.config.value_jitter).max(0.1);
                let opening_ratio = ctx
                    .rng()
                    .normal(self.config.opening_ratio_mean, self.config.opening_ratio_std)
                    .max(0.05);
                let size = ctx
                    .rng()
                    .normal(self.config.mean_bidders, self.config.bidder_spread)
                    .round()
                    .max(0.0) as u32;
                (
                    value,
                    value * opening_ratio,
                    Plan::Sampled { remaining: size },
                )
            }
        };

        let board = RoundBoard::open(self.id, now, now + duration, real_value, starting_price)
            .shared();
        self.board = Some(board.clone());
        log::info!(
            "round {} opened: value {:.2}, starting price {:.2}, closes {}",
            self.id,
            real_value,
            starting_price,
            now + duration
        );

        let generator = PopulationGenerator::new(
            board.clone(),
            self.arbiter.clone(),
            self.roster.clone(),
            &self.config,
            plan,
            real_value,
        );
        self.children
            .push(ctx.spawn_in(Box::new(generator), Priority::Control, 0.0));

        let watchdog = FirstBidWatchdog::new(board.clone(), ctx.pid());
        self.children.push(ctx.spawn_in(
            Box::new(watchdog),
            Priority::Control,
            self.config.grace_timeout,
        ));

        self.phase = RoundPhase::Open;
        ctx.schedule_at(now + duration);
    }

    /// Settle the round: assign the terminal status if the watchdog has
    /// not already, tear down every child and report the outcome once.
    fn settle(&mut self, ctx: &mut Context<'_>) {
        let Some(board) = self.board.take() else {
            return;
        };
        let now = ctx.now();

        let report = {
            let mut b = board.write();
            if b.status == RoundStatus::Running {
                if b.bid_count > 0 {
                    b.status = RoundStatus::Sold;
                } else {
                    if now - b.opened_at > self.config.grace_timeout {
                        log::error!(
                            "round {} reached settlement unbid and undiscarded; \
                             the watchdog should have fired",
                            self.id
                        );
                    }
                    b.status = RoundStatus::Discarded;
                    b.leader = None;
                }
            }
            RoundReport {
                id: b.id,
                opened_at: b.opened_at,
                closed_at: now,
                status: b.status,
                winner: match b.status {
                    RoundStatus::Sold => b.leader.as_ref().map(|(_, strategy)| *strategy),
                    _ => None,
                },
                starting_price: b.starting_price,
                final_price: b.current_price,
                bids: b.bid_count,
            }
        };

        for pid in self.roster.lock().drain(..) {
            ctx.cancel(pid);
        }
        for pid in self.children.drain(..) {
            ctx.cancel(pid);
        }

        log::info!(
            "round {} settled {:?}: winner {}, final price {:.2}, {} bids",
            self.id,
            report.status,
            report
                .winner
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
            report.final_price,
            report.bids
        );
        self.stats.lock().record_round(report);
        ctx.activate(self.orchestrator);
    }
}

impl Process for Round {
    fn resume(&mut self, _wake: Wake, ctx: &mut Context<'_>) {
        match self.phase {
            RoundPhase::Initializing => self.open(ctx),
            RoundPhase::Open => self.settle(ctx),
        }
    }
}
