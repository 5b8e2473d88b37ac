//! Auction orchestration
//!
//! Runs rounds strictly back to back: spawn a round, passivate until its
//! settlement reactivates us, wait out the cooldown, repeat until the
//! configured item count is reached. No two rounds ever overlap or share
//! price state; the arbiter is the only thing carried across rounds.

use crate::application::arbiter::BiddingArbiter;
use crate::application::round::Round;
use crate::domain::RoundId;
use crate::infrastructure::{SharedSink, SharedStats, SimulationConfig, StatisticsCollector};
use gavel_engine::{Context, Priority, Process, SimTime, Simulation, Wake};
use parking_lot::Mutex;
use std::sync::Arc;

enum OrchestratorPhase {
    StartRound,
    AwaitSettlement,
}

pub struct AuctionOrchestrator {
    config: Arc<SimulationConfig>,
    arbiter: Arc<BiddingArbiter>,
    stats: SharedStats,
    completed: u32,
    next_round: u64,
    phase: OrchestratorPhase,
}

impl AuctionOrchestrator {
    pub fn new(
        config: Arc<SimulationConfig>,
        arbiter: Arc<BiddingArbiter>,
        stats: SharedStats,
    ) -> Self {
        Self {
            config,
            arbiter,
            stats,
            completed: 0,
            next_round: 0,
            phase: OrchestratorPhase::StartRound,
        }
    }
}

impl Process for AuctionOrchestrator {
    fn resume(&mut self, _wake: Wake, ctx: &mut Context<'_>) {
        match self.phase {
            OrchestratorPhase::StartRound => {
                if self.completed >= self.config.items {
                    return;
                }
                let id = RoundId(self.next_round);
                self.next_round += 1;
                let round = Round::new(
                    id,
                    self.config.clone(),
                    self.arbiter.clone(),
                    self.stats.clone(),
                    ctx.pid(),
                );
                ctx.spawn_in(Box::new(round), Priority::Control, 0.0);
                self.phase = OrchestratorPhase::AwaitSettlement;
                ctx.passivate();
            }
            OrchestratorPhase::AwaitSettlement => {
                self.completed += 1;
                if self.completed >= self.config.items {
                    log::info!("auction run complete: {} rounds", self.completed);
                    return;
                }
                self.phase = OrchestratorPhase::StartRound;
                ctx.hold(self.config.cooldown);
            }
        }
    }
}

/// Run a full simulation: builds the engine world, spawns the
/// orchestrator, drains the calendar and returns the collected
/// statistics.
pub fn run(config: SimulationConfig, sink: SharedSink) -> StatisticsCollector {
    let mut sim = match config.seed {
        Some(seed) => Simulation::with_seed(seed),
        None => Simulation::new(),
    };
    let slot = sim.create_resource();
    let arbiter = Arc::new(BiddingArbiter::new(slot, sink, config.increment_ratio));
    let stats: SharedStats = Arc::new(Mutex::new(StatisticsCollector::new()));
    let config = Arc::new(config);

    sim.spawn(
        Box::new(AuctionOrchestrator::new(config, arbiter, stats.clone())),
        Priority::Control,
        SimTime::ZERO,
    );
    let end = sim.run();
    log::info!("simulation drained at {}", end);

    let collector = stats.lock().clone();
    collector
}
