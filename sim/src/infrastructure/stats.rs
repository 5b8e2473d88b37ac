//! Run statistics
//!
//! Per-round outcome reports plus the win tally, aggregated into an
//! end-of-run summary.

use crate::domain::{RoundId, RoundStatus, StrategyKind};
use gavel_engine::{SimTime, Tally};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Outcome of one settled round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub id: RoundId,
    pub opened_at: SimTime,
    pub closed_at: SimTime,
    pub status: RoundStatus,
    /// Winning strategy; `None` when the round was discarded.
    pub winner: Option<StrategyKind>,
    pub starting_price: f64,
    pub final_price: f64,
    pub bids: u64,
}

/// Collects one report per settled round.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    wins: Tally<Option<StrategyKind>>,
    reports: Vec<RoundReport>,
}

pub type SharedStats = Arc<Mutex<StatisticsCollector>>;

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_round(&mut self, report: RoundReport) {
        self.wins.record(report.winner);
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[RoundReport] {
        &self.reports
    }

    pub fn wins(&self, strategy: StrategyKind) -> u64 {
        self.wins.count(&Some(strategy))
    }

    pub fn no_sales(&self) -> u64 {
        self.wins.count(&None)
    }

    pub fn summary(&self) -> RunSummary {
        let sold: Vec<&RoundReport> = self
            .reports
            .iter()
            .filter(|r| r.status == RoundStatus::Sold)
            .collect();
        let avg_winning_price = if sold.is_empty() {
            0.0
        } else {
            sold.iter().map(|r| r.final_price).sum::<f64>() / sold.len() as f64
        };
        let avg_bids = if self.reports.is_empty() {
            0.0
        } else {
            self.reports.iter().map(|r| r.bids).sum::<u64>() as f64 / self.reports.len() as f64
        };

        RunSummary {
            rounds: self.reports.len() as u64,
            sold: sold.len() as u64,
            discarded: self.no_sales(),
            agent_wins: self.wins(StrategyKind::Agent),
            ratchet_wins: self.wins(StrategyKind::Ratchet),
            sniper_wins: self.wins(StrategyKind::Sniper),
            avg_winning_price,
            avg_bids,
        }
    }
}

/// End-of-run aggregate, printed to stdout by the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rounds: u64,
    pub sold: u64,
    pub discarded: u64,
    pub agent_wins: u64,
    pub ratchet_wins: u64,
    pub sniper_wins: u64,
    pub avg_winning_price: f64,
    pub avg_bids: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "auction summary")?;
        writeln!(
            f,
            "  rounds:            {} (sold {}, discarded {})",
            self.rounds, self.sold, self.discarded
        )?;
        writeln!(f, "  wins by strategy:")?;
        writeln!(f, "    agent:           {}", self.agent_wins)?;
        writeln!(f, "    ratchet:         {}", self.ratchet_wins)?;
        writeln!(f, "    sniper:          {}", self.sniper_wins)?;
        writeln!(f, "    no winner:       {}", self.discarded)?;
        writeln!(f, "  avg winning price: {:.2}", self.avg_winning_price)?;
        write!(f, "  avg bids per round: {:.1}", self.avg_bids)
    }
}
