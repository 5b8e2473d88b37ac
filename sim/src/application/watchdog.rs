//! First-bid watchdog
//!
//! Armed at round open and scheduled at the grace deadline. This is a
//! race between exactly two outcomes, first bid vs. timeout, and both
//! sides are idempotent: if any bid landed first the watchdog is a no-op,
//! and if the watchdog discards first, settlement finds the round already
//! terminal.

use crate::domain::{RoundStatus, SharedBoard};
use gavel_engine::{Context, Process, ProcessId, Wake};

pub struct FirstBidWatchdog {
    board: SharedBoard,
    round: ProcessId,
}

impl FirstBidWatchdog {
    pub fn new(board: SharedBoard, round: ProcessId) -> Self {
        Self { board, round }
    }
}

impl Process for FirstBidWatchdog {
    fn resume(&mut self, _wake: Wake, ctx: &mut Context<'_>) {
        let mut b = self.board.write();
        if b.status != RoundStatus::Running || b.bid_count > 0 {
            return;
        }
        b.status = RoundStatus::Discarded;
        b.leader = None;
        let id = b.id;
        drop(b);

        log::info!("round {}: no bid within grace window, discarding", id);
        // Cut the round's remaining wait short so it settles now.
        ctx.activate(self.round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BidderId, RoundBoard, RoundId, StrategyKind};
    use gavel_engine::{Priority, SimTime, Simulation};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Stand-in for the round process: passivates, then records the
    /// instant it gets reactivated.
    struct RoundProbe {
        woken_at: Rc<RefCell<Option<f64>>>,
        armed: bool,
    }

    impl Process for RoundProbe {
        fn resume(&mut self, _wake: Wake, ctx: &mut Context<'_>) {
            if !self.armed {
                self.armed = true;
                ctx.passivate();
            } else {
                *self.woken_at.borrow_mut() = Some(ctx.now().as_f64());
            }
        }
    }

    fn board() -> SharedBoard {
        RoundBoard::open(
            RoundId(1),
            SimTime::ZERO,
            SimTime::new(60.0),
            1000.0,
            800.0,
        )
        .shared()
    }

    fn run_watchdog(board: &SharedBoard) -> Option<f64> {
        let mut sim = Simulation::with_seed(1);
        let woken_at = Rc::new(RefCell::new(None));
        let round = sim.spawn(
            Box::new(RoundProbe {
                woken_at: woken_at.clone(),
                armed: false,
            }),
            Priority::Control,
            SimTime::ZERO,
        );
        sim.spawn(
            Box::new(FirstBidWatchdog::new(board.clone(), round)),
            Priority::Control,
            SimTime::new(30.0),
        );
        sim.run();
        let result = *woken_at.borrow();
        result
    }

    #[test]
    fn test_discards_silent_round_and_wakes_it() {
        let board = board();
        let woken_at = run_watchdog(&board);

        let b = board.read();
        assert_eq!(b.status, RoundStatus::Discarded);
        assert!(b.leader.is_none());
        assert_eq!(woken_at, Some(30.0));
    }

    #[test]
    fn test_noop_when_a_bid_already_landed() {
        let board = board();
        {
            let mut b = board.write();
            b.bid_count = 1;
            b.current_price = 808.0;
            b.leader = Some((BidderId::new("ratchet-1-0"), StrategyKind::Ratchet));
        }
        let woken_at = run_watchdog(&board);

        let b = board.read();
        assert_eq!(b.status, RoundStatus::Running);
        assert!(b.leader.is_some());
        assert_eq!(woken_at, None);
    }

    #[test]
    fn test_noop_when_round_already_terminal() {
        let board = board();
        board.write().status = RoundStatus::Sold;
        let woken_at = run_watchdog(&board);

        assert_eq!(board.read().status, RoundStatus::Sold);
        assert_eq!(woken_at, None);
    }
}
