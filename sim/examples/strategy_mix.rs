//! Strategy mix comparison across a batch of auction rounds

use gavel_sim::{MemoryBidLog, SimulationConfig, StrategyMix, run};
use parking_lot::Mutex;
use std::sync::Arc;

fn main() {
    println!("=== Auction Strategy Mix Comparison ===\n");

    let mixes = [
        ("reference (40/25/35)", StrategyMix::default()),
        (
            "sniper-heavy (20/20/60)",
            StrategyMix {
                agent: 0.20,
                ratchet: 0.20,
                sniper: 0.60,
            },
        ),
        (
            "ratchet-heavy (20/60/20)",
            StrategyMix {
                agent: 0.20,
                ratchet: 0.60,
                sniper: 0.20,
            },
        ),
    ];

    for (label, mix) in mixes {
        let config = SimulationConfig {
            items: 200,
            mix,
            seed: Some(42),
            bid_log: None,
            ..Default::default()
        };

        println!("Running 200 rounds with {} ...", label);
        let sink = Arc::new(Mutex::new(MemoryBidLog::new()));
        let stats = run(config, sink);
        let summary = stats.summary();

        println!(
            "  sold {}/{} | agent {} | ratchet {} | sniper {} | avg price {:.2}\n",
            summary.sold,
            summary.rounds,
            summary.agent_wins,
            summary.ratchet_wins,
            summary.sniper_wins,
            summary.avg_winning_price
        );
    }

    println!("Done.");
}
