use gavel_sim::{FileBidLog, MemoryBidLog, SharedSink, SimulationConfig, run};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

fn print_help() {
    eprintln!(
        r#"gavel-sim - ascending-price auction round simulator

USAGE:
    gavel-sim [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --items <N>         Number of auction rounds to run
    --bidders <N>       Mean bidder population per round
    --duration <T>      Round duration in time units
    --grace <T>         First-bid grace window in time units
    --cooldown <T>      Pause between rounds in time units
    --seed <N>          Seed for a deterministic run
    --bid-log <PATH>    Bid trace destination (JSON lines)
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (e.g. info, gavel_sim=debug)

EXAMPLES:
    # Run with defaults
    gavel-sim

    # A long deterministic run
    gavel-sim --items 1000 --seed 42

    # Short rounds with a tight grace window
    gavel-sim --duration 30 --grace 10 --bid-log bids.jsonl
"#
    );
}

fn usage_error(message: &str) -> ! {
    eprintln!("error: {}", message);
    print_help();
    std::process::exit(1);
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value,
        None => usage_error(&format!("{} requires a value", flag)),
    }
}

fn parse_flag<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => usage_error(&format!("invalid value '{}' for {}", value, flag)),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = SimulationConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--config" | "-c" => {
                i += 1;
                let path = flag_value(&args, i, "--config");
                config = match SimulationConfig::from_file(path) {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        eprintln!("error: {}", e);
                        std::process::exit(1);
                    }
                };
                log::info!("loaded configuration from {}", path);
            }
            "--items" => {
                i += 1;
                config.items = parse_flag(flag_value(&args, i, "--items"), "--items");
            }
            "--bidders" => {
                i += 1;
                config.mean_bidders = parse_flag(flag_value(&args, i, "--bidders"), "--bidders");
            }
            "--duration" => {
                i += 1;
                config.round_duration =
                    parse_flag(flag_value(&args, i, "--duration"), "--duration");
            }
            "--grace" => {
                i += 1;
                config.grace_timeout = parse_flag(flag_value(&args, i, "--grace"), "--grace");
            }
            "--cooldown" => {
                i += 1;
                config.cooldown = parse_flag(flag_value(&args, i, "--cooldown"), "--cooldown");
            }
            "--seed" => {
                i += 1;
                config.seed = Some(parse_flag(flag_value(&args, i, "--seed"), "--seed"));
            }
            "--bid-log" => {
                i += 1;
                config.bid_log = Some(PathBuf::from(flag_value(&args, i, "--bid-log")));
            }
            arg => usage_error(&format!("unknown argument: {}", arg)),
        }
        i += 1;
    }

    if let Err(e) = config.validate() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    let sink: SharedSink = match &config.bid_log {
        Some(path) => match FileBidLog::create(path, config.seed) {
            Ok(file_log) => Arc::new(Mutex::new(file_log)),
            Err(e) => {
                eprintln!("error: cannot open bid log '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Arc::new(Mutex::new(MemoryBidLog::new())),
    };

    let stats = run(config, sink);
    println!("{}", stats.summary());
}
