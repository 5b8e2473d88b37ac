//! Append-only bid trace
//!
//! One JSON line per accepted bid, preceded by a run-metadata header. The
//! sink is a port: the simulation writes through the trait, the binary
//! plugs in the file implementation and tests use the in-memory one.

use crate::domain::RoundId;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// A single accepted bid.
#[derive(Debug, Clone, Serialize)]
pub struct BidEntry {
    /// Round the bid belongs to.
    pub round: RoundId,
    /// Time elapsed within the round when the bid was accepted.
    pub elapsed: f64,
    /// Price after the increment was applied.
    pub price: f64,
}

pub trait BidSink {
    fn record(&mut self, entry: &BidEntry);
}

pub type SharedSink = Arc<Mutex<dyn BidSink>>;

/// In-memory sink for tests and programmatic analysis.
#[derive(Debug, Default)]
pub struct MemoryBidLog {
    entries: Vec<BidEntry>,
}

impl MemoryBidLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[BidEntry] {
        &self.entries
    }

    /// Entries belonging to one round, in acceptance order.
    pub fn round_entries(&self, round: RoundId) -> Vec<BidEntry> {
        self.entries
            .iter()
            .filter(|e| e.round == round)
            .cloned()
            .collect()
    }
}

impl BidSink for MemoryBidLog {
    fn record(&mut self, entry: &BidEntry) {
        self.entries.push(entry.clone());
    }
}

#[derive(Serialize)]
struct RunHeader {
    run_started: String,
    seed: Option<u64>,
}

/// File-backed sink writing JSON lines.
pub struct FileBidLog {
    writer: BufWriter<File>,
}

impl FileBidLog {
    /// Open (appending) the log file and write the run header.
    pub fn create(path: impl AsRef<Path>, seed: Option<u64>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let mut log = Self {
            writer: BufWriter::new(file),
        };
        let header = RunHeader {
            run_started: chrono::Utc::now().to_rfc3339(),
            seed,
        };
        log.write_line(&header);
        Ok(log)
    }

    fn write_line<T: Serialize>(&mut self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => {
                if let Err(e) = writeln!(self.writer, "{}", line) {
                    log::warn!("bid log write failed: {}", e);
                }
            }
            Err(e) => log::warn!("bid log serialization failed: {}", e),
        }
    }
}

impl BidSink for FileBidLog {
    fn record(&mut self, entry: &BidEntry) {
        self.write_line(entry);
    }
}

impl Drop for FileBidLog {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("bid log flush failed: {}", e);
        }
    }
}
