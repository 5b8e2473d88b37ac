//! Simulation configuration
//!
//! All knobs with built-in defaults, JSON file loading and validation.
//! A config is validated once before the run starts; the models assume the
//! parameters they receive are sane.

use crate::domain::StrategyKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Categorical strategy split for generated populations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyMix {
    pub agent: f64,
    pub ratchet: f64,
    pub sniper: f64,
}

impl Default for StrategyMix {
    fn default() -> Self {
        // Split matched to the reference empirical study.
        Self {
            agent: 0.40,
            ratchet: 0.25,
            sniper: 0.35,
        }
    }
}

impl StrategyMix {
    /// Weights in [`StrategyKind::ALL`] order.
    pub fn weights(&self) -> [f64; 3] {
        [self.agent, self.ratchet, self.sniper]
    }

    pub fn total(&self) -> f64 {
        self.agent + self.ratchet + self.sniper
    }
}

/// Timing and behavioral tuning shared by the bidder strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyTuning {
    /// Floor for the patience-driven poll interval.
    pub min_poll: f64,
    /// Normalized round fraction eligibility is anchored at.
    pub eligibility_anchor: f64,
    /// Mean of the exponential eligibility head start (fraction of the
    /// round duration) for agents.
    pub agent_head_start: f64,
    /// Same, for ratchets; larger, so most ratchets are eligible early.
    pub ratchet_head_start: f64,
    /// Probability a ratchet has no price ceiling at all.
    pub ratchet_unbounded_prob: f64,
    /// Sniper reaction time: mean and spread of the normal component.
    pub snipe_reaction_mean: f64,
    pub snipe_reaction_std: f64,
    /// Sniper network delay: mean of the exponential component.
    pub snipe_network_mean: f64,
    /// Mean of the exponential abandonment threshold.
    pub abandon_threshold_mean: f64,
    /// Mean of the early-phase patience noise decrement.
    pub patience_noise_mean: f64,
    /// `k` of the late-phase patience curve.
    pub late_drop: f64,
    /// Optional patience boost applied after a successful bid.
    pub confidence_boost: Option<f64>,
    /// Mean reaction + network delay between deciding to bid and
    /// contending for the arbiter.
    pub submit_delay_mean: f64,
    /// Arbiter processing time covered by a hold.
    pub hold_time: f64,
    /// Valuation = real value x Normal(markup_mean, markup_std).
    pub valuation_markup_mean: f64,
    pub valuation_markup_std: f64,
    /// Snipers assess value more tightly.
    pub sniper_markup_std: f64,
}

impl Default for StrategyTuning {
    fn default() -> Self {
        Self {
            min_poll: 0.2,
            eligibility_anchor: 0.75,
            agent_head_start: 0.08,
            ratchet_head_start: 0.45,
            ratchet_unbounded_prob: 0.03,
            snipe_reaction_mean: 0.25,
            snipe_reaction_std: 0.08,
            snipe_network_mean: 0.10,
            abandon_threshold_mean: 0.03,
            patience_noise_mean: 0.003,
            late_drop: 0.98,
            confidence_boost: None,
            submit_delay_mean: 0.05,
            hold_time: 0.02,
            valuation_markup_mean: 1.2,
            valuation_markup_std: 0.2,
            sniper_markup_std: 0.08,
        }
    }
}

/// Explicit population for reproducible scenario replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidderBlueprint {
    pub strategy: StrategyKind,
    pub valuation: f64,
    /// Arrival offset from round open.
    #[serde(default)]
    pub arrival: f64,
}

/// Fixed pricing and population applied to every round instead of
/// sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScript {
    pub real_value: f64,
    pub starting_price: f64,
    pub bidders: Vec<BidderBlueprint>,
}

/// Root simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of auction rounds (items) to run.
    pub items: u32,
    /// Mean of the sampled population size per round.
    pub mean_bidders: f64,
    /// Spread of the sampled population size.
    pub bidder_spread: f64,
    /// Fixed round duration in time units.
    pub round_duration: f64,
    /// First-bid grace window; a silent round is discarded at this point.
    pub grace_timeout: f64,
    /// Pause between rounds.
    pub cooldown: f64,
    /// Price increment as a fraction of the current price.
    pub increment_ratio: f64,
    /// Mean of the exponential latent item value.
    pub base_item_value: f64,
    /// Spread of the noisy multiplier applied to the latent value.
    pub value_jitter: f64,
    /// Starting price = value x Normal(opening_ratio_mean, opening_ratio_std).
    pub opening_ratio_mean: f64,
    pub opening_ratio_std: f64,
    /// Mean inter-arrival gap between generated bidders.
    pub arrival_gap_mean: f64,
    pub mix: StrategyMix,
    pub tuning: StrategyTuning,
    /// Seed for deterministic runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Bid trace destination; in-memory only when absent.
    pub bid_log: Option<PathBuf>,
    /// When set, every round replays this script instead of sampling.
    pub script: Option<RoundScript>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            items: 10,
            mean_bidders: 12.0,
            bidder_spread: 3.0,
            round_duration: 60.0,
            grace_timeout: 30.0,
            cooldown: 5.0,
            increment_ratio: 0.02,
            base_item_value: 1000.0,
            value_jitter: 0.1,
            opening_ratio_mean: 0.8,
            opening_ratio_std: 0.2,
            arrival_gap_mean: 1.5,
            mix: StrategyMix::default(),
            tuning: StrategyTuning::default(),
            seed: None,
            bid_log: Some(PathBuf::from("gavel-bids.jsonl")),
            script: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        }

        positive("round_duration", self.round_duration)?;
        positive("grace_timeout", self.grace_timeout)?;
        positive("base_item_value", self.base_item_value)?;
        positive("arrival_gap_mean", self.arrival_gap_mean)?;
        positive("tuning.min_poll", self.tuning.min_poll)?;
        positive("tuning.hold_time", self.tuning.hold_time)?;
        positive("tuning.submit_delay_mean", self.tuning.submit_delay_mean)?;
        positive(
            "tuning.abandon_threshold_mean",
            self.tuning.abandon_threshold_mean,
        )?;
        positive("tuning.patience_noise_mean", self.tuning.patience_noise_mean)?;
        positive("tuning.agent_head_start", self.tuning.agent_head_start)?;
        positive("tuning.ratchet_head_start", self.tuning.ratchet_head_start)?;
        positive("tuning.snipe_network_mean", self.tuning.snipe_network_mean)?;
        positive(
            "tuning.valuation_markup_mean",
            self.tuning.valuation_markup_mean,
        )?;
        positive("opening_ratio_mean", self.opening_ratio_mean)?;

        fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )))
            }
        }

        non_negative("bidder_spread", self.bidder_spread)?;
        non_negative("value_jitter", self.value_jitter)?;
        non_negative("opening_ratio_std", self.opening_ratio_std)?;
        non_negative("tuning.snipe_reaction_mean", self.tuning.snipe_reaction_mean)?;
        non_negative("tuning.snipe_reaction_std", self.tuning.snipe_reaction_std)?;
        non_negative(
            "tuning.valuation_markup_std",
            self.tuning.valuation_markup_std,
        )?;
        non_negative("tuning.sniper_markup_std", self.tuning.sniper_markup_std)?;
        if !(0.0..=1.0).contains(&self.tuning.ratchet_unbounded_prob) {
            return Err(ConfigError::Invalid(format!(
                "tuning.ratchet_unbounded_prob must be in [0, 1], got {}",
                self.tuning.ratchet_unbounded_prob
            )));
        }

        if self.mean_bidders < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mean_bidders must be non-negative, got {}",
                self.mean_bidders
            )));
        }
        if self.cooldown < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cooldown must be non-negative, got {}",
                self.cooldown
            )));
        }
        if !(self.increment_ratio > 0.0 && self.increment_ratio < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "increment_ratio must be in (0, 1), got {}",
                self.increment_ratio
            )));
        }
        let total = self.mix.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "strategy mix must sum to 1.0, got {}",
                total
            )));
        }
        if self.mix.weights().iter().any(|w| *w < 0.0) {
            return Err(ConfigError::Invalid(
                "strategy mix weights must be non-negative".to_string(),
            ));
        }
        if !(self.tuning.eligibility_anchor > 0.0 && self.tuning.eligibility_anchor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "tuning.eligibility_anchor must be in (0, 1], got {}",
                self.tuning.eligibility_anchor
            )));
        }
        if let Some(script) = &self.script {
            positive("script.real_value", script.real_value)?;
            positive("script.starting_price", script.starting_price)?;
            for (i, bidder) in script.bidders.iter().enumerate() {
                positive(&format!("script.bidders[{}].valuation", i), bidder.valuation)?;
                if bidder.arrival < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "script.bidders[{}].arrival must be non-negative",
                        i
                    )));
                }
            }
        }
        Ok(())
    }
}
