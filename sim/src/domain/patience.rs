//! Patience decay model
//!
//! Patience is a scalar in [0, 1] describing a bidder's willingness to keep
//! waiting before bidding. Through the first three quarters of a round it
//! erodes by small exponential-noise decrements; from three quarters on it
//! follows a quintic drop that concentrates most abandonment in the final
//! stretch. A bidder abandons the round once patience falls below its
//! exponentially-sampled abandonment threshold.

use gavel_engine::{RandomSource, SimTime};

/// Normalized round fraction at which the late drop-off takes over.
const LATE_PHASE_START: f64 = 0.75;

/// Patience ceiling; the late curve starts from here.
const CEILING: f64 = 0.99;

#[derive(Debug, Clone)]
pub struct Patience {
    value: f64,
    threshold: f64,
    noise_mean: f64,
    late_drop: f64,
    /// Recompute at most this often (a hundredth of the round duration).
    min_interval: f64,
    last_refresh: Option<SimTime>,
}

impl Patience {
    /// `threshold` is this bidder's abandonment level, sampled once at
    /// creation; `late_drop` is the `k` of the late-phase curve.
    pub fn new(duration: f64, noise_mean: f64, late_drop: f64, threshold: f64) -> Self {
        Self {
            value: CEILING,
            threshold,
            noise_mean,
            late_drop,
            min_interval: duration / 100.0,
            last_refresh: None,
        }
    }

    /// Recompute patience for the current instant. Calls closer together
    /// than the minimum interval are ignored, so patience only ever moves
    /// forward in time.
    pub fn refresh(
        &mut self,
        now: SimTime,
        opened_at: SimTime,
        closes_at: SimTime,
        rng: &mut RandomSource,
    ) {
        if let Some(last) = self.last_refresh {
            if now - last < self.min_interval {
                return;
            }
        }
        self.last_refresh = Some(now);

        let duration = closes_at - opened_at;
        if duration <= 0.0 {
            return;
        }
        let normalized = ((now - opened_at) / duration).clamp(0.0, 1.0);

        if normalized < LATE_PHASE_START {
            self.value = (self.value - rng.exponential(self.noise_mean)).max(0.0);
        } else {
            let ramp = ((normalized - LATE_PHASE_START) / (1.0 - LATE_PHASE_START)).powi(5);
            self.value = (CEILING - self.late_drop * ramp).clamp(0.0, 1.0);
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True once patience has decayed below the abandonment threshold.
    pub fn exhausted(&self) -> bool {
        self.value < self.threshold
    }

    /// Optional post-bid confidence boost.
    pub fn reward(&mut self, boost: f64) {
        self.value = (self.value + boost).min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn refreshed(patience: &mut Patience, at: f64, rng: &mut RandomSource) -> f64 {
        patience.refresh(SimTime::new(at), SimTime::ZERO, SimTime::new(60.0), rng);
        patience.value()
    }

    #[test]
    fn test_early_phase_decays_slowly() {
        let mut rng = RandomSource::from_seed(42);
        let mut patience = Patience::new(60.0, 0.002, 0.98, 0.03);

        let mut t = 0.6;
        while t < 40.0 {
            patience.refresh(SimTime::new(t), SimTime::ZERO, SimTime::new(60.0), &mut rng);
            t += 0.6;
        }
        // Dozens of refreshes, each a small exponential decrement: still
        // close to the ceiling.
        assert!(patience.value() > 0.7, "value {}", patience.value());
        assert!(patience.value() < 0.99);
    }

    #[test]
    fn test_late_phase_follows_quintic_drop() {
        let mut rng = RandomSource::from_seed(42);
        let mut patience = Patience::new(60.0, 0.002, 0.98, 0.03);

        let at_three_quarters = refreshed(&mut patience, 45.0, &mut rng);
        assert_relative_eq!(at_three_quarters, 0.99, epsilon = 1e-9);

        let near_end = refreshed(&mut patience, 59.4, &mut rng);
        let expected = 0.99 - 0.98 * ((59.4 / 60.0 - 0.75) / 0.25f64).powi(5);
        assert_relative_eq!(near_end, expected, epsilon = 1e-9);

        let at_end = refreshed(&mut patience, 60.0, &mut rng);
        assert_relative_eq!(at_end, 0.99 - 0.98, epsilon = 1e-9);
    }

    #[test]
    fn test_late_phase_is_monotone_decreasing() {
        let mut rng = RandomSource::from_seed(7);
        let mut patience = Patience::new(60.0, 0.002, 0.98, 0.03);
        let mut previous = refreshed(&mut patience, 45.0, &mut rng);
        let mut t = 45.6;
        while t <= 60.0 {
            let value = refreshed(&mut patience, t, &mut rng);
            assert!(value <= previous);
            previous = value;
            t += 0.6;
        }
    }

    #[test]
    fn test_refresh_interval_gating() {
        let mut rng = RandomSource::from_seed(42);
        let mut patience = Patience::new(60.0, 0.1, 0.98, 0.03);

        patience.refresh(SimTime::new(1.0), SimTime::ZERO, SimTime::new(60.0), &mut rng);
        let after_first = patience.value();
        // 0.2 < duration/100 = 0.6: ignored.
        patience.refresh(SimTime::new(1.2), SimTime::ZERO, SimTime::new(60.0), &mut rng);
        assert_eq!(patience.value(), after_first);
        // Past the gate: moves again.
        patience.refresh(SimTime::new(1.7), SimTime::ZERO, SimTime::new(60.0), &mut rng);
        assert!(patience.value() < after_first);
    }

    #[test]
    fn test_exhaustion_against_threshold() {
        let mut rng = RandomSource::from_seed(42);
        let mut patience = Patience::new(60.0, 0.002, 0.98, 0.5);
        assert!(!patience.exhausted());
        // Deep in the late phase the curve is far below a 0.5 threshold.
        refreshed(&mut patience, 59.9, &mut rng);
        assert!(patience.exhausted());
    }

    #[test]
    fn test_reward_clamps_at_one() {
        let mut patience = Patience::new(60.0, 0.002, 0.98, 0.03);
        patience.reward(0.5);
        assert_eq!(patience.value(), 1.0);
    }
}
