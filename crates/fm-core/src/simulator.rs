//! Synthetic heart-rate source standing in for a real sensor.
//!
//! The baseline eases toward a drifting target each step; random spikes and
//! slow decay give the trace a plausible shape. Callers own the cadence.

use rand::Rng;

use crate::signal::{SignalStatus, stress_from_bpm};

const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 140.0;
const RESTING_BPM: f64 = 72.0;
const EASE: f64 = 0.1;
const SPIKE_CHANCE: f64 = 0.03;
const SPIKE_RANGE: f64 = 25.0;
const SPIKE_CEILING: f64 = 135.0;
const DECAY_CHANCE: f64 = 0.04;
const DECAY_FLOOR: f64 = 85.0;
const DECAY_STEP: f64 = 1.5;
const TAP_TARGET_BUMP: f64 = 10.0;
const TAP_BASE_BUMP: f64 = 4.0;

/// One simulated sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub bpm: f64,
    pub stress: f64,
    pub signal: SignalStatus,
}

#[derive(Clone, Debug)]
pub struct BiometricSimulator {
    base_bpm: f64,
    target_bpm: f64,
    signal: SignalStatus,
}

impl Default for BiometricSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BiometricSimulator {
    pub fn new() -> Self {
        Self {
            base_bpm: RESTING_BPM,
            target_bpm: RESTING_BPM,
            signal: SignalStatus::Active,
        }
    }

    pub fn target_bpm(&self) -> f64 {
        self.target_bpm
    }

    /// Advance one step and return the new reading.
    pub fn step(&mut self, rng: &mut impl Rng) -> Reading {
        self.base_bpm += (self.target_bpm - self.base_bpm) * EASE;

        let critical = self.signal == SignalStatus::Critical;
        let jitter = if critical { 6.0 } else { 4.0 };
        let variation = (rng.random::<f64>() - 0.5) * jitter;

        if rng.random_bool(SPIKE_CHANCE) {
            self.target_bpm =
                (self.base_bpm + rng.random::<f64>() * SPIKE_RANGE).min(SPIKE_CEILING);
        }
        if self.target_bpm > DECAY_FLOOR && !critical && rng.random_bool(DECAY_CHANCE) {
            self.target_bpm -= DECAY_STEP;
        }

        let bpm = (self.base_bpm + variation).clamp(MIN_BPM, MAX_BPM).round();
        let stress = stress_from_bpm(bpm);
        self.signal = SignalStatus::classify(bpm, stress);
        Reading {
            bpm,
            stress,
            signal: self.signal,
        }
    }

    /// User interaction that pushes the heart rate up.
    pub fn tap(&mut self) {
        self.target_bpm = (self.target_bpm + TAP_TARGET_BUMP).min(MAX_BPM);
        self.base_bpm = (self.base_bpm + TAP_BASE_BUMP).min(MAX_BPM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_readings_stay_in_range() {
        let mut rng = rng();
        let mut sim = BiometricSimulator::new();
        for i in 0..2_000 {
            if i % 7 == 0 {
                sim.tap();
            }
            let r = sim.step(&mut rng);
            assert!((MIN_BPM..=MAX_BPM).contains(&r.bpm), "bpm {}", r.bpm);
            assert!((0.0..=100.0).contains(&r.stress), "stress {}", r.stress);
            assert_eq!(r.bpm.fract(), 0.0);
            assert_eq!(r.stress, stress_from_bpm(r.bpm));
        }
    }

    #[test]
    fn test_resting_trace_stays_calm() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut sim = BiometricSimulator::new();
        let first = sim.step(&mut rng);
        assert!((70.0..=74.0).contains(&first.bpm), "bpm {}", first.bpm);
        assert_eq!(first.signal, SignalStatus::Active);
    }

    #[test]
    fn test_taps_drive_toward_panic() {
        let mut rng = rng();
        let mut sim = BiometricSimulator::new();
        let mut peak: f64 = 0.0;
        for _ in 0..200 {
            sim.tap();
            peak = peak.max(sim.step(&mut rng).bpm);
        }
        assert!(peak >= 130.0, "peak only {peak}");
    }

    #[test]
    fn test_tap_is_capped() {
        let mut sim = BiometricSimulator::new();
        for _ in 0..50 {
            sim.tap();
        }
        assert_eq!(sim.target_bpm(), MAX_BPM);
    }
}
