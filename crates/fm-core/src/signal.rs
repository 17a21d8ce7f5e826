use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    SIGNAL_CRITICAL_BPM, SIGNAL_CRITICAL_STRESS, SIGNAL_UNSTABLE_BPM, SIGNAL_UNSTABLE_STRESS,
    STRESS_MAX_BPM, STRESS_MIN_BPM,
};

/// Map BPM linearly from 60..=140 onto a rounded 0..=100 stress score.
pub fn stress_from_bpm(bpm: f64) -> f64 {
    let normalized = (bpm - STRESS_MIN_BPM) / (STRESS_MAX_BPM - STRESS_MIN_BPM);
    (normalized * 100.0).round().clamp(0.0, 100.0)
}

/// Monitor status shown alongside the live reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStatus {
    Active,
    Unstable,
    Critical,
}

impl SignalStatus {
    pub fn classify(bpm: f64, stress: f64) -> Self {
        if bpm > SIGNAL_CRITICAL_BPM && stress > SIGNAL_CRITICAL_STRESS {
            SignalStatus::Critical
        } else if bpm > SIGNAL_UNSTABLE_BPM || stress > SIGNAL_UNSTABLE_STRESS {
            SignalStatus::Unstable
        } else {
            SignalStatus::Active
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStatus::Active => f.write_str("ACTIVE"),
            SignalStatus::Unstable => f.write_str("UNSTABLE"),
            SignalStatus::Critical => f.write_str("CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_endpoints() {
        assert_eq!(stress_from_bpm(60.0), 0.0);
        assert_eq!(stress_from_bpm(100.0), 50.0);
        assert_eq!(stress_from_bpm(140.0), 100.0);
    }

    #[test]
    fn test_stress_is_clamped() {
        assert_eq!(stress_from_bpm(40.0), 0.0);
        assert_eq!(stress_from_bpm(200.0), 100.0);
    }

    #[test]
    fn test_classify() {
        assert_eq!(SignalStatus::classify(72.0, 15.0), SignalStatus::Active);
        assert_eq!(SignalStatus::classify(96.0, 45.0), SignalStatus::Unstable);
        assert_eq!(SignalStatus::classify(80.0, 51.0), SignalStatus::Unstable);
        assert_eq!(SignalStatus::classify(111.0, 76.0), SignalStatus::Critical);
        // Both conditions are required for critical.
        assert_eq!(SignalStatus::classify(111.0, 70.0), SignalStatus::Unstable);
    }

    #[test]
    fn test_display_matches_wire_name() {
        let json = serde_json::to_string(&SignalStatus::Critical).unwrap();
        assert_eq!(json, format!("\"{}\"", SignalStatus::Critical));
    }
}
