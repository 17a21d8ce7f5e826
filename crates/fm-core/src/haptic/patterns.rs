//! Fixed haptic pattern catalogue and the stateless intensity mappings.
//!
//! Patterns alternate pulse and pause durations in milliseconds, starting
//! with a pulse.

use std::fmt;
use std::str::FromStr;

use crate::constants::{BPM_CRITICAL, BPM_ELEVATED, BPM_HIGH, BPM_NORMAL};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HapticPattern {
    Tap,
    ButtonPress,
    Success,
    Error,
    Warning,
    HeartbeatNormal,
    HeartbeatElevated,
    HeartbeatPanic,
    FearSpike,
    NightmareDetected,
    PanicAlert,
    CalibrationStart,
    CalibrationProgress,
    CalibrationComplete,
    TensionLoop,
    TerrorLoop,
}

impl HapticPattern {
    pub const ALL: [HapticPattern; 16] = [
        HapticPattern::Tap,
        HapticPattern::ButtonPress,
        HapticPattern::Success,
        HapticPattern::Error,
        HapticPattern::Warning,
        HapticPattern::HeartbeatNormal,
        HapticPattern::HeartbeatElevated,
        HapticPattern::HeartbeatPanic,
        HapticPattern::FearSpike,
        HapticPattern::NightmareDetected,
        HapticPattern::PanicAlert,
        HapticPattern::CalibrationStart,
        HapticPattern::CalibrationProgress,
        HapticPattern::CalibrationComplete,
        HapticPattern::TensionLoop,
        HapticPattern::TerrorLoop,
    ];

    pub fn steps(self) -> &'static [u32] {
        match self {
            HapticPattern::Tap => &[15],
            HapticPattern::ButtonPress => &[30],
            HapticPattern::Success => &[50, 30, 100],
            HapticPattern::Error => &[100, 50, 100, 50, 100],
            HapticPattern::Warning => &[80, 40, 80],
            HapticPattern::HeartbeatNormal => &[20, 100, 20],
            HapticPattern::HeartbeatElevated => &[30, 80, 30],
            HapticPattern::HeartbeatPanic => &[50, 50, 50, 50, 50],
            HapticPattern::FearSpike => &[100, 30, 200, 30, 100],
            HapticPattern::NightmareDetected => &[200, 100, 200, 100, 300],
            HapticPattern::PanicAlert => &[100, 50, 100, 50, 100, 50, 200],
            HapticPattern::CalibrationStart => &[30, 20, 30],
            HapticPattern::CalibrationProgress => &[20],
            HapticPattern::CalibrationComplete => &[50, 50, 100],
            HapticPattern::TensionLoop => &[30, 150],
            HapticPattern::TerrorLoop => &[50, 100],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HapticPattern::Tap => "TAP",
            HapticPattern::ButtonPress => "BUTTON_PRESS",
            HapticPattern::Success => "SUCCESS",
            HapticPattern::Error => "ERROR",
            HapticPattern::Warning => "WARNING",
            HapticPattern::HeartbeatNormal => "HEARTBEAT_NORMAL",
            HapticPattern::HeartbeatElevated => "HEARTBEAT_ELEVATED",
            HapticPattern::HeartbeatPanic => "HEARTBEAT_PANIC",
            HapticPattern::FearSpike => "FEAR_SPIKE",
            HapticPattern::NightmareDetected => "NIGHTMARE_DETECTED",
            HapticPattern::PanicAlert => "PANIC_ALERT",
            HapticPattern::CalibrationStart => "CALIBRATION_START",
            HapticPattern::CalibrationProgress => "CALIBRATION_PROGRESS",
            HapticPattern::CalibrationComplete => "CALIBRATION_COMPLETE",
            HapticPattern::TensionLoop => "TENSION_LOOP",
            HapticPattern::TerrorLoop => "TERROR_LOOP",
        }
    }

    /// Case-insensitive lookup; `-` and `_` are interchangeable.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.name() == wanted)
    }
}

impl fmt::Display for HapticPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HapticPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown haptic pattern '{s}'"))
    }
}

/// Heart-rate band used to pick the per-beat pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BpmIntensity {
    /// Below 90: pulse on a random half of beats.
    Resting,
    Normal,
    Elevated,
    High,
    Critical,
}

impl BpmIntensity {
    pub fn classify(bpm: f64) -> Self {
        if bpm < BPM_NORMAL {
            BpmIntensity::Resting
        } else if bpm < BPM_ELEVATED {
            BpmIntensity::Normal
        } else if bpm < BPM_HIGH {
            BpmIntensity::Elevated
        } else if bpm < BPM_CRITICAL {
            BpmIntensity::High
        } else {
            BpmIntensity::Critical
        }
    }

    pub fn pulse(self) -> &'static [u32] {
        match self {
            BpmIntensity::Resting => &[15],
            BpmIntensity::Normal => &[25],
            BpmIntensity::Elevated => &[40, 30],
            BpmIntensity::High => &[50, 50, 50],
            BpmIntensity::Critical => &[60, 30, 60, 30],
        }
    }

    /// Whether every beat pulses, or only a random subset.
    pub fn is_intermittent(self) -> bool {
        self == BpmIntensity::Resting
    }
}

/// Pulse for a 0–100 fear score, escalating over five bands.
pub fn fear_level_pulse(level: f64) -> &'static [u32] {
    if level < 30.0 {
        &[15]
    } else if level < 50.0 {
        &[30, 20, 30]
    } else if level < 70.0 {
        &[50, 30, 50, 30]
    } else if level < 90.0 {
        &[80, 40, 80, 40, 80]
    } else {
        HapticPattern::PanicAlert.steps()
    }
}

pub const JUMP_SCARE_PULSE: [u32; 7] = [150, 50, 200, 100, 150, 50, 100];

/// Zero-length pulse that cancels any vibration in progress.
pub const STOP_PULSE: [u32; 1] = [0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_round_trips_by_name() {
        for pattern in HapticPattern::ALL {
            assert_eq!(HapticPattern::from_name(pattern.name()), Some(pattern));
            assert!(!pattern.steps().is_empty());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(
            HapticPattern::from_name("panic-alert"),
            Some(HapticPattern::PanicAlert)
        );
        assert_eq!("tap".parse::<HapticPattern>(), Ok(HapticPattern::Tap));
        assert!("SCREAM".parse::<HapticPattern>().is_err());
    }

    #[test]
    fn test_bpm_band_boundaries() {
        assert_eq!(BpmIntensity::classify(89.9), BpmIntensity::Resting);
        assert_eq!(BpmIntensity::classify(90.0), BpmIntensity::Normal);
        assert_eq!(BpmIntensity::classify(110.0), BpmIntensity::Elevated);
        assert_eq!(BpmIntensity::classify(130.0), BpmIntensity::High);
        assert_eq!(BpmIntensity::classify(150.0), BpmIntensity::Critical);
        assert_eq!(BpmIntensity::classify(220.0), BpmIntensity::Critical);
    }

    #[test]
    fn test_bpm_pulses_grow_with_band() {
        let lens: Vec<usize> = [
            BpmIntensity::Normal,
            BpmIntensity::Elevated,
            BpmIntensity::High,
            BpmIntensity::Critical,
        ]
        .iter()
        .map(|b| b.pulse().len())
        .collect();
        assert_eq!(lens, vec![1, 2, 3, 4]);
        assert!(BpmIntensity::Resting.is_intermittent());
        assert!(!BpmIntensity::Normal.is_intermittent());
    }

    #[test]
    fn test_fear_bands() {
        assert_eq!(fear_level_pulse(0.0), &[15]);
        assert_eq!(fear_level_pulse(30.0), &[30, 20, 30]);
        assert_eq!(fear_level_pulse(69.9), &[50, 30, 50, 30]);
        assert_eq!(fear_level_pulse(89.0), &[80, 40, 80, 40, 80]);
        assert_eq!(fear_level_pulse(90.0), HapticPattern::PanicAlert.steps());
        assert_eq!(fear_level_pulse(100.0), HapticPattern::PanicAlert.steps());
    }
}
