//! Narrow platform interface for vibration hardware.
//!
//! Implementations report failure through `HapticError` instead of
//! panicking, so callers never need to guard platform calls.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HapticError {
    Unsupported,
    Rejected(String),
}

impl fmt::Display for HapticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HapticError::Unsupported => write!(f, "vibration not supported on this platform"),
            HapticError::Rejected(msg) => write!(f, "vibration request rejected: {msg}"),
        }
    }
}

impl std::error::Error for HapticError {}

pub trait VibrationDevice: Send + Sync {
    /// Capability probe. Callers read this once and cache it.
    fn is_supported(&self) -> bool;

    /// Play `pattern`. `Ok(false)` means the platform declined without error.
    fn vibrate(&self, pattern: &[u32]) -> Result<bool, HapticError>;
}

/// A platform with no vibration hardware.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDevice;

impl VibrationDevice for NullDevice {
    fn is_supported(&self) -> bool {
        false
    }

    fn vibrate(&self, _pattern: &[u32]) -> Result<bool, HapticError> {
        Err(HapticError::Unsupported)
    }
}

/// Emits each pattern as a tracing event. Used by hosts without real hardware.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDevice;

impl VibrationDevice for TracingDevice {
    fn is_supported(&self) -> bool {
        true
    }

    fn vibrate(&self, pattern: &[u32]) -> Result<bool, HapticError> {
        tracing::info!(target: "haptic", ?pattern, "vibrate");
        Ok(true)
    }
}

/// Records every request it receives; can be configured to refuse or fail.
#[derive(Debug)]
pub struct MockDevice {
    supported: bool,
    failing: bool,
    calls: Mutex<Vec<Vec<u32>>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            supported: true,
            failing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Supported, but every request errors.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Every pattern requested so far, including failed ones.
    pub fn calls(&self) -> Vec<Vec<u32>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Requests other than stop pulses.
    pub fn pulses(&self) -> Vec<Vec<u32>> {
        self.calls()
            .into_iter()
            .filter(|p| p.iter().any(|&ms| ms > 0))
            .collect()
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl VibrationDevice for MockDevice {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn vibrate(&self, pattern: &[u32]) -> Result<bool, HapticError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pattern.to_vec());
        if !self.supported {
            return Err(HapticError::Unsupported);
        }
        if self.failing {
            return Err(HapticError::Rejected("mock failure".to_string()));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_device() {
        assert!(!NullDevice.is_supported());
        assert_eq!(NullDevice.vibrate(&[10]), Err(HapticError::Unsupported));
    }

    #[test]
    fn test_mock_records_calls() {
        let device = MockDevice::new();
        assert_eq!(device.vibrate(&[10, 20]), Ok(true));
        assert_eq!(device.vibrate(&[0]), Ok(true));
        assert_eq!(device.calls(), vec![vec![10, 20], vec![0]]);
        assert_eq!(device.pulses(), vec![vec![10, 20]]);
    }

    #[test]
    fn test_failing_mock() {
        let device = MockDevice::failing();
        assert!(device.is_supported());
        assert!(matches!(device.vibrate(&[5]), Err(HapticError::Rejected(_))));
        assert_eq!(device.call_count(), 1);
    }
}
