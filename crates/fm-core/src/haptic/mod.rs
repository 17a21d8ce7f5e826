pub mod device;
pub mod patterns;
pub mod synchronizer;

pub use device::{HapticError, MockDevice, NullDevice, TracingDevice, VibrationDevice};
pub use patterns::{BpmIntensity, HapticPattern, JUMP_SCARE_PULSE, STOP_PULSE, fear_level_pulse};
pub use synchronizer::{BpmSource, ChainMode, HapticSynchronizer};
