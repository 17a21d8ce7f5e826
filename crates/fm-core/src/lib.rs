//! Fear Meter core: horror-session recording and adaptive haptics.
//!
//! `SessionRecorder` turns a stream of heart-rate/stress samples into
//! bounded live buffers, rate-limited panic events and an archived session
//! history. `HapticSynchronizer` drives a vibration device in step with the
//! heart rate, or with a tension pulse, as a single self-rescheduling chain.
//!
//! The two components are independent; hosts compose them at the call site.
//! Zero persistence I/O: storage and vibration hardware sit behind traits.

pub mod constants;
pub mod haptic;
pub mod history;
pub mod recorder;
pub mod ring;
pub mod session;
pub mod signal;
pub mod simulator;
pub mod storage;
pub mod time;

pub use constants::{
    HISTORY_CAPACITY, MAX_SESSIONS, PANIC_BPM_THRESHOLD, PANIC_COOLDOWN_MS, PANIC_PULSE,
    PANIC_STRESS_THRESHOLD, SESSIONS_KEY, SETTINGS_KEY,
};
pub use haptic::{
    BpmIntensity, BpmSource, ChainMode, HapticError, HapticPattern, HapticSynchronizer,
    MockDevice, NullDevice, TracingDevice, VibrationDevice,
};
pub use history::SessionHistory;
pub use recorder::{Recording, SessionRecorder};
pub use ring::RingBuffer;
pub use session::{
    ActiveSession, PanicEvent, Sample, Session, decode_sessions, encode_sessions,
    generate_session_name,
};
pub use signal::{SignalStatus, stress_from_bpm};
pub use simulator::{BiometricSimulator, Reading};
pub use storage::{MemoryStorage, SessionStorage, StorageError};
pub use time::{Clock, ManualClock, SystemClock, format_date, format_duration, now_unix_millis};
