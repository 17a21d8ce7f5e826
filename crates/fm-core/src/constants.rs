/// Ring buffer capacity for per-session BPM and stress history
pub const HISTORY_CAPACITY: usize = 100;

/// Maximum number of completed sessions retained in history
pub const MAX_SESSIONS: usize = 50;

/// Panic rule: BPM must exceed this value
pub const PANIC_BPM_THRESHOLD: f64 = 120.0;

/// Panic rule: stress must exceed this value
pub const PANIC_STRESS_THRESHOLD: f64 = 85.0;

/// Minimum spacing between two recorded panic events (ms)
pub const PANIC_COOLDOWN_MS: i64 = 5000;

/// Pulse emitted by the recorder when a panic event is logged
pub const PANIC_PULSE: [u32; 3] = [100, 50, 100];

/// Storage key for the persisted session list
pub const SESSIONS_KEY: &str = "fear_meter_sessions";

/// Storage key for persisted user settings
pub const SETTINGS_KEY: &str = "fear_meter_settings";

/// Haptic BPM band boundaries
pub const BPM_NORMAL: f64 = 90.0;
pub const BPM_ELEVATED: f64 = 110.0;
pub const BPM_HIGH: f64 = 130.0;
pub const BPM_CRITICAL: f64 = 150.0;

/// BPM assumed by `heartbeat()` before any sync call
pub const DEFAULT_BPM: f64 = 72.0;

/// Tension mode: base repetition period (ms) at intensity 1
pub const TENSION_BASE_INTERVAL_MS: f64 = 300.0;

/// Tension mode: pulse length (ms) at intensity 1
pub const TENSION_PULSE_MS: f64 = 30.0;

/// Monitor signal thresholds (sampler side, not the recorder panic rule)
pub const SIGNAL_CRITICAL_BPM: f64 = 110.0;
pub const SIGNAL_CRITICAL_STRESS: f64 = 75.0;
pub const SIGNAL_UNSTABLE_BPM: f64 = 95.0;
pub const SIGNAL_UNSTABLE_STRESS: f64 = 50.0;

/// BPM range mapped linearly onto stress 0..=100
pub const STRESS_MIN_BPM: f64 = 60.0;
pub const STRESS_MAX_BPM: f64 = 140.0;
