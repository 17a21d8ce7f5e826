//! Adaptive haptic feedback: one-shot patterns plus two self-rescheduling
//! continuous modes (BPM-synced heartbeat and tension build).
//!
//! At most one continuous chain runs at a time. Each chain owns an `active`
//! flag checked before every reschedule and at the top of every tick, plus a
//! cancellation token that wakes a pending sleep so `stop()` takes effect
//! without waiting out the current beat.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::constants::{DEFAULT_BPM, TENSION_BASE_INTERVAL_MS, TENSION_PULSE_MS};
use crate::haptic::device::VibrationDevice;
use crate::haptic::patterns::{
    BpmIntensity, HapticPattern, JUMP_SCARE_PULSE, STOP_PULSE, fear_level_pulse,
};

const MIN_TENSION_PERIOD: Duration = Duration::from_millis(1);

/// One beat at `bpm`, rounded to whole milliseconds.
fn beat_interval(bpm: f64) -> Duration {
    Duration::from_millis((60_000.0 / bpm).round() as u64)
}

/// Where a BPM-synced chain reads the heart rate on each beat.
#[derive(Clone)]
pub enum BpmSource {
    Fixed(f64),
    Producer(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl BpmSource {
    pub fn producer(f: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        BpmSource::Producer(Arc::new(f))
    }

    pub fn resolve(&self) -> f64 {
        match self {
            BpmSource::Fixed(bpm) => *bpm,
            BpmSource::Producer(f) => f(),
        }
    }
}

impl From<f64> for BpmSource {
    fn from(bpm: f64) -> Self {
        BpmSource::Fixed(bpm)
    }
}

impl fmt::Debug for BpmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BpmSource::Fixed(bpm) => f.debug_tuple("Fixed").field(bpm).finish(),
            BpmSource::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainMode {
    BpmSync,
    Tension,
}

/// State shared between the synchronizer and its in-flight chain task.
struct Engine {
    device: Arc<dyn VibrationDevice>,
    supported: bool,
    enabled: AtomicBool,
    last_bpm: AtomicU64,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Engine {
    fn available(&self) -> bool {
        self.supported && self.enabled.load(Ordering::SeqCst)
    }

    fn vibrate(&self, pattern: &[u32]) -> bool {
        if !self.available() {
            return false;
        }
        match self.device.vibrate(pattern) {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("haptic feedback failed: {e}");
                false
            }
        }
    }

    fn sync_with_bpm(&self, bpm: f64) -> Option<Duration> {
        if !self.available() {
            return None;
        }
        if !bpm.is_finite() || bpm <= 0.0 {
            tracing::debug!("ignoring invalid bpm {bpm}");
            return None;
        }
        self.last_bpm.store(bpm.to_bits(), Ordering::SeqCst);

        let beat = beat_interval(bpm);
        let intensity = BpmIntensity::classify(bpm);
        let should_pulse = !intensity.is_intermittent()
            || self
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .random_bool(0.5);
        if should_pulse {
            self.vibrate(intensity.pulse());
        }
        Some(beat)
    }
}

struct Chain {
    mode: ChainMode,
    active: Arc<AtomicBool>,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

impl Chain {
    fn is_live(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

pub struct HapticSynchronizer {
    engine: Arc<Engine>,
    chain: Mutex<Option<Chain>>,
}

impl HapticSynchronizer {
    /// Probes `device` once; the result holds for this synchronizer's lifetime.
    pub fn new(device: Arc<dyn VibrationDevice>, enabled: bool) -> Self {
        Self::with_rng(device, enabled, SmallRng::from_os_rng())
    }

    /// Like `new`, with the random source used for sub-threshold pulse
    /// suppression supplied by the caller.
    pub fn with_rng(
        device: Arc<dyn VibrationDevice>,
        enabled: bool,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        let supported = device.is_supported();
        Self {
            engine: Arc::new(Engine {
                device,
                supported,
                enabled: AtomicBool::new(enabled),
                last_bpm: AtomicU64::new(DEFAULT_BPM.to_bits()),
                rng: Mutex::new(Box::new(rng)),
            }),
            chain: Mutex::new(None),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.engine.supported
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.enabled.load(Ordering::SeqCst)
    }

    /// A running chain that next observes the feature disabled ends itself.
    pub fn set_enabled(&self, enabled: bool) {
        self.engine.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether a continuous chain is currently scheduled.
    pub fn is_active(&self) -> bool {
        self.active_mode().is_some()
    }

    pub fn active_mode(&self) -> Option<ChainMode> {
        self.chain
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|c| c.is_live())
            .map(|c| c.mode)
    }

    /// Last BPM passed to `sync_with_bpm` (72 before the first call).
    pub fn last_bpm(&self) -> f64 {
        f64::from_bits(self.engine.last_bpm.load(Ordering::SeqCst))
    }

    /// Fire a one-shot pattern. Returns whether the platform accepted it.
    pub fn vibrate(&self, pattern: &[u32]) -> bool {
        self.engine.vibrate(pattern)
    }

    /// Cancel any continuous chain and silence the motor. Safe to call anytime.
    pub fn stop(&self) {
        if !self.engine.supported {
            return;
        }
        if let Some(chain) = self
            .chain
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            chain.active.store(false, Ordering::SeqCst);
            chain.cancel.cancel();
            tracing::debug!(mode = ?chain.mode, "haptic chain stopped");
        }
        if let Err(e) = self.engine.device.vibrate(&STOP_PULSE) {
            tracing::debug!("stop pulse failed: {e}");
        }
    }

    pub fn stop_bpm_sync(&self) {
        self.stop();
    }

    pub fn trigger(&self, pattern: HapticPattern) -> bool {
        self.vibrate(pattern.steps())
    }

    /// Look up a catalogue pattern by name. Unknown names do nothing.
    pub fn trigger_pattern(&self, name: &str) -> bool {
        match HapticPattern::from_name(name) {
            Some(pattern) => self.trigger(pattern),
            None => {
                tracing::debug!("unknown haptic pattern '{name}'");
                false
            }
        }
    }

    /// Pulse once for the given heart rate and return the beat interval
    /// (`60000 / bpm` ms), whether or not a pulse fired. `None` when
    /// haptics are unavailable or `bpm` is not a positive number.
    pub fn sync_with_bpm(&self, bpm: f64) -> Option<Duration> {
        self.engine.sync_with_bpm(bpm)
    }

    /// Heartbeat pulse at `bpm`, or at the last synced BPM.
    pub fn heartbeat(&self, bpm: Option<f64>) -> Option<Duration> {
        self.sync_with_bpm(bpm.unwrap_or_else(|| self.last_bpm()))
    }

    /// Begin pulsing in step with the heart rate, re-reading `source` on
    /// every beat. No-op (returns false) if a chain is already running.
    ///
    /// An invalid reading skips that beat's pulse and keeps the previous
    /// interval (72 BPM before the first valid one). The chain only ends
    /// via `stop()` or when haptics are disabled.
    pub fn start_bpm_sync(&self, source: impl Into<BpmSource>) -> bool {
        let source = source.into();
        let mut interval = beat_interval(DEFAULT_BPM);
        self.start_chain(ChainMode::BpmSync, move |engine| {
            if !engine.available() {
                return None;
            }
            if let Some(beat) = engine.sync_with_bpm(source.resolve()) {
                interval = beat;
            }
            Some(interval)
        })
    }

    /// Pulse `30 * intensity` ms every `300 / intensity` ms until stopped.
    pub fn start_tension(&self, intensity: f64) -> bool {
        if !intensity.is_finite() || intensity <= 0.0 {
            tracing::debug!("ignoring invalid tension intensity {intensity}");
            return false;
        }
        let secs = TENSION_BASE_INTERVAL_MS / intensity / 1000.0;
        let Ok(period) = Duration::try_from_secs_f64(secs) else {
            tracing::debug!("tension intensity {intensity} gives no usable period");
            return false;
        };
        let period = period.max(MIN_TENSION_PERIOD);
        let pulse = [(TENSION_PULSE_MS * intensity).round() as u32];
        self.start_chain(ChainMode::Tension, move |engine| {
            if !engine.available() {
                return None;
            }
            engine.vibrate(&pulse);
            Some(period)
        })
    }

    /// One-shot pulse scaled to a 0–100 fear score.
    pub fn trigger_fear_level(&self, level: f64) -> bool {
        if !level.is_finite() {
            return false;
        }
        self.vibrate(fear_level_pulse(level))
    }

    pub fn trigger_jump_scare(&self) -> bool {
        self.vibrate(&JUMP_SCARE_PULSE)
    }

    pub fn tap(&self) -> bool {
        self.trigger(HapticPattern::Tap)
    }

    pub fn success(&self) -> bool {
        self.trigger(HapticPattern::Success)
    }

    pub fn error(&self) -> bool {
        self.trigger(HapticPattern::Error)
    }

    pub fn warning(&self) -> bool {
        self.trigger(HapticPattern::Warning)
    }

    /// Run the first tick now, then schedule the rest on the current tokio
    /// runtime. `tick` returns the delay until the next tick, or `None` to end.
    fn start_chain<F>(&self, mode: ChainMode, mut tick: F) -> bool
    where
        F: FnMut(&Engine) -> Option<Duration> + Send + 'static,
    {
        if !self.engine.available() {
            return false;
        }
        let mut slot = self.chain.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = slot.as_ref()
            && running.is_live()
        {
            tracing::debug!(requested = ?mode, running = ?running.mode, "haptic chain already active");
            return false;
        }
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no async runtime available; continuous haptics disabled");
            return false;
        };

        let Some(first_delay) = tick(self.engine.as_ref()) else {
            return false;
        };

        let active = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();
        let task = handle.spawn(run_chain(
            Arc::clone(&self.engine),
            Arc::clone(&active),
            cancel.clone(),
            first_delay,
            tick,
        ));
        *slot = Some(Chain {
            mode,
            active,
            cancel,
            _task: task,
        });
        tracing::debug!(?mode, "haptic chain started");
        true
    }
}

impl Drop for HapticSynchronizer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_chain<F>(
    engine: Arc<Engine>,
    active: Arc<AtomicBool>,
    cancel: CancellationToken,
    mut delay: Duration,
    mut tick: F,
) where
    F: FnMut(&Engine) -> Option<Duration> + Send + 'static,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        if !active.load(Ordering::SeqCst) {
            break;
        }
        match tick(engine.as_ref()) {
            Some(next) => delay = next,
            None => break,
        }
    }
    active.store(false, Ordering::SeqCst);
}
