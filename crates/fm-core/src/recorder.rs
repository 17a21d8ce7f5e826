//! Session lifecycle: Idle → Recording → Idle.
//!
//! The recorder owns the live accumulators for at most one session and the
//! bounded history of completed ones. Calls made in the wrong state are
//! silent no-ops.

use std::sync::Arc;

use rand::Rng;

use crate::constants::{
    HISTORY_CAPACITY, PANIC_BPM_THRESHOLD, PANIC_COOLDOWN_MS, PANIC_PULSE, PANIC_STRESS_THRESHOLD,
};
use crate::haptic::VibrationDevice;
use crate::history::SessionHistory;
use crate::ring::RingBuffer;
use crate::session::{ActiveSession, PanicEvent, Sample, Session, generate_session_name};
use crate::time::{Clock, SystemClock, format_date, format_duration};

/// Accumulators for the session in progress.
#[derive(Debug)]
pub struct Recording {
    session: ActiveSession,
    bpm_history: RingBuffer<Sample>,
    stress_history: RingBuffer<Sample>,
    panic_events: Vec<PanicEvent>,
    peak_bpm: f64,
    peak_stress: f64,
    sum_bpm: f64,
    sample_count: u64,
}

impl Recording {
    fn new(session: ActiveSession) -> Self {
        Self {
            session,
            bpm_history: RingBuffer::new(HISTORY_CAPACITY),
            stress_history: RingBuffer::new(HISTORY_CAPACITY),
            panic_events: Vec::new(),
            peak_bpm: 0.0,
            peak_stress: 0.0,
            sum_bpm: 0.0,
            sample_count: 0,
        }
    }

    pub fn session(&self) -> &ActiveSession {
        &self.session
    }

    pub fn bpm_history(&self) -> &RingBuffer<Sample> {
        &self.bpm_history
    }

    pub fn stress_history(&self) -> &RingBuffer<Sample> {
        &self.stress_history
    }

    pub fn panic_events(&self) -> &[PanicEvent] {
        &self.panic_events
    }

    pub fn peak_bpm(&self) -> f64 {
        self.peak_bpm
    }

    pub fn peak_stress(&self) -> f64 {
        self.peak_stress
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Rounded mean BPM over every sample, 0 before the first one.
    pub fn avg_bpm(&self) -> u32 {
        if self.sample_count == 0 {
            return 0;
        }
        (self.sum_bpm / self.sample_count as f64).round().max(0.0) as u32
    }

    /// Apply the panic rule to a sample taken at `timestamp`.
    fn detect_panic(&mut self, timestamp: i64, bpm: f64, stress: f64) -> Option<PanicEvent> {
        if bpm <= PANIC_BPM_THRESHOLD || stress <= PANIC_STRESS_THRESHOLD {
            return None;
        }
        if let Some(last) = self.panic_events.last()
            && timestamp - last.timestamp <= PANIC_COOLDOWN_MS
        {
            return None;
        }
        let event = PanicEvent {
            timestamp,
            bpm,
            stress,
        };
        self.panic_events.push(event);
        Some(event)
    }

    fn complete(self, end_time: i64) -> Session {
        let duration = end_time - self.session.start_time;
        let panic_count = self.panic_events.len();
        let avg_bpm = self.avg_bpm();
        Session {
            id: self.session.id,
            date: format_date(self.session.start_time),
            name: self.session.name,
            start_time: self.session.start_time,
            end_time,
            duration,
            duration_text: format_duration(duration),
            avg_bpm,
            max_bpm: self.peak_bpm,
            max_stress: self.peak_stress,
            bpm_history: self.bpm_history.to_vec(),
            has_panic_event: panic_count > 0,
            panic_count,
            panic_events: self.panic_events,
        }
    }
}

pub struct SessionRecorder {
    clock: Arc<dyn Clock>,
    history: SessionHistory,
    active: Option<Recording>,
    panic_alert: Option<Arc<dyn VibrationDevice>>,
    last_id: i64,
}

impl SessionRecorder {
    pub fn new(history: SessionHistory) -> Self {
        Self::with_clock(history, Arc::new(SystemClock))
    }

    pub fn with_clock(history: SessionHistory, clock: Arc<dyn Clock>) -> Self {
        let last_id = history.max_id().unwrap_or(i64::MIN);
        Self {
            clock,
            history,
            active: None,
            panic_alert: None,
            last_id,
        }
    }

    /// Pulse `device` whenever a panic event is recorded.
    pub fn with_panic_alert(mut self, device: Arc<dyn VibrationDevice>) -> Self {
        self.panic_alert = Some(device);
        self
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Live view of the session in progress.
    pub fn current(&self) -> Option<&Recording> {
        self.active.as_ref()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn sessions(&self) -> &[Session] {
        self.history.sessions()
    }

    /// Begin a new session. Any session already in progress is discarded
    /// unsaved.
    pub fn start_session(&mut self, rng: &mut impl Rng) -> &ActiveSession {
        let now = self.clock.now_millis();
        if let Some(previous) = self.active.take() {
            tracing::warn!(
                id = previous.session.id,
                samples = previous.sample_count,
                "discarding unfinished session"
            );
        }

        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;
        let session = ActiveSession {
            id,
            name: generate_session_name(rng),
            start_time: now,
        };
        tracing::debug!(id, name = %session.name, "session started");
        &self.active.insert(Recording::new(session)).session
    }

    /// Feed one sample. Returns the panic event this sample produced, if any.
    pub fn record_data_point(&mut self, bpm: f64, stress: f64) -> Option<PanicEvent> {
        let Some(rec) = self.active.as_mut() else {
            tracing::debug!("sample ignored: no active session");
            return None;
        };
        if !bpm.is_finite() || !stress.is_finite() {
            tracing::debug!("sample ignored: non-finite bpm={bpm} stress={stress}");
            return None;
        }

        let timestamp = self.clock.now_millis();
        rec.bpm_history.push(Sample {
            timestamp,
            value: bpm,
        });
        rec.stress_history.push(Sample {
            timestamp,
            value: stress,
        });
        rec.peak_bpm = rec.peak_bpm.max(bpm);
        rec.peak_stress = rec.peak_stress.max(stress);
        rec.sum_bpm += bpm;
        rec.sample_count += 1;

        let event = rec.detect_panic(timestamp, bpm, stress)?;
        tracing::info!(bpm, stress, "panic event recorded");
        self.alert_panic();
        Some(event)
    }

    /// Finish the session in progress and archive it. `None` when idle.
    pub fn end_session(&mut self) -> Option<Session> {
        let Some(rec) = self.active.take() else {
            tracing::debug!("end_session ignored: no active session");
            return None;
        };
        let session = rec.complete(self.clock.now_millis());
        tracing::debug!(
            id = session.id,
            duration = %session.duration_text,
            panics = session.panic_count,
            "session completed"
        );
        self.history.insert(session.clone());
        Some(session)
    }

    /// Drop every stored session. An in-progress session is unaffected.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn delete_session(&mut self, id: i64) -> bool {
        self.history.delete(id)
    }

    fn alert_panic(&self) {
        let Some(device) = &self.panic_alert else {
            return;
        };
        if !device.is_supported() {
            return;
        }
        if let Err(e) = device.vibrate(&PANIC_PULSE) {
            tracing::debug!("panic pulse failed: {e}");
        }
    }
}
