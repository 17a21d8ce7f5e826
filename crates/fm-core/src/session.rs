use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Display names drawn at random for new sessions.
pub const SESSION_NAMES: [&str; 10] = [
    "Night Terror",
    "Shadow Encounter",
    "Dark Vision",
    "Fear Response",
    "Stress Event",
    "Panic Episode",
    "Anxiety Spike",
    "Horror Moment",
    "Dread Instance",
    "Terror Wave",
];

pub fn generate_session_name(rng: &mut impl Rng) -> String {
    SESSION_NAMES
        .choose(rng)
        .copied()
        .unwrap_or(SESSION_NAMES[0])
        .to_string()
}

/// One timestamped reading in a ring buffer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix milliseconds
    pub timestamp: i64,
    pub value: f64,
}

/// A moment where BPM and stress both crossed the panic thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanicEvent {
    pub timestamp: i64,
    pub bpm: f64,
    pub stress: f64,
}

/// Identity of the session currently being recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveSession {
    pub id: i64,
    pub name: String,
    pub start_time: i64,
}

/// Immutable record of a completed session, as persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub date: String,
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub duration_text: String,
    #[serde(default)]
    pub avg_bpm: u32,
    #[serde(default)]
    pub max_bpm: f64,
    #[serde(default)]
    pub max_stress: f64,
    #[serde(default)]
    pub bpm_history: Vec<Sample>,
    #[serde(default)]
    pub panic_events: Vec<PanicEvent>,
    #[serde(default)]
    pub has_panic_event: bool,
    #[serde(default)]
    pub panic_count: usize,
}

impl Session {
    /// Display name for listings.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Session"
        } else {
            &self.name
        }
    }
}

/// Encode sessions in the persisted wire shape (camelCase JSON array).
pub fn encode_sessions(sessions: &[Session]) -> serde_json::Result<String> {
    serde_json::to_string(sessions)
}

/// Decode the persisted wire shape. Blank input is an empty list.
pub fn decode_sessions(raw: &str) -> serde_json::Result<Vec<Session>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}
