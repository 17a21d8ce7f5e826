use serde::{Deserialize, Serialize};

/// User preferences persisted alongside the session history.
///
/// Keys absent from the stored object take their default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub haptic_enabled: bool,
    pub show_disclaimer: bool,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: false,
            haptic_enabled: true,
            show_disclaimer: true,
            language: "EN".to_string(),
        }
    }
}
