use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::{Result, StoreError};
use crate::store::Store;

pub const DEFAULT_PROFILE: &str = "default";

/// Default base directory for all Fear Meter storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".fear-meter")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Sanitize a profile name for use as a filename.
fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Profile name as used on disk; blank names fall back to `default`.
fn resolve_profile(name: Option<&str>) -> String {
    name.map(sanitize_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Per-profile storage.
///
/// Layout:
/// ```text
/// ~/.fear-meter/
/// └── profiles/
///     ├── default.db
///     └── <profile>.db
/// ```
pub struct ProfileStore {
    store: Store,
    profile: String,
    path: Option<PathBuf>,
}

impl ProfileStore {
    /// Open a profile's database, creating directories as needed.
    /// `base_dir` overrides `~/.fear-meter`.
    pub fn open(profile: Option<&str>, base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);
        let profiles_dir = base.join("profiles");

        fs::create_dir_all(&profiles_dir).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", profiles_dir.display()))
        })?;

        let profile = resolve_profile(profile);
        let path = profiles_dir.join(format!("{profile}.db"));
        tracing::debug!(profile = %profile, path = %path.display(), "opening profile store");
        let store = Store::open(&path)?;

        Ok(Self {
            store,
            profile,
            path: Some(path),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
            profile: "test".to_string(),
            path: None,
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Database file backing this profile; `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Hand the underlying store to a session history.
    pub fn into_store(self) -> Store {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("night-owl_2"), "night-owl_2");
        assert_eq!(sanitize_name("a b/c"), "a_b_c");
        assert_eq!(sanitize_name("../etc"), "___etc");
    }

    #[test]
    fn test_resolve_profile_defaults() {
        assert_eq!(resolve_profile(None), "default");
        assert_eq!(resolve_profile(Some("   ")), "default");
        assert_eq!(resolve_profile(Some("alice")), "alice");
    }

    #[test]
    fn test_open_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let ps = ProfileStore::open(Some("alice"), Some(dir.path())).unwrap();

        assert_eq!(ps.profile(), "alice");
        let expected = dir.path().join("profiles").join("alice.db");
        assert_eq!(ps.path(), Some(expected.as_path()));
        assert!(expected.exists());
    }

    #[test]
    fn test_profiles_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let a = ProfileStore::open(Some("a"), Some(dir.path())).unwrap();
        let b = ProfileStore::open(Some("b"), Some(dir.path())).unwrap();

        let muted = Settings {
            haptic_enabled: false,
            ..Settings::default()
        };
        a.store().save_settings(&muted).unwrap();

        assert_eq!(a.store().load_settings().unwrap(), muted);
        assert_eq!(b.store().load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let ps = ProfileStore::open(None, Some(dir.path())).unwrap();
            ps.store().set_value("k", "v").unwrap();
        }
        let ps = ProfileStore::open(None, Some(dir.path())).unwrap();
        assert_eq!(ps.profile(), "default");
        assert_eq!(ps.store().get_value("k").unwrap().as_deref(), Some("v"));
    }
}
