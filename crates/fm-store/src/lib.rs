//! SQLite persistence for Fear Meter: session history and user settings,
//! one database per profile.

pub mod error;
pub mod profile;
pub mod schema;
pub mod settings;
pub mod store;

pub use error::{Result, StoreError};
pub use profile::{DEFAULT_PROFILE, ProfileStore, default_base_dir};
pub use settings::Settings;
pub use store::Store;
