//! Where the shared countdown database and settings live.
//!
//! The app and its widgets must agree on one location. By default that is
//! `dirs::data_dir()/remaining/`; set `REMAINING_DATA_DIR` to point both at
//! another shared directory (e.g. an app-group container).

use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "REMAINING_DATA_DIR";
pub const DATABASE_FILE: &str = "Remaining.sqlite";
pub const SETTINGS_FILE: &str = "settings.json";

#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("remaining"))
        .unwrap_or_else(|| PathBuf::from("/tmp/remaining-data"))
}

#[must_use]
pub fn database_path() -> PathBuf {
    data_dir().join(DATABASE_FILE)
}

/// Settings sit next to whichever database is in use.
#[must_use]
pub fn settings_path_for(database: &Path) -> PathBuf {
    database
        .parent()
        .map(|dir| dir.join(SETTINGS_FILE))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
}
