use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::gradient::{Gradient, DEFAULT_GRADIENT};
use crate::widget::ViewStyle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    #[serde(default)]
    pub view_style: ViewStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    /// `chrono` format string for dates in the list.
    pub date_format: String,
    /// Gradient given to new countdowns when none is chosen.
    pub default_gradient: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: "%d.%m.%Y".into(),
            default_gradient: DEFAULT_GRADIENT.into(),
        }
    }
}

/// Whether `format` is a usable `chrono` strftime string.
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

impl DisplaySettings {
    pub fn default_gradient(&self) -> &'static Gradient {
        Gradient::lookup(&self.default_gradient)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    widget: WidgetSettings,
    #[serde(default)]
    display: DisplaySettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn widget(&self) -> WidgetSettings {
        self.read().widget.clone()
    }

    pub fn display(&self) -> DisplaySettings {
        self.read().display.clone()
    }

    pub fn update_widget(&self, settings: WidgetSettings) -> Result<()> {
        let mut guard = self.write();
        guard.widget = settings;
        self.persist(&guard)
    }

    pub fn update_display(&self, settings: DisplaySettings) -> Result<()> {
        let mut guard = self.write();
        guard.display = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
