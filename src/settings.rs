//! Page preferences
//!
//! Persisted in LocalStorage separately from the gallery.

use serde::{Deserialize, Serialize};

use crate::platform;

/// Colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    /// Label for the toggle button
    pub fn icon(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "\u{1F319}",
            ThemeMode::Light => "\u{2600}\u{FE0F}",
        }
    }
}

/// Page settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: ThemeMode,
}

impl Settings {
    /// LocalStorage key, holds the bare theme name
    const STORAGE_KEY: &'static str = "mode";

    pub fn load() -> Self {
        let theme = platform::storage_get(Self::STORAGE_KEY)
            .and_then(|s| ThemeMode::from_str(&s))
            .unwrap_or_default();
        log::info!("Theme: {}", theme.as_str());
        Self { theme }
    }

    pub fn save(&self) {
        platform::storage_set(Self::STORAGE_KEY, self.theme.as_str());
    }

    /// Flip the theme and persist it
    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggled();
        self.save();
        self.theme
    }
}
