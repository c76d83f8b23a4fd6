//! Process-wide preferences. Loaded once (persisted value or defaults) and
//! written back on every change.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, read_json, write_json};

const KEY_PREFERENCES: &str = "tally_preferences";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
}

pub struct PreferenceStore<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    current: Preferences,
}

impl<'a, S: KeyValueStore + ?Sized> PreferenceStore<'a, S> {
    pub fn load(store: &'a S) -> Self {
        let current = read_json(store, KEY_PREFERENCES);
        Self { store, current }
    }

    pub fn get(&self) -> &Preferences {
        &self.current
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme> {
        self.current.theme = theme;
        write_json(self.store, KEY_PREFERENCES, &self.current)?;
        Ok(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.current.theme.toggled())
    }
}
