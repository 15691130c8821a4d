//! Preference persistence
//!
//! Stores user preferences in `~/.config/pagehint/config.yaml`. The file
//! is optional and forgiving: a missing or malformed file, or an unknown
//! trigger key name, falls back to the defaults with a warning — the
//! overlay must keep working on every page regardless of configuration
//! state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::keys::{parse_key_name, Key};

/// Shortcut characters ordered by typing ease. Keys that look similar
/// have been removed (I, l and 1, 0 and O).
pub const DEFAULT_ALPHABET: &str = "fjdkeisawoghurcmnvtbyqzxpFJDKESLAWGHURCMNVTBYQZXP23456789";

/// Engine-facing preferences, read-only during an activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Tapping this key arms/disarms the overlay
    pub trigger: Key,
    /// Tapping this key arms the overlay in "open in new tab" mode
    pub trigger_newtab: Key,
    /// Shortcut alphabet, ordered by typing ease
    pub alphabet: String,
    /// Restrict sequences to a single character
    pub single_char_only: bool,
    /// Only honor the new-tab trigger while the overlay is already up
    pub newtab_only_when_triggered: bool,
    /// Bind declared shortcuts even when they collide prefix/suffix-wise
    pub declared_shortcuts_bypass_collisions: bool,
    /// Serialized override rule list (JSON), evaluated per activation
    pub override_rules: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            trigger: Key::Control,
            trigger_newtab: Key::Alt,
            alphabet: DEFAULT_ALPHABET.to_string(),
            single_char_only: true,
            newtab_only_when_triggered: false,
            declared_shortcuts_bypass_collisions: false,
            override_rules: "[]".to_string(),
        }
    }
}

impl Preferences {
    /// Longest sequence the allocator may generate
    pub fn max_sequence_length(&self) -> usize {
        if self.single_char_only {
            1
        } else {
            3
        }
    }

    /// Load preferences from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        Self::load_from_path(&path)
    }

    /// Load from an explicit path, falling back to defaults on any error
    pub fn load_from_path(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse_yaml(&content) {
                Ok(prefs) => {
                    tracing::info!("Loaded preferences from {}", path.display());
                    prefs
                }
                Err(e) => {
                    tracing::warn!("Failed to parse preferences at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read preferences at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse preferences from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let file: PreferencesFile = serde_yaml::from_str(content)?;
        Ok(file.into_preferences())
    }

    /// Save preferences to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(&PreferencesFile::from_preferences(self))
            .map_err(|e| format!("Failed to serialize preferences: {}", e))?;

        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write preferences to {}: {}", path.display(), e))?;

        tracing::info!("Saved preferences to {}", path.display());
        Ok(())
    }
}

/// On-disk form of the preferences
#[derive(Debug, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(default = "default_trigger")]
    trigger: String,
    #[serde(default = "default_trigger_newtab")]
    trigger_newtab: String,
    #[serde(default = "default_shortcut_keys")]
    shortcut_keys: String,
    #[serde(default = "default_true")]
    single_char_only: bool,
    #[serde(default)]
    newtab_only_when_triggered: bool,
    #[serde(default)]
    declared_shortcuts_bypass_collisions: bool,
    #[serde(default = "default_override_rules")]
    override_rules: String,
}

fn default_trigger() -> String {
    "control".to_string()
}

fn default_trigger_newtab() -> String {
    "alt".to_string()
}

fn default_shortcut_keys() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_true() -> bool {
    true
}

fn default_override_rules() -> String {
    "[]".to_string()
}

impl PreferencesFile {
    fn into_preferences(self) -> Preferences {
        let defaults = Preferences::default();
        Preferences {
            trigger: parse_trigger(&self.trigger, defaults.trigger),
            trigger_newtab: parse_trigger(&self.trigger_newtab, defaults.trigger_newtab),
            alphabet: self.shortcut_keys,
            single_char_only: self.single_char_only,
            newtab_only_when_triggered: self.newtab_only_when_triggered,
            declared_shortcuts_bypass_collisions: self.declared_shortcuts_bypass_collisions,
            override_rules: self.override_rules,
        }
    }

    fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            trigger: key_name(prefs.trigger),
            trigger_newtab: key_name(prefs.trigger_newtab),
            shortcut_keys: prefs.alphabet.clone(),
            single_char_only: prefs.single_char_only,
            newtab_only_when_triggered: prefs.newtab_only_when_triggered,
            declared_shortcuts_bypass_collisions: prefs.declared_shortcuts_bypass_collisions,
            override_rules: prefs.override_rules.clone(),
        }
    }
}

fn parse_trigger(name: &str, fallback: Key) -> Key {
    match parse_key_name(name) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("{}; falling back to {}", e, fallback);
            fallback
        }
    }
}

fn key_name(key: Key) -> String {
    key.to_string().to_lowercase()
}
