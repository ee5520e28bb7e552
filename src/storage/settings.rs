//! Settings storage
//!
//! Manages persistence of the chat simulator's tunables.

use crate::conversation::reply::{default_catalog, FALLBACK_REPLY};
use crate::storage::{get_data_dir, StorageError};
use crate::ui::viewport::{Viewport, DEFAULT_INPUT_BAR_HEIGHT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

/// Longest reply delay accepted from a settings file
const MAX_REPLY_DELAY_MS: u64 = 60_000;

pub const DEFAULT_WELCOME: &str = "Olá! Bem-vindo ao chat. Como posso ajudar?";

/// Chat settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Delay before a canned reply shows up, in milliseconds
    pub reply_delay_ms: u64,
    /// Replies picked from at random
    pub reply_catalog: Vec<String>,
    /// Reply used when the catalog is empty
    pub fallback_reply: String,
    /// Seed the conversation with a welcome message
    pub seed_welcome: bool,
    pub welcome_message: String,
    /// Fixed seed for reply selection (random when unset)
    pub reply_seed: Option<u64>,
    /// Screen size in points
    pub screen_width: f64,
    pub screen_height: f64,
    pub input_bar_height: f64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1000,
            reply_catalog: default_catalog(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            seed_welcome: true,
            welcome_message: DEFAULT_WELCOME.to_string(),
            reply_seed: None,
            screen_width: 390.0,
            screen_height: 844.0,
            input_bar_height: DEFAULT_INPUT_BAR_HEIGHT,
        }
    }
}

impl ChatSettings {
    /// Validate settings values
    ///
    /// Ensures all parameters are within acceptable ranges.
    pub fn validate(&mut self) {
        let defaults = Self::default();

        self.reply_delay_ms = self.reply_delay_ms.min(MAX_REPLY_DELAY_MS);

        self.reply_catalog = self
            .reply_catalog
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.reply_catalog.is_empty() {
            tracing::warn!("No usable replies configured, replies will use the fallback text");
        }

        if self.fallback_reply.trim().is_empty() {
            self.fallback_reply = defaults.fallback_reply;
        }

        if self.welcome_message.trim().is_empty() {
            self.seed_welcome = false;
        }

        if !self.screen_width.is_finite() || self.screen_width <= 0.0 {
            self.screen_width = defaults.screen_width;
        }
        if !self.screen_height.is_finite() || self.screen_height <= 0.0 {
            self.screen_height = defaults.screen_height;
        }
        if !self.input_bar_height.is_finite() || self.input_bar_height < 0.0 {
            self.input_bar_height = defaults.input_bar_height;
        }
        self.input_bar_height = self.input_bar_height.min(self.screen_height);
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.screen_width, self.screen_height).with_input_bar(self.input_bar_height)
    }
}

/// Get the settings file path
pub fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from the data directory
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> ChatSettings {
    match get_settings_path() {
        Ok(path) => load_settings_from(&path),
        Err(e) => {
            tracing::warn!("Failed to locate settings, using defaults: {}", e);
            ChatSettings::default()
        }
    }
}

/// Load settings from a specific file, falling back to defaults
pub fn load_settings_from(path: &Path) -> ChatSettings {
    match load_settings_internal(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            ChatSettings::default()
        }
    }
}

/// Internal settings loading with error propagation
fn load_settings_internal(path: &Path) -> Result<ChatSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(ChatSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: ChatSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Save settings to the data directory
pub fn save_settings(settings: &ChatSettings) -> Result<(), StorageError> {
    save_settings_to(&get_settings_path()?, settings)
}

pub fn save_settings_to(path: &Path, settings: &ChatSettings) -> Result<(), StorageError> {
    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to {}", path.display());
    Ok(())
}
