mod pattern;

use std::path::Path;

use bevy::prelude::*;
pub use pattern::{TrailPattern, parse_hex_color};
use serde::Deserialize;

use crate::error::SettingsError;

/// How captured snapshots are colored.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrailColorMode {
  /// Flat color sampled from [`TrailSettings::pattern`] at capture time.
  #[default]
  Pattern,
  /// Flat color taken from the character's hair.
  HairColor,
  /// Untinted copy of the pose.
  OnionSkin,
}

impl TrailColorMode {
  /// Silhouette modes flatten each cell to white coverage before tinting.
  #[inline]
  pub fn is_silhouette(self) -> bool {
    !matches!(self, Self::OnionSkin)
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrailDebugSettings {
  /// Draw the raw atlas texture with its cell grid.
  pub render_atlas: bool,
  /// Display scale of the atlas overlay.
  pub scale: f32,
}

impl Default for TrailDebugSettings {
  fn default() -> Self {
    Self {
      render_atlas: false,
      scale: 0.5,
    }
  }
}

/// Trail configuration, read by the capture, lifetime and presenter systems.
///
/// Hosts own this resource; changing `color_mode` clears live trails.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrailSettings {
  pub enabled: bool,
  /// Seconds between captures.
  pub interval: f32,
  /// Snapshot lifetime in seconds.
  pub duration: f32,
  /// Global ghost opacity, `0..=1`.
  pub opacity: f32,
  pub color_mode: TrailColorMode,
  pub pattern: TrailPattern,
  /// Suppress the host's own dash trails while ours are active.
  pub hide_host_trails: bool,
  /// Fade on real time, ignoring pause and time scale.
  pub use_raw_time: bool,
  pub debug: TrailDebugSettings,
}

impl Default for TrailSettings {
  fn default() -> Self {
    Self {
      enabled: true,
      interval: 0.1,
      duration: 0.5,
      opacity: 0.5,
      color_mode: TrailColorMode::default(),
      pattern: TrailPattern::default(),
      hide_host_trails: false,
      use_raw_time: false,
      debug: TrailDebugSettings::default(),
    }
  }
}

impl TrailSettings {
  /// Parses settings from TOML. Missing keys take their defaults.
  pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
    Ok(toml::from_str(source)?)
  }

  /// Reads and parses a TOML settings file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
    let source = std::fs::read_to_string(path)?;
    Self::from_toml_str(&source)
  }
}

/// Run condition for host trail effects: false while our trails replace them.
pub fn host_trails_visible(settings: Option<Res<TrailSettings>>) -> bool {
  settings.is_none_or(|s| !(s.enabled && s.hide_host_trails))
}
