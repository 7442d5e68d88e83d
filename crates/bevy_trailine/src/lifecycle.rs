//! Snapshot aging, clearing and teardown.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::atlas::TrailAtlas;
use crate::config::{TrailColorMode, TrailSettings};
use crate::pose::HostFreeze;

/// Removes every live trail. Send alongside the host's own trail clear.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ClearTrails;

/// Removes every live trail and releases the atlas texture (scene end).
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct TrailTeardown;

/// Advances snapshot fades and frees expired cells.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn tick_trails(
  mut atlas: ResMut<TrailAtlas>,
  virtual_time: Res<Time<Virtual>>,
  real_time: Res<Time<Real>>,
  freeze: Option<Res<HostFreeze>>,
) {
  if atlas.is_empty() {
    return;
  }
  let frozen = freeze.is_some_and(|f| f.0);
  atlas.tick(virtual_time.delta_secs(), real_time.delta_secs(), frozen);
}

pub fn handle_clear_messages(
  mut clears: MessageReader<ClearTrails>,
  mut atlas: ResMut<TrailAtlas>,
) {
  if clears.read().count() > 0 {
    atlas.clear();
  }
}

/// Clears live trails when the color mode changes, so no ghost keeps a stale
/// style.
pub fn clear_on_mode_change(
  settings: Res<TrailSettings>,
  mut last_mode: Local<Option<TrailColorMode>>,
  mut atlas: ResMut<TrailAtlas>,
) {
  let mode = settings.color_mode;
  match *last_mode {
    Some(last) if last != mode => {
      debug!("Trail color mode changed to {:?}, clearing", mode);
      atlas.clear();
    }
    _ => {}
  }
  *last_mode = Some(mode);
}

pub fn handle_teardown_messages(
  mut teardowns: MessageReader<TrailTeardown>,
  atlas: ResMut<TrailAtlas>,
  images: ResMut<Assets<Image>>,
) {
  if teardowns.read().count() > 0 {
    dispose_trails(atlas, images);
  }
}

/// Clears all trails and frees the atlas texture. Safe to run repeatedly.
///
/// Hosts may also schedule this on a state exit.
pub fn dispose_trails(mut atlas: ResMut<TrailAtlas>, mut images: ResMut<Assets<Image>>) {
  atlas.clear();
  if let Some(handle) = atlas.dispose() {
    images.remove(&handle);
    info!("Released trail atlas texture");
  }
}
