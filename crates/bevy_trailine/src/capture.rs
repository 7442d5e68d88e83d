//! Periodic pose capture from trail sources.

use bevy::prelude::*;

use crate::atlas::{TrailAtlas, TrailCapture};
use crate::config::{TrailColorMode, TrailSettings};
use crate::pose::{HairChain, TrailSource};

/// Ghosts sit this far behind their source on the z axis.
pub const TRAIL_DEPTH_OFFSET: f32 = 0.01;

/// True on frames where scene time crosses a multiple of `interval`.
///
/// Paused frames (`delta <= 0`) never fire. A non-positive interval fires on
/// every running frame.
pub fn on_interval(elapsed: f32, delta: f32, interval: f32) -> bool {
  if delta <= 0.0 {
    return false;
  }
  if interval <= 0.0 {
    return true;
  }
  ((elapsed - delta) / interval).floor() < (elapsed / interval).floor()
}

/// Captures every unsuppressed [`TrailSource`] on interval frames.
///
/// Poses come from the local `Transform`, so movement applied earlier in the
/// same `Update` is captured this frame. Sources are expected to be root
/// entities whose local transform is their world transform. Reading the
/// scale directly also keeps a mirrored `(-x, -y)` scale intact.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn capture_trails(
  mut atlas: ResMut<TrailAtlas>,
  settings: Res<TrailSettings>,
  time: Res<Time<Virtual>>,
  sources: Query<(Entity, &TrailSource, &Transform, &Sprite)>,
  chains: Query<&HairChain>,
) {
  if !settings.enabled {
    return;
  }
  let elapsed = time.elapsed_secs();
  if !on_interval(elapsed, time.delta_secs(), settings.interval) {
    return;
  }

  for (entity, source, transform, sprite) in &sources {
    if source.suppressed {
      continue;
    }

    let hair = source.hair.filter(|e| chains.contains(*e));
    let color = match settings.color_mode {
      TrailColorMode::Pattern => settings.pattern.color_at(elapsed),
      TrailColorMode::HairColor => hair
        .and_then(|e| chains.get(e).ok())
        .map_or(sprite.color, |chain| chain.color),
      TrailColorMode::OnionSkin => Color::WHITE,
    };

    let translation = transform.translation;
    let mut scale = transform.scale.truncate();
    if source.inverted {
      scale.y = -scale.y;
    }

    let capture = TrailCapture {
      position: translation.truncate(),
      sprite: entity,
      hair,
      scale,
      color,
      depth: translation.z - TRAIL_DEPTH_OFFSET,
      duration: settings.duration,
      frozen_update: source.frozen_update,
      use_raw_time: settings.use_raw_time,
    };

    if atlas.add(capture).is_none() {
      // Pool exhausted; dropping the capture is expected.
      break;
    }
  }
}

/// Records one pose explicitly.
///
/// # Panics
/// If the capture's sprite entity has no `Sprite`.
#[derive(Debug, Clone, Copy)]
pub struct AddTrail(pub TrailCapture);

impl Command for AddTrail {
  fn apply(self, world: &mut World) {
    let capture = self.0;
    assert!(
      world.get::<Sprite>(capture.sprite).is_some(),
      "AddTrail: entity {:?} has no Sprite",
      capture.sprite
    );
    if let Some(mut atlas) = world.get_resource_mut::<TrailAtlas>() {
      atlas.add(capture);
    }
  }
}
