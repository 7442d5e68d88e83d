//! Ghost sprites showing composited cells at their snapshot positions.

use bevy::prelude::*;

use crate::atlas::TrailAtlas;
use crate::config::TrailSettings;

/// A ghost sprite sampling one atlas cell.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailGhost {
  pub index: usize,
}

/// Spawns, updates and despawns ghost sprites to match live snapshots.
///
/// Snapshots whose cell has not been drawn yet stay hidden.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn present_trails(
  mut commands: Commands,
  mut atlas: ResMut<TrailAtlas>,
  settings: Res<TrailSettings>,
  mut ghosts: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<TrailGhost>>,
) {
  for ghost in atlas.take_released() {
    if let Ok(mut entity) = commands.get_entity(ghost) {
      entity.try_despawn();
    }
  }

  let atlas = atlas.into_inner();
  let Some(texture) = atlas.texture.clone() else {
    return;
  };
  let layout = atlas.layout;

  for snapshot in atlas.iter_mut() {
    let existing = snapshot.ghost.and_then(|e| ghosts.get_mut(e).ok());

    if !snapshot.drawn {
      if let Some((_, _, mut visibility)) = existing {
        *visibility = Visibility::Hidden;
      }
      continue;
    }

    let opacity = snapshot.opacity(settings.opacity);
    let color = snapshot.color.with_alpha(snapshot.color.alpha() * opacity);
    let rect = Some(layout.cell_rect(snapshot.index).to_bevy());
    let transform = Transform::from_translation(snapshot.position.extend(snapshot.depth));

    match existing {
      Some((mut sprite, mut ghost_transform, mut visibility)) => {
        sprite.image = texture.clone();
        sprite.rect = rect;
        sprite.color = color;
        *ghost_transform = transform;
        *visibility = Visibility::Inherited;
      }
      None => {
        let id = commands
          .spawn((
            Name::new("Trail Ghost"),
            TrailGhost {
              index: snapshot.index,
            },
            Sprite {
              image: texture.clone(),
              rect,
              color,
              ..default()
            },
            transform,
          ))
          .id();
        snapshot.ghost = Some(id);
      }
    }
    snapshot.presented += 1;
  }
}
