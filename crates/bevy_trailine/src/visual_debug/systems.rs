//! Overlay sprite and grid gizmo systems.

use bevy::prelude::*;
use bevy::sprite::Anchor;

use super::colors;
use crate::atlas::TrailAtlas;
use crate::config::TrailSettings;

/// Drawn above gameplay sprites.
const OVERLAY_Z: f32 = 900.0;

/// Marker for the atlas overlay sprite.
#[derive(Component)]
pub struct AtlasOverlay;

type Cameras<'w, 's> = Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<Camera2d>>;

fn viewport_top_left(cameras: &Cameras) -> Option<Vec2> {
  let (camera, transform) = cameras.iter().find(|(camera, _)| camera.is_active)?;
  camera.viewport_to_world_2d(transform, Vec2::ZERO).ok()
}

/// Spawns, moves or removes the overlay sprite.
pub fn sync_atlas_overlay(
  mut commands: Commands,
  settings: Res<TrailSettings>,
  atlas: Res<TrailAtlas>,
  cameras: Cameras,
  mut overlays: Query<(Entity, &mut Sprite, &mut Transform), With<AtlasOverlay>>,
) {
  let origin = viewport_top_left(&cameras);
  let texture = atlas.texture();
  let size = atlas.layout().texture_size().ok();

  let (Some(origin), Some(texture), Some(size), true) =
    (origin, texture, size, settings.debug.render_atlas)
  else {
    for (entity, _, _) in &overlays {
      commands.entity(entity).despawn();
    }
    return;
  };

  let size = size.as_vec2() * settings.debug.scale;
  let transform = Transform::from_translation(origin.extend(OVERLAY_Z));

  match overlays.single_mut() {
    Ok((_, mut sprite, mut overlay_transform)) => {
      sprite.image = texture.clone();
      sprite.custom_size = Some(size);
      *overlay_transform = transform;
    }
    Err(_) => {
      commands.spawn((
        Name::new("Trail Atlas Overlay"),
        AtlasOverlay,
        Sprite {
          image: texture.clone(),
          custom_size: Some(size),
          ..default()
        },
        Anchor::TOP_LEFT,
        transform,
      ));
    }
  }
}

/// Draws the cell grid over the overlay and outlines live cells.
pub fn draw_atlas_grid(
  mut gizmos: Gizmos,
  settings: Res<TrailSettings>,
  atlas: Res<TrailAtlas>,
  cameras: Cameras,
) {
  if !settings.debug.render_atlas || atlas.texture().is_none() {
    return;
  }
  let Some(origin) = viewport_top_left(&cameras) else {
    return;
  };

  let layout = atlas.layout();
  let cell = layout.cell_size() as f32 * settings.debug.scale;
  let width = layout.columns() as f32 * cell;
  let height = layout.rows() as f32 * cell;

  for column in 0..=layout.columns() {
    let x = origin.x + column as f32 * cell;
    gizmos.line_2d(Vec2::new(x, origin.y), Vec2::new(x, origin.y - height), colors::GREEN);
  }
  for row in 0..=layout.rows() {
    let y = origin.y - row as f32 * cell;
    gizmos.line_2d(Vec2::new(origin.x, y), Vec2::new(origin.x + width, y), colors::GREEN);
  }

  for snapshot in atlas.iter() {
    let rect = layout.cell_rect(snapshot.index());
    let center = Vec2::new(
      origin.x + (rect.x as f32 + rect.width as f32 * 0.5) * settings.debug.scale,
      origin.y - (rect.y as f32 + rect.height as f32 * 0.5) * settings.debug.scale,
    );
    gizmos.rect_2d(Isometry2d::from_translation(center), Vec2::splat(cell), colors::CORAL);
  }
}
