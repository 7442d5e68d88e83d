//! Redraws pending atlas cells from live pose data.
//!
//! A composite pass runs at most once per frame and only when the atlas is
//! dirty:
//! 1. erase every pending cell (live snapshot not yet drawn),
//! 2. stamp each pending snapshot's hair chain and sprite, translated so the
//!    captured position lands on the cell center,
//! 3. in silhouette modes, flatten the cells just drawn to white coverage.
//!
//! Stamps are clipped to their own cell, so cells drawn in earlier passes are
//! never touched again.

mod hair;

use std::ops::Range;

use bevy::prelude::*;
pub use hair::{
  HAIR_CLIP_MARGIN, HairPose, SegmentBounds, draw_hair, segment_bounds, visible_segments,
};
use rayon::prelude::*;

use crate::atlas::{AtlasLayout, Snapshot, TrailAtlas};
use crate::config::TrailSettings;
use crate::error::AtlasError;
use crate::pose::HairChain;
use crate::primitives::{Rect, RgbaSurface};
use crate::render::{
  ImageTexels, Rgba, Stamp, TRANSPARENT, create_atlas_texture, rasterize, silhouette, to_rgba,
  upload_surface,
};

/// Live sprite data resolved for one composite pass.
#[derive(Clone, Copy, Debug)]
pub struct SpritePose<'a> {
  pub texels: ImageTexels<'a>,
  /// Source rect within `texels`.
  pub region: Rect,
  pub flip_x: bool,
  pub flip_y: bool,
  pub tint: Rgba,
}

/// Resolves the entities a snapshot references into drawable pose data.
///
/// Returning `None` leaves that part of the cell empty.
pub trait PoseResolver {
  fn sprite(&self, entity: Entity) -> Option<SpritePose<'_>>;
  fn hair(&self, entity: Entity) -> Option<HairPose<'_>>;
}

impl TrailAtlas {
  /// Redraws every pending cell.
  ///
  /// Returns the number of cells drawn; `Ok(0)` without touching anything
  /// when the atlas is clean. On error the atlas stays dirty.
  pub fn composite(
    &mut self,
    silhouette_pass: bool,
    poses: &impl PoseResolver,
  ) -> Result<usize, AtlasError> {
    if !self.dirty {
      return Ok(0);
    }

    let layout = self.layout;
    if self.surface.is_none() {
      let size = layout.texture_size()?;
      self.surface = Some(RgbaSurface::try_filled(size.x, size.y, TRANSPARENT)?);
    }
    let Some(surface) = self.surface.as_mut() else {
      return Ok(0);
    };

    for snapshot in self.slots.iter().flatten().filter(|s| !s.drawn) {
      surface.fill_rect(layout.cell_rect(snapshot.index), TRANSPARENT);
    }

    let mut drawn = Vec::new();
    for snapshot in self.slots.iter_mut().flatten().filter(|s| !s.drawn) {
      draw_snapshot(surface, &layout, snapshot, poses);
      snapshot.drawn = true;
      drawn.push(snapshot.index);
    }

    if silhouette_pass {
      silhouette_cells(surface, &layout, &drawn);
    }

    self.dirty = false;
    self.passes += 1;
    Ok(drawn.len())
  }
}

fn draw_snapshot(
  surface: &mut RgbaSurface,
  layout: &AtlasLayout,
  snapshot: &Snapshot,
  poses: &impl PoseResolver,
) {
  let cell = layout.cell_rect(snapshot.index);
  let origin = layout.cell_center(snapshot.index);

  if let Some(hair) = snapshot.hair.and_then(|e| poses.hair(e)) {
    let max_segments = visible_segments(hair.bounds(snapshot.anchor), layout.cell_size() as f32);
    draw_hair(surface, cell, origin, snapshot.anchor, &hair, max_segments);
  }

  if let Some(sprite) = poses.sprite(snapshot.sprite) {
    let quad = Stamp {
      texels: sprite.texels,
      region: sprite.region,
      offset: Vec2::ZERO,
      scale: snapshot.scale,
      flip_x: sprite.flip_x,
      flip_y: sprite.flip_y,
      tint: sprite.tint,
    };
    rasterize(surface, cell, origin, &quad);
  }
}

/// Runs the silhouette op over `cells`, one texel row per rayon task.
fn silhouette_cells(surface: &mut RgbaSurface, layout: &AtlasLayout, cells: &[usize]) {
  if cells.is_empty() {
    return;
  }

  let cell_size = layout.cell_size() as usize;
  // Column spans to flatten, per grid row.
  let mut spans: Vec<Vec<Range<usize>>> = vec![Vec::new(); layout.rows() as usize];
  for &index in cells {
    let rect = layout.cell_rect(index);
    spans[rect.y as usize / cell_size].push(rect.x as usize..rect.right() as usize);
  }

  let width = surface.width() as usize;
  surface
    .as_slice_mut()
    .par_chunks_mut(width)
    .enumerate()
    .for_each(|(y, row)| {
      for span in &spans[y / cell_size] {
        for texel in &mut row[span.clone()] {
          *texel = silhouette(*texel);
        }
      }
    });
}

/// Reads poses straight from the ECS.
struct WorldPoses<'a, 'w, 's> {
  sprites: &'a Query<'w, 's, &'static Sprite>,
  chains: &'a Query<'w, 's, &'static HairChain>,
  images: &'a Assets<Image>,
  atlases: Option<&'a Assets<TextureAtlasLayout>>,
}

impl PoseResolver for WorldPoses<'_, '_, '_> {
  fn sprite(&self, entity: Entity) -> Option<SpritePose<'_>> {
    let sprite = self.sprites.get(entity).ok()?;
    let texels = ImageTexels::from_image(self.images.get(&sprite.image)?)?;
    Some(SpritePose {
      texels,
      region: sprite_region(sprite, &texels, self.atlases),
      flip_x: sprite.flip_x,
      flip_y: sprite.flip_y,
      tint: to_rgba(sprite.color),
    })
  }

  fn hair(&self, entity: Entity) -> Option<HairPose<'_>> {
    let chain = self.chains.get(entity).ok()?;
    let texels = ImageTexels::from_image(self.images.get(&chain.segment_image)?)?;
    Some(HairPose {
      texels,
      nodes: &chain.nodes,
      tint: to_rgba(chain.color),
    })
  }
}

/// Source texel rect of a sprite: explicit `rect`, then atlas frame, then the
/// whole image.
fn sprite_region(
  sprite: &Sprite,
  texels: &ImageTexels,
  atlases: Option<&Assets<TextureAtlasLayout>>,
) -> Rect {
  let (w, h) = (texels.width(), texels.height());

  if let Some(rect) = sprite.rect {
    let min = rect.min.max(Vec2::ZERO);
    let size = (rect.max - min).max(Vec2::ZERO);
    return Rect::new(min.x as u32, min.y as u32, size.x as u32, size.y as u32).clamped(w, h);
  }

  if let Some(atlas) = &sprite.texture_atlas
    && let Some(layouts) = atlases
    && let Some(layout) = layouts.get(&atlas.layout)
    && let Some(frame) = layout.textures.get(atlas.index)
  {
    return Rect::new(frame.min.x, frame.min.y, frame.width(), frame.height()).clamped(w, h);
  }

  Rect::full(w, h)
}

/// Composites pending cells and uploads the surface to the atlas texture.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn composite_trails(
  mut atlas: ResMut<TrailAtlas>,
  settings: Res<TrailSettings>,
  mut images: ResMut<Assets<Image>>,
  atlases: Option<Res<Assets<TextureAtlasLayout>>>,
  sprites: Query<&'static Sprite>,
  chains: Query<&'static HairChain>,
) {
  if !atlas.is_dirty() {
    return;
  }

  let result = {
    let poses = WorldPoses {
      sprites: &sprites,
      chains: &chains,
      images: &images,
      atlases: atlases.as_deref(),
    };
    atlas.composite(settings.color_mode.is_silhouette(), &poses)
  };

  match result {
    Ok(drawn) => debug!("Composited {} trail cells", drawn),
    Err(e) => {
      warn!("Trail composite deferred: {}", e);
      return;
    }
  }

  let atlas = atlas.into_inner();
  let Some(surface) = atlas.surface.as_ref() else {
    return;
  };
  let handle = match &atlas.texture {
    Some(handle) => handle.clone(),
    None => {
      let (width, height) = (surface.width(), surface.height());
      let handle = create_atlas_texture(&mut images, width, height);
      info!("Created {}x{} trail atlas texture", width, height);
      atlas.texture = Some(handle.clone());
      handle
    }
  };

  if let Some(image) = images.get_mut(&handle)
    && !upload_surface(surface, image)
  {
    warn!("Trail atlas texture size does not match its surface");
  }
}
