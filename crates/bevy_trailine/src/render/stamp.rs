//! Nearest-neighbor sprite rasterization into a surface.

use bevy::prelude::*;

use super::{ImageTexels, Rgba, blend_over, tint};
use crate::primitives::{Rect, RgbaSurface};

/// One textured quad to rasterize.
///
/// Offsets and scale are in world units (Y+ up); the quad is centered on its
/// anchor point, one world unit per source texel at scale 1.
#[derive(Clone, Copy, Debug)]
pub struct Stamp<'a> {
  pub texels: ImageTexels<'a>,
  /// Source region in texel space.
  pub region: Rect,
  /// Quad center relative to the destination origin.
  pub offset: Vec2,
  pub scale: Vec2,
  pub flip_x: bool,
  pub flip_y: bool,
  pub tint: Rgba,
}

impl Stamp<'_> {
  /// Half the destination footprint, in world units.
  pub fn half_extents(&self) -> Vec2 {
    Vec2::new(
      self.region.width as f32 * self.scale.x.abs(),
      self.region.height as f32 * self.scale.y.abs(),
    ) * 0.5
  }
}

/// Rasterizes `quad` at `origin` (surface space, Y down), clipped to `clip`.
///
/// Negative scale mirrors the quad. Texels are tinted and blended over
/// whatever the surface already holds.
pub fn rasterize(surface: &mut RgbaSurface, clip: Rect, origin: Vec2, quad: &Stamp) {
  let region = quad.region;
  if region.is_empty() || quad.scale.x == 0.0 || quad.scale.y == 0.0 {
    return;
  }

  let clip = clip.clamped(surface.width(), surface.height());
  if clip.is_empty() {
    return;
  }

  let center = Vec2::new(origin.x + quad.offset.x, origin.y - quad.offset.y);
  let half = quad.half_extents();

  let min_x = (center.x - half.x).floor().max(clip.x as f32) as u32;
  let max_x = (center.x + half.x).ceil().min(clip.right() as f32).max(0.0) as u32;
  let min_y = (center.y - half.y).floor().max(clip.y as f32) as u32;
  let max_y = (center.y + half.y).ceil().min(clip.bottom() as f32).max(0.0) as u32;
  if min_x >= max_x || min_y >= max_y {
    return;
  }

  let (rw, rh) = (region.width as f32, region.height as f32);

  for y in min_y..max_y {
    let local_y = center.y - (y as f32 + 0.5);
    let v = rh * 0.5 - local_y / quad.scale.y;
    if !(0.0..rh).contains(&v) {
      continue;
    }
    let mut ty = (v as u32).min(region.height - 1);
    if quad.flip_y {
      ty = region.height - 1 - ty;
    }

    for x in min_x..max_x {
      let local_x = x as f32 + 0.5 - center.x;
      let u = local_x / quad.scale.x + rw * 0.5;
      if !(0.0..rw).contains(&u) {
        continue;
      }
      let mut tx = (u as u32).min(region.width - 1);
      if quad.flip_x {
        tx = region.width - 1 - tx;
      }

      let texel = quad.texels.get(region.x + tx, region.y + ty);
      if texel.alpha == 0 {
        continue;
      }
      if let Some(dst) = surface.get_mut(x, y) {
        *dst = blend_over(*dst, tint(texel, quad.tint));
      }
    }
  }
}
