//! Hair-chain clipping against the cell interior.
//!
//! Segments that would spill past their cell would overwrite a neighbor's
//! freshly erased pixels. The chain is cut at the first segment that leaves
//! the cell; the anchor segment is always drawn.

use bevy::prelude::*;

use crate::pose::HairNode;
use crate::primitives::{Rect, RgbaSurface};
use crate::render::{ImageTexels, Rgba, Stamp, rasterize};

/// Inset from each cell edge, matching the erase pass overdraw.
pub const HAIR_CLIP_MARGIN: f32 = 1.0;

/// Axis-aligned bounds relative to the cell center (Y+ up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentBounds {
  pub min: Vec2,
  pub max: Vec2,
}

impl SegmentBounds {
  pub fn centered(center: Vec2, size: Vec2) -> Self {
    let half = size.abs() * 0.5;
    Self {
      min: center - half,
      max: center + half,
    }
  }

  /// Whether the bounds lie inside a square of half-size `limit`.
  #[inline]
  pub fn within(&self, limit: f32) -> bool {
    self.min.x >= -limit && self.min.y >= -limit && self.max.x <= limit && self.max.y <= limit
  }
}

/// Bounds of a segment at `offset` from the cell center.
pub fn segment_bounds(offset: Vec2, texture_size: Vec2, scale: Vec2) -> SegmentBounds {
  SegmentBounds::centered(offset, texture_size * scale.abs())
}

/// Number of leading segments to draw in a cell of `cell_size` texels.
pub fn visible_segments(bounds: impl IntoIterator<Item = SegmentBounds>, cell_size: f32) -> usize {
  let limit = cell_size * 0.5 - HAIR_CLIP_MARGIN;
  bounds
    .into_iter()
    .enumerate()
    .take_while(|(i, b)| *i == 0 || b.within(limit))
    .count()
}

/// Live hair data resolved for one composite pass.
#[derive(Clone, Copy, Debug)]
pub struct HairPose<'a> {
  pub texels: ImageTexels<'a>,
  pub nodes: &'a [HairNode],
  pub tint: Rgba,
}

impl HairPose<'_> {
  /// Segment bounds of every node relative to `anchor`.
  pub fn bounds(&self, anchor: Vec2) -> impl Iterator<Item = SegmentBounds> + '_ {
    let size = self.texels.size();
    self
      .nodes
      .iter()
      .map(move |node| segment_bounds(node.position - anchor, size, node.scale))
  }
}

/// Stamps the first `max_segments` nodes, back to front so node 0 ends on top.
///
/// `anchor` is the world position mapped to `origin`.
pub fn draw_hair(
  surface: &mut RgbaSurface,
  clip: Rect,
  origin: Vec2,
  anchor: Vec2,
  hair: &HairPose,
  max_segments: usize,
) {
  let region = Rect::full(hair.texels.width(), hair.texels.height());
  let count = max_segments.min(hair.nodes.len());
  for node in hair.nodes[..count].iter().rev() {
    let quad = Stamp {
      texels: hair.texels,
      region,
      offset: node.position - anchor,
      scale: node.scale,
      flip_x: false,
      flip_y: false,
      tint: hair.tint,
    };
    rasterize(surface, clip, origin, &quad);
  }
}
