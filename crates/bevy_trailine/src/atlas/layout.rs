use bevy::math::{UVec2, Vec2};

use crate::error::AtlasError;
use crate::primitives::Rect;

/// Grid geometry of the trail atlas.
///
/// The atlas texture is `columns * cell_size` by `rows * cell_size` texels.
/// Cell `i` lives at column `i % columns`, row `i / columns`, row 0 at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
  cell_size: u32,
  columns: u32,
  rows: u32,
}

impl Default for AtlasLayout {
  fn default() -> Self {
    Self {
      cell_size: 64,
      columns: 64,
      rows: 64,
    }
  }
}

impl AtlasLayout {
  /// Creates a layout.
  ///
  /// # Panics
  /// If any dimension is zero.
  pub fn new(cell_size: u32, columns: u32, rows: u32) -> Self {
    assert!(
      cell_size > 0 && columns > 0 && rows > 0,
      "atlas layout dimensions must be nonzero"
    );
    Self {
      cell_size,
      columns,
      rows,
    }
  }

  /// Edge length of one square cell, in texels.
  #[inline]
  pub fn cell_size(&self) -> u32 {
    self.cell_size
  }

  #[inline]
  pub fn columns(&self) -> u32 {
    self.columns
  }

  #[inline]
  pub fn rows(&self) -> u32 {
    self.rows
  }

  /// Number of snapshot slots.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.columns as usize * self.rows as usize
  }

  /// Texture size in texels.
  ///
  /// Fails when either edge does not fit in `u32`.
  pub fn texture_size(&self) -> Result<UVec2, AtlasError> {
    match (
      self.columns.checked_mul(self.cell_size),
      self.rows.checked_mul(self.cell_size),
    ) {
      (Some(width), Some(height)) => Ok(UVec2::new(width, height)),
      _ => Err(AtlasError::Allocation {
        width: self.columns.saturating_mul(self.cell_size),
        height: self.rows.saturating_mul(self.cell_size),
      }),
    }
  }

  /// Texel rect of cell `index`.
  #[inline]
  pub fn cell_rect(&self, index: usize) -> Rect {
    let index = index as u32;
    Rect::new(
      (index % self.columns) * self.cell_size,
      (index / self.columns) * self.cell_size,
      self.cell_size,
      self.cell_size,
    )
  }

  /// Center of cell `index` in surface space.
  #[inline]
  pub fn cell_center(&self, index: usize) -> Vec2 {
    let rect = self.cell_rect(index);
    Vec2::new(
      rect.x as f32 + self.cell_size as f32 * 0.5,
      rect.y as f32 + self.cell_size as f32 * 0.5,
    )
  }
}
