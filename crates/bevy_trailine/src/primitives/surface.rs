//! CPU-side pixel buffer backing the trail atlas.
//!
//! A [`Surface`] is a 2D buffer that can hold any element type. The atlas uses
//! [`RgbaSurface`], whose bytes are uploaded verbatim into a Bevy `Image`.
//!
//! # Coordinate System
//!
//! Surfaces use image space so the upload needs no flipping:
//! - **X+** is to the right
//! - **Y+** is downward
//! - **(0, 0)** is the top-left corner
//!
//! World space (Y+ up) is converted at the stamping boundary, see
//! [`crate::render::rasterize`].

use std::ops::{Index, IndexMut};

use super::Rect;
use crate::error::AtlasError;
use crate::render::Rgba;

// as_bytes() reinterprets the buffer, so Rgba must stay 4 packed bytes.
const _: () = assert!(std::mem::size_of::<Rgba>() == 4);

/// A 2D buffer of elements.
///
/// Data is stored in row-major order (y * width + x).
pub struct Surface<T> {
  data: Box<[T]>,
  width: u32,
  height: u32,
}

impl<T: Clone> Surface<T> {
  /// Creates a new surface filled with the given value.
  pub fn filled(width: u32, height: u32, value: T) -> Self {
    let len = (width as usize) * (height as usize);
    Self {
      data: vec![value; len].into_boxed_slice(),
      width,
      height,
    }
  }

  /// Creates a new surface filled with `value`, reporting allocation failure
  /// instead of aborting.
  ///
  /// Atlas surfaces are large (64 MiB at the default layout), so the
  /// compositor allocates through this path and retries on a later frame.
  pub fn try_filled(width: u32, height: u32, value: T) -> Result<Self, AtlasError> {
    let len = (width as usize)
      .checked_mul(height as usize)
      .ok_or(AtlasError::Allocation { width, height })?;

    let mut data = Vec::new();
    data
      .try_reserve_exact(len)
      .map_err(|_| AtlasError::Allocation { width, height })?;
    data.resize(len, value);

    Ok(Self {
      data: data.into_boxed_slice(),
      width,
      height,
    })
  }
}

impl<T> Surface<T> {
  /// Returns the width of the surface.
  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  /// Returns the height of the surface.
  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Converts (x, y) to a linear index, or `None` if out of bounds.
  #[inline]
  fn index_of(&self, x: u32, y: u32) -> Option<usize> {
    if x < self.width && y < self.height {
      Some((y as usize) * (self.width as usize) + (x as usize))
    } else {
      None
    }
  }

  /// Returns a mutable reference to the element at (x, y), or `None` if out of
  /// bounds.
  #[inline]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
    self.index_of(x, y).map(|i| &mut self.data[i])
  }

  /// Returns the raw data as a byte slice (for GPU upload).
  #[inline]
  pub fn as_bytes(&self) -> &[u8] {
    let ptr = self.data.as_ptr() as *const u8;
    let len = self.data.len() * std::mem::size_of::<T>();
    // SAFETY: Surface data is contiguous and T is expected to be repr(C)
    unsafe { std::slice::from_raw_parts(ptr, len) }
  }

  /// Returns a slice of the underlying data.
  #[inline]
  pub fn as_slice(&self) -> &[T] {
    &self.data
  }

  /// Returns a mutable slice of the underlying data.
  #[inline]
  pub fn as_slice_mut(&mut self) -> &mut [T] {
    &mut self.data
  }

  /// Fills a rectangular region with the given value.
  ///
  /// The rect is clamped to the surface first.
  pub fn fill_rect(&mut self, rect: Rect, value: T)
  where
    T: Clone,
  {
    let rect = rect.clamped(self.width, self.height);
    let stride = self.width as usize;
    for y in rect.y..rect.y + rect.height {
      let start = y as usize * stride + rect.x as usize;
      self.data[start..start + rect.width as usize].fill(value.clone());
    }
  }
}

impl<T> Index<(u32, u32)> for Surface<T> {
  type Output = T;

  #[inline]
  fn index(&self, (x, y): (u32, u32)) -> &Self::Output {
    let i = (y as usize) * (self.width as usize) + (x as usize);
    &self.data[i]
  }
}

impl<T> IndexMut<(u32, u32)> for Surface<T> {
  #[inline]
  fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut Self::Output {
    let i = (y as usize) * (self.width as usize) + (x as usize);
    &mut self.data[i]
  }
}

/// A surface containing RGBA pixels, suitable for GPU upload.
pub type RgbaSurface = Surface<Rgba>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_rect_only_touches_region() {
    let mut surface = RgbaSurface::filled(4, 4, Rgba::new(9, 9, 9, 9));
    surface.fill_rect(Rect::new(1, 1, 2, 2), Rgba::new(0, 0, 0, 0));

    assert_eq!(surface[(0, 0)], Rgba::new(9, 9, 9, 9));
    assert_eq!(surface[(1, 1)], Rgba::new(0, 0, 0, 0));
    assert_eq!(surface[(2, 2)], Rgba::new(0, 0, 0, 0));
    assert_eq!(surface[(3, 2)], Rgba::new(9, 9, 9, 9));
  }

  #[test]
  fn fill_rect_clamps_to_bounds() {
    let mut surface = RgbaSurface::filled(4, 4, Rgba::new(0, 0, 0, 0));
    surface.fill_rect(Rect::new(3, 3, 10, 10), Rgba::new(1, 2, 3, 4));

    assert_eq!(surface[(3, 3)], Rgba::new(1, 2, 3, 4));
    assert_eq!(surface[(2, 3)], Rgba::new(0, 0, 0, 0));
  }

  #[test]
  fn get_mut_rejects_out_of_bounds() {
    let mut surface = RgbaSurface::filled(3, 2, Rgba::new(0, 0, 0, 0));
    assert!(surface.get_mut(3, 0).is_none());
    assert!(surface.get_mut(0, 2).is_none());

    *surface.get_mut(2, 1).unwrap() = Rgba::new(5, 6, 7, 8);
    assert_eq!(surface.as_slice()[5], Rgba::new(5, 6, 7, 8));
  }

  #[test]
  fn try_filled_allocates_requested_size() {
    let surface =
      RgbaSurface::try_filled(8, 2, Rgba::new(0, 0, 0, 0)).expect("small surface allocates");
    assert_eq!(surface.as_bytes().len(), 8 * 2 * 4);
    assert!(surface.as_slice().iter().all(|p| p.alpha == 0));
  }
}
