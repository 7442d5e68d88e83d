//! Read-only texel access to pose images.

use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;

use super::Rgba;

/// Borrowed view over tightly packed RGBA8 texels.
///
/// Pose images must keep their CPU data (`RenderAssetUsages::MAIN_WORLD`) for
/// the compositor to read them.
#[derive(Clone, Copy, Debug)]
pub struct ImageTexels<'a> {
  data: &'a [u8],
  width: u32,
  height: u32,
}

impl<'a> ImageTexels<'a> {
  /// Wraps raw RGBA8 bytes. Returns `None` if `data` is too short.
  pub fn new(data: &'a [u8], width: u32, height: u32) -> Option<Self> {
    let needed = (width as usize) * (height as usize) * 4;
    (data.len() >= needed).then_some(Self {
      data,
      width,
      height,
    })
  }

  /// Views a Bevy image.
  ///
  /// Returns `None` for non-RGBA8 formats or images without CPU data.
  pub fn from_image(image: &'a Image) -> Option<Self> {
    match image.texture_descriptor.format {
      TextureFormat::Rgba8UnormSrgb | TextureFormat::Rgba8Unorm => {}
      _ => return None,
    }
    let data = image.data.as_deref()?;
    Self::new(data, image.width(), image.height())
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Texel dimensions as a float vector.
  #[inline]
  pub fn size(&self) -> Vec2 {
    Vec2::new(self.width as f32, self.height as f32)
  }

  /// Returns the texel at (x, y). Out-of-bounds reads are transparent.
  #[inline]
  pub fn get(&self, x: u32, y: u32) -> Rgba {
    if x >= self.width || y >= self.height {
      return super::TRANSPARENT;
    }
    let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
    Rgba::new(
      self.data[i],
      self.data[i + 1],
      self.data[i + 2],
      self.data[i + 3],
    )
  }
}
