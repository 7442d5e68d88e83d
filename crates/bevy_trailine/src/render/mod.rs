//! Texel types, blending, and CPU rasterization into the atlas.

mod stamp;
mod texels;
mod texture;

use bevy::prelude::Color;
pub use stamp::{Stamp, rasterize};
pub use texels::ImageTexels;
pub use texture::{create_atlas_texture, upload_surface};

/// RGBA pixel with 8 bits per channel, using sRGB color space.
///
/// Re-exported from the `palette` crate for color handling.
pub type Rgba = palette::Srgba<u8>;

/// Fully transparent black.
pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

/// Opaque white.
pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

/// Creates an opaque RGB color (alpha = 255).
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
  Rgba::new(r, g, b, 255)
}

/// Quantizes a Bevy color to an sRGB texel.
pub fn to_rgba(color: Color) -> Rgba {
  let c = color.to_srgba();
  let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
  Rgba::new(q(c.red), q(c.green), q(c.blue), q(c.alpha))
}

#[inline]
fn mul_u8(a: u8, b: u8) -> u8 {
  ((a as u16 * b as u16 + 127) / 255) as u8
}

/// Multiplies every channel of `texel` by `tint`.
#[inline]
pub fn tint(texel: Rgba, tint: Rgba) -> Rgba {
  Rgba::new(
    mul_u8(texel.red, tint.red),
    mul_u8(texel.green, tint.green),
    mul_u8(texel.blue, tint.blue),
    mul_u8(texel.alpha, tint.alpha),
  )
}

/// Straight-alpha `src` over `dst`.
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
  match src.alpha {
    0 => return dst,
    255 => return src,
    _ => {}
  }

  let sa = src.alpha as f32 / 255.0;
  let da = dst.alpha as f32 / 255.0;
  let out_a = sa + da * (1.0 - sa);
  let mix = |s: u8, d: u8| {
    ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
      .round()
      .clamp(0.0, 255.0) as u8
  };

  Rgba::new(
    mix(src.red, dst.red),
    mix(src.green, dst.green),
    mix(src.blue, dst.blue),
    (out_a * 255.0).round() as u8,
  )
}

/// Replaces a texel's color with white, keeping its coverage.
///
/// Straight-alpha form of the `DestinationAlpha` blend the presenter relies on
/// to tint ghosts with a flat color.
#[inline]
pub fn silhouette(texel: Rgba) -> Rgba {
  if texel.alpha == 0 {
    TRANSPARENT
  } else {
    Rgba::new(255, 255, 255, texel.alpha)
  }
}
