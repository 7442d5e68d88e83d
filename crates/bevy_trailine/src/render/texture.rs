//! GPU texture creation and upload for the atlas surface.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::primitives::RgbaSurface;

/// Creates a transparent RGBA8 texture with nearest-neighbor sampling.
///
/// Point sampling keeps cell edges crisp, so a ghost never picks up texels
/// from a neighboring cell.
pub fn create_atlas_texture(images: &mut Assets<Image>, width: u32, height: u32) -> Handle<Image> {
  let size = Extent3d {
    width,
    height,
    depth_or_array_layers: 1,
  };

  let mut image = Image::new_fill(
    size,
    TextureDimension::D2,
    &[0, 0, 0, 0],
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  image.sampler = ImageSampler::nearest();

  images.add(image)
}

/// Uploads surface pixel data to an existing texture.
///
/// Returns false (and leaves the image untouched) when the dimensions differ.
pub fn upload_surface(surface: &RgbaSurface, image: &mut Image) -> bool {
  let bytes = surface.as_bytes();
  match image.data {
    Some(ref mut data) if data.len() == bytes.len() => {
      data.copy_from_slice(bytes);
      true
    }
    _ => false,
  }
}
