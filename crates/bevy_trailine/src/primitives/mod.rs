mod rect;
mod surface;

pub use rect::Rect;
pub use surface::{RgbaSurface, Surface};
