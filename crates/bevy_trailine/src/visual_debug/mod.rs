//! Atlas overlay for inspecting the trail compositor.
//!
//! Shows the raw atlas texture pinned to the top-left of the active 2D
//! camera, with cell grid lines and live cells outlined. Toggle with
//! [`TrailDebugSettings::render_atlas`](crate::config::TrailDebugSettings).

pub(super) mod colors;
mod systems;
#[cfg(feature = "debug-ui")]
mod ui;

use bevy::prelude::*;
use bevy::transform::TransformSystems;
pub use systems::AtlasOverlay;
use systems::{draw_atlas_grid, sync_atlas_overlay};
#[cfg(feature = "debug-ui")]
pub use ui::trail_debug_checkboxes;

use crate::TrailSystems;

/// Plugin that draws the atlas overlay.
pub struct TrailDebugPlugin;

impl Plugin for TrailDebugPlugin {
  fn build(&self, app: &mut App) {
    app.add_systems(Update, draw_atlas_grid).add_systems(
      PostUpdate,
      sync_atlas_overlay
        .after(TrailSystems::Present)
        .before(TransformSystems::Propagate),
    );
  }
}
