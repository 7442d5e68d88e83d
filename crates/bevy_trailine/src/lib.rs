//! Trailine - motion trail (afterimage) compositor for Bevy 2D characters.
//!
//! At a fixed interval the pose of every [`TrailSource`] (sprite plus an
//! optional [`HairChain`]) is recorded into one cell of a shared grid atlas.
//! Each cell is composited once, then shown as a fading ghost sprite at the
//! captured position until its lifetime runs out and the cell is reused.
//!
//! # Frame order
//! - `Update`: [`TrailSystems::Lifetime`] then [`TrailSystems::Capture`].
//!   Character movement should run before `Capture`.
//! - `PostUpdate`: [`TrailSystems::BeforeRender`] (composite and upload) then
//!   [`TrailSystems::Present`] (ghost sprites), before transform propagation.

use bevy::prelude::*;
use bevy::transform::TransformSystems;

pub mod atlas;
pub mod capture;
pub mod compositor;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod pose;
pub mod presenter;
pub mod primitives;
pub mod render;
#[cfg(feature = "tracy")]
mod tracy_init;
pub mod visual_debug;

pub use atlas::{AtlasLayout, Snapshot, SnapshotId, SnapshotState, TrailAtlas, TrailCapture};
pub use capture::{AddTrail, TRAIL_DEPTH_OFFSET, capture_trails, on_interval};
pub use compositor::{HAIR_CLIP_MARGIN, PoseResolver, composite_trails, visible_segments};
pub use config::{TrailColorMode, TrailDebugSettings, TrailPattern, TrailSettings, host_trails_visible};
pub use error::{AtlasError, SettingsError};
pub use lifecycle::{ClearTrails, TrailTeardown, dispose_trails};
pub use pose::{HairChain, HairNode, HostFreeze, TrailSource};
pub use presenter::TrailGhost;
pub use primitives::{Rect, RgbaSurface, Surface};
pub use render::{Rgba, rgb};
#[cfg(feature = "tracy")]
pub use tracy_init::init_tracy;
pub use visual_debug::TrailDebugPlugin;

/// System sets for trail systems.
///
/// Order other systems against these sets to hook into the trail frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailSystems {
  /// Clear requests and fade timers.
  Lifetime,
  /// Periodic pose capture.
  Capture,
  /// Atlas composite and texture upload.
  BeforeRender,
  /// Ghost sprite sync.
  Present,
}

/// Plugin for character motion trails.
///
/// Adds the [`TrailAtlas`] and, unless the app already has one, a
/// [`TrailSettings`] resource.
#[derive(Default)]
pub struct TrailPlugin {
  /// Initial settings.
  pub settings: TrailSettings,
  /// Atlas grid geometry.
  pub layout: AtlasLayout,
}

impl TrailPlugin {
  /// Sets the initial settings.
  pub fn settings(mut self, settings: TrailSettings) -> Self {
    self.settings = settings;
    self
  }

  /// Sets the atlas grid geometry.
  pub fn layout(mut self, layout: AtlasLayout) -> Self {
    self.layout = layout;
    self
  }
}

impl Plugin for TrailPlugin {
  fn build(&self, app: &mut App) {
    if !app.world().contains_resource::<TrailSettings>() {
      app.insert_resource(self.settings.clone());
    }

    app
      .insert_resource(TrailAtlas::new(self.layout))
      .init_resource::<HostFreeze>()
      .add_message::<ClearTrails>()
      .add_message::<TrailTeardown>();

    app
      .configure_sets(
        Update,
        (TrailSystems::Lifetime, TrailSystems::Capture).chain(),
      )
      .configure_sets(
        PostUpdate,
        (TrailSystems::BeforeRender, TrailSystems::Present)
          .chain()
          .before(TransformSystems::Propagate),
      );

    app
      .add_systems(
        Update,
        (
          lifecycle::handle_teardown_messages,
          lifecycle::handle_clear_messages,
          lifecycle::clear_on_mode_change,
          lifecycle::tick_trails,
        )
          .chain()
          .in_set(TrailSystems::Lifetime),
      )
      .add_systems(Update, capture_trails.in_set(TrailSystems::Capture))
      .add_systems(
        PostUpdate,
        composite_trails.in_set(TrailSystems::BeforeRender),
      )
      .add_systems(
        PostUpdate,
        presenter::present_trails.in_set(TrailSystems::Present),
      );

    // Overlay needs gizmos and cameras
    if app.is_plugin_added::<bevy::render::RenderPlugin>() {
      app.add_plugins(TrailDebugPlugin);
    }

    info!(
      "Trail atlas: {} cells of {}px",
      self.layout.capacity(),
      self.layout.cell_size()
    );
  }
}
