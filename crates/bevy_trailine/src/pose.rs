//! Components describing a character's live visual pose.

use bevy::prelude::*;

/// Marks an entity whose `Sprite` leaves a trail.
#[derive(Component, Debug, Clone, Default)]
pub struct TrailSource {
  /// Skip captures, e.g. during a respawn intro.
  pub suppressed: bool,
  /// Gravity is flipped; ghosts are mirrored vertically.
  pub inverted: bool,
  /// Ghosts keep fading while the host is frozen.
  pub frozen_update: bool,
  /// Entity holding this character's [`HairChain`].
  pub hair: Option<Entity>,
}

/// One node of a hair chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HairNode {
  /// World position of the node center.
  pub position: Vec2,
  /// Node scale; the sign mirrors the segment texture.
  pub scale: Vec2,
}

impl HairNode {
  pub fn new(position: Vec2, scale: Vec2) -> Self {
    Self { position, scale }
  }
}

/// An articulated chain of textured segments following a character.
///
/// Node 0 is the anchor and draws on top; every node is stamped with
/// `segment_image` tinted by `color`.
#[derive(Component, Debug, Clone)]
pub struct HairChain {
  pub nodes: Vec<HairNode>,
  pub segment_image: Handle<Image>,
  pub color: Color,
}

/// Set while the host game is frozen (hit-stop, freeze frames).
///
/// Only snapshots captured with `frozen_update` fade during a freeze.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostFreeze(pub bool);
