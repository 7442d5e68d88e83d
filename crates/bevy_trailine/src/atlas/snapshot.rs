use bevy::prelude::*;

/// Identifies a live snapshot by its atlas cell index.
///
/// Ids are reused once the snapshot is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(pub(crate) usize);

impl SnapshotId {
  /// Cell index in the atlas grid.
  #[inline]
  pub fn index(self) -> usize {
    self.0
  }
}

/// Everything needed to record one pose.
///
/// The sprite and hair entities are referenced, not copied: the compositor
/// renders their live state when the cell is (re)drawn.
#[derive(Clone, Copy, Debug)]
pub struct TrailCapture {
  pub position: Vec2,
  pub sprite: Entity,
  pub hair: Option<Entity>,
  pub scale: Vec2,
  pub color: Color,
  pub depth: f32,
  /// Lifetime in seconds. Zero or less draws the pose for a single frame.
  pub duration: f32,
  /// Keep fading while the host is frozen.
  pub frozen_update: bool,
  /// Fade on real time instead of virtual (pausable) time.
  pub use_raw_time: bool,
}

impl TrailCapture {
  /// A capture of `sprite` at `position` with unit scale, white tint and a
  /// one second lifetime.
  pub fn new(sprite: Entity, position: Vec2) -> Self {
    Self {
      position,
      sprite,
      hair: None,
      scale: Vec2::ONE,
      color: Color::WHITE,
      depth: 0.0,
      duration: 1.0,
      frozen_update: false,
      use_raw_time: false,
    }
  }
}

/// Coarse lifetime state, for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotState {
  /// Waiting for its cell to be composited.
  Pending,
  /// Composited and fading.
  Alive,
  /// Fully faded; removed on the next tick.
  Expiring,
}

/// One captured pose occupying one atlas cell.
#[derive(Clone, Debug)]
pub struct Snapshot {
  pub(crate) index: usize,
  /// Where the pose was captured; the compositor centers the cell on it.
  pub(crate) anchor: Vec2,
  /// Where the ghost is drawn. Starts at `anchor`.
  pub(crate) position: Vec2,
  pub(crate) sprite: Entity,
  pub(crate) hair: Option<Entity>,
  pub(crate) scale: Vec2,
  pub(crate) color: Color,
  pub(crate) depth: f32,
  pub(crate) percent: f32,
  pub(crate) duration: f32,
  pub(crate) drawn: bool,
  pub(crate) frozen_update: bool,
  pub(crate) use_raw_time: bool,
  pub(crate) ghost: Option<Entity>,
  pub(crate) presented: u32,
}

impl Snapshot {
  pub(crate) fn new(index: usize, capture: TrailCapture) -> Self {
    Self {
      index,
      anchor: capture.position,
      position: capture.position,
      sprite: capture.sprite,
      hair: capture.hair,
      scale: capture.scale,
      color: capture.color,
      depth: capture.depth,
      percent: 0.0,
      duration: capture.duration,
      drawn: false,
      frozen_update: capture.frozen_update,
      use_raw_time: capture.use_raw_time,
      ghost: None,
      presented: 0,
    }
  }

  #[inline]
  pub fn id(&self) -> SnapshotId {
    SnapshotId(self.index)
  }

  #[inline]
  pub fn index(&self) -> usize {
    self.index
  }

  /// Current world position of the ghost.
  #[inline]
  pub fn position(&self) -> Vec2 {
    self.position
  }

  /// Moves the ghost. The composited cell is unaffected.
  #[inline]
  pub fn set_position(&mut self, position: Vec2) {
    self.position = position;
  }

  /// World position at capture time.
  #[inline]
  pub fn captured_position(&self) -> Vec2 {
    self.anchor
  }

  #[inline]
  pub fn sprite(&self) -> Entity {
    self.sprite
  }

  #[inline]
  pub fn hair(&self) -> Option<Entity> {
    self.hair
  }

  #[inline]
  pub fn scale(&self) -> Vec2 {
    self.scale
  }

  #[inline]
  pub fn color(&self) -> Color {
    self.color
  }

  #[inline]
  pub fn depth(&self) -> f32 {
    self.depth
  }

  /// Fade progress, starting at 0.
  #[inline]
  pub fn percent(&self) -> f32 {
    self.percent
  }

  #[inline]
  pub fn duration(&self) -> f32 {
    self.duration
  }

  /// Whether the cell holds this pose.
  #[inline]
  pub fn is_drawn(&self) -> bool {
    self.drawn
  }

  /// Frames the presenter has shown this snapshot.
  #[inline]
  pub fn presented(&self) -> u32 {
    self.presented
  }

  /// True for zero-duration snapshots, which live for exactly one draw.
  #[inline]
  pub fn is_sentinel(&self) -> bool {
    self.duration <= 0.0
  }

  pub fn state(&self) -> SnapshotState {
    if !self.drawn {
      SnapshotState::Pending
    } else if self.percent >= 1.0 {
      SnapshotState::Expiring
    } else {
      SnapshotState::Alive
    }
  }

  /// Advances the fade by `elapsed` seconds.
  ///
  /// Returns true when the snapshot must be removed. The removal check runs
  /// before the increment, so a snapshot spends one tick fully faded.
  pub fn advance(&mut self, elapsed: f32) -> bool {
    if self.is_sentinel() {
      return self.drawn;
    }
    if self.percent >= 1.0 {
      return true;
    }
    self.percent += elapsed / self.duration;
    false
  }

  /// Ghost opacity scaled by the global trail opacity, in `[0, 1]`.
  pub fn opacity(&self, global: f32) -> f32 {
    let base = if self.is_sentinel() {
      1.0
    } else {
      fade_out(1.0 - self.percent)
    };
    (base * global).clamp(0.0, 1.0)
  }
}

/// Cubic ease-out: `1 - (1 - p)^3` for `p` in `[0, 1]`.
#[inline]
pub fn fade_out(p: f32) -> f32 {
  let inv = 1.0 - p.clamp(0.0, 1.0);
  1.0 - inv * inv * inv
}
