//! Snapshot slot pool backed by one shared grid texture.
//!
//! Every live snapshot owns exactly one cell of the atlas. Adding a snapshot
//! takes the first free cell in index order and marks the atlas dirty; the
//! compositor redraws only cells whose snapshot has not been drawn yet.

mod layout;
mod snapshot;

use bevy::prelude::*;
pub use layout::AtlasLayout;
pub use snapshot::{Snapshot, SnapshotId, SnapshotState, TrailCapture, fade_out};

use crate::primitives::RgbaSurface;

/// The trail atlas: slot pool, CPU surface and GPU texture.
#[derive(Resource)]
pub struct TrailAtlas {
  pub(crate) layout: AtlasLayout,
  pub(crate) slots: Vec<Option<Snapshot>>,
  pub(crate) surface: Option<RgbaSurface>,
  pub(crate) texture: Option<Handle<Image>>,
  pub(crate) dirty: bool,
  /// Ghost entities of removed snapshots, despawned by the presenter.
  pub(crate) released: Vec<Entity>,
  pub(crate) live: usize,
  pub(crate) passes: u64,
}

impl Default for TrailAtlas {
  fn default() -> Self {
    Self::new(AtlasLayout::default())
  }
}

impl TrailAtlas {
  pub fn new(layout: AtlasLayout) -> Self {
    let mut slots = Vec::with_capacity(layout.capacity());
    slots.resize_with(layout.capacity(), || None);
    Self {
      layout,
      slots,
      surface: None,
      texture: None,
      dirty: false,
      released: Vec::new(),
      live: 0,
      passes: 0,
    }
  }

  #[inline]
  pub fn layout(&self) -> &AtlasLayout {
    &self.layout
  }

  /// Total number of slots.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  /// Number of live snapshots.
  #[inline]
  pub fn len(&self) -> usize {
    self.live
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.live == 0
  }

  /// Whether some cell is waiting to be composited.
  #[inline]
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Number of composite passes that did work.
  #[inline]
  pub fn passes(&self) -> u64 {
    self.passes
  }

  /// Atlas texture, once the first composite pass has created it.
  #[inline]
  pub fn texture(&self) -> Option<&Handle<Image>> {
    self.texture.as_ref()
  }

  /// CPU copy of the atlas, once allocated.
  #[inline]
  pub fn surface(&self) -> Option<&RgbaSurface> {
    self.surface.as_ref()
  }

  /// Records a pose in the first free cell.
  ///
  /// Returns `None` when every cell is taken; the capture is dropped.
  pub fn add(&mut self, capture: TrailCapture) -> Option<SnapshotId> {
    let index = self.slots.iter().position(Option::is_none)?;
    self.slots[index] = Some(Snapshot::new(index, capture));
    self.live += 1;
    self.dirty = true;
    Some(SnapshotId(index))
  }

  pub fn get(&self, id: SnapshotId) -> Option<&Snapshot> {
    self.slots.get(id.0)?.as_ref()
  }

  pub fn get_mut(&mut self, id: SnapshotId) -> Option<&mut Snapshot> {
    self.slots.get_mut(id.0)?.as_mut()
  }

  /// Live snapshots in cell order.
  pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
    self.slots.iter().flatten()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Snapshot> {
    self.slots.iter_mut().flatten()
  }

  /// Frees the cell of `id`. Returns false if it was already free.
  pub fn remove(&mut self, id: SnapshotId) -> bool {
    let Some(snapshot) = self.slots.get_mut(id.0).and_then(Option::take) else {
      return false;
    };
    self.live -= 1;
    if let Some(ghost) = snapshot.ghost {
      self.released.push(ghost);
    }
    true
  }

  /// Removes every live snapshot immediately.
  pub fn clear(&mut self) {
    for slot in &mut self.slots {
      if let Some(snapshot) = slot.take()
        && let Some(ghost) = snapshot.ghost
      {
        self.released.push(ghost);
      }
    }
    self.live = 0;
  }

  /// Advances every snapshot's fade and removes the finished ones.
  ///
  /// While `frozen`, only snapshots captured with `frozen_update` advance.
  /// Returns how many snapshots were removed.
  pub fn tick(&mut self, virtual_delta: f32, raw_delta: f32, frozen: bool) -> usize {
    let mut removed = 0;
    for slot in &mut self.slots {
      let Some(snapshot) = slot else {
        continue;
      };
      if frozen && !snapshot.frozen_update {
        continue;
      }
      let delta = if snapshot.use_raw_time {
        raw_delta
      } else {
        virtual_delta
      };
      if snapshot.advance(delta) {
        if let Some(ghost) = snapshot.ghost {
          self.released.push(ghost);
        }
        *slot = None;
        removed += 1;
      }
    }
    self.live -= removed;
    removed
  }

  /// Drops the surface and forgets the texture, returning its handle.
  ///
  /// Idempotent: a second call returns `None`.
  pub fn dispose(&mut self) -> Option<Handle<Image>> {
    self.surface = None;
    let texture = self.texture.take();
    if texture.is_some() {
      // Cells must be redrawn into the next texture.
      for snapshot in self.iter_mut() {
        snapshot.drawn = false;
      }
      self.dirty = self.live > 0;
    }
    texture
  }

  pub(crate) fn take_released(&mut self) -> Vec<Entity> {
    std::mem::take(&mut self.released)
  }
}
