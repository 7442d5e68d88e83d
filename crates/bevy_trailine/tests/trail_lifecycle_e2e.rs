//! E2E tests for the trail frame loop.
//!
//! Tests:
//! - Steady-state snapshot count under continuous capture
//! - Ghost sprites tracking live snapshots
//! - Single-frame (zero duration) snapshots
//! - Clearing, mode changes and teardown
//! - Silhouette vs onion-skin compositing
//! - Freeze, pause and inverted gravity handling
//! - Capture of same-frame movement and mirrored scale
//! - Compositing real hair chains, sprite rects and atlas frames

use std::time::Duration;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::time::TimeUpdateStrategy;
use bevy_trailine::{
  AddTrail, AtlasLayout, ClearTrails, HairChain, HairNode, HostFreeze, Rgba, TrailAtlas,
  TrailCapture, TrailColorMode, TrailGhost, TrailPlugin, TrailSettings, TrailSource, TrailSystems,
  TrailTeardown,
};

/// Simulated frame delta (64 FPS, exact in binary)
const DT: f32 = 1.0 / 64.0;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

struct TrailHarness {
  app: App,
  source: Entity,
}

impl TrailHarness {
  fn new(settings: TrailSettings) -> Self {
    Self::with_layout(settings, AtlasLayout::new(16, 8, 8))
  }

  fn with_layout(settings: TrailSettings, layout: AtlasLayout) -> Self {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(bevy::asset::AssetPlugin::default());
    // ImagePlugin registers the Image asset type
    app.add_plugins(bevy::image::ImagePlugin::default());
    app.add_plugins(bevy::image::TextureAtlasPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(DT)));
    app.add_plugins(TrailPlugin::default().settings(settings).layout(layout));

    let image = solid_image(&mut app, 4, 4, RED);
    let source = app
      .world_mut()
      .spawn((
        TrailSource::default(),
        Sprite::from_image(image),
        Transform::from_xyz(10.0, 20.0, 5.0),
      ))
      .id();

    Self { app, source }
  }

  fn run(&mut self, updates: usize) {
    for _ in 0..updates {
      self.app.update();
    }
  }

  fn atlas(&self) -> &TrailAtlas {
    self.app.world().resource::<TrailAtlas>()
  }

  fn settings_mut(&mut self) -> Mut<'_, TrailSettings> {
    self.app.world_mut().resource_mut::<TrailSettings>()
  }

  fn add(&mut self, capture: TrailCapture) {
    AddTrail(capture).apply(self.app.world_mut());
  }

  fn ghosts(&mut self) -> Vec<(TrailGhost, Sprite, Transform)> {
    let world = self.app.world_mut();
    let mut query = world.query::<(&TrailGhost, &Sprite, &Transform)>();
    query
      .iter(world)
      .map(|(g, s, t)| (*g, s.clone(), *t))
      .collect()
  }
}

fn solid_image(app: &mut App, width: u32, height: u32, texel: [u8; 4]) -> Handle<Image> {
  let image = Image::new_fill(
    Extent3d {
      width,
      height,
      depth_or_array_layers: 1,
    },
    TextureDimension::D2,
    &texel,
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  app.world_mut().resource_mut::<Assets<Image>>().add(image)
}

/// 4x2 image: left half red, right half green.
fn split_image(app: &mut App) -> Handle<Image> {
  let data = [RED, RED, GREEN, GREEN, RED, RED, GREEN, GREEN].concat();
  let image = Image::new(
    Extent3d {
      width: 4,
      height: 2,
      depth_or_array_layers: 1,
    },
    TextureDimension::D2,
    data,
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  app.world_mut().resource_mut::<Assets<Image>>().add(image)
}

fn step_right(mut sources: Query<&mut Transform, With<TrailSource>>) {
  for mut transform in &mut sources {
    transform.translation.x += 10.0;
  }
}

fn capture_only_manually() -> TrailSettings {
  TrailSettings {
    enabled: false,
    opacity: 1.0,
    ..default()
  }
}

#[test]
fn continuous_capture_reaches_steady_state() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.125,
    duration: 2.0,
    opacity: 1.0,
    ..default()
  });

  // Five simulated seconds: well past one full lifetime.
  harness.run(320);

  // duration / interval = 16, plus the tick spent fully faded.
  let live = harness.atlas().len();
  assert!((15..=18).contains(&live), "live snapshots: {live}");

  // Cells are reused: indices never exceed the steady-state working set.
  assert!(harness.atlas().iter().all(|s| s.index() < 20));
}

#[test]
fn ghosts_track_live_snapshots() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.125,
    duration: 0.5,
    opacity: 1.0,
    ..default()
  });
  harness.run(200);

  let layout = *harness.atlas().layout();
  let snapshots: Vec<_> = harness.atlas().iter().cloned().collect();
  let ghosts = harness.ghosts();
  assert!(!snapshots.is_empty());
  assert_eq!(ghosts.len(), snapshots.len());

  for (ghost, sprite, transform) in ghosts {
    let snapshot = snapshots
      .iter()
      .find(|s| s.index() == ghost.index)
      .expect("ghost without snapshot");
    assert_eq!(sprite.rect, Some(layout.cell_rect(ghost.index).to_bevy()));
    assert_eq!(transform.translation.truncate(), Vec2::new(10.0, 20.0));
    assert!(transform.translation.z < 5.0);
    assert_eq!(transform.translation.z, snapshot.depth());
    let alpha = sprite.color.alpha();
    assert!((0.0..=1.0).contains(&alpha));
  }
}

#[test]
fn zero_duration_snapshot_is_presented_once() {
  let mut harness = TrailHarness::new(capture_only_manually());
  let mut capture = TrailCapture::new(harness.source, Vec2::ZERO);
  capture.duration = 0.0;
  harness.add(capture);

  harness.run(1);
  let snapshot = harness.atlas().iter().next().cloned().expect("snapshot");
  assert!(snapshot.is_drawn());
  assert_eq!(snapshot.presented(), 1);
  assert_eq!(harness.ghosts().len(), 1);

  harness.run(1);
  assert!(harness.atlas().is_empty());
  assert!(harness.ghosts().is_empty());
}

#[test]
fn clear_message_frees_full_pool() {
  let mut harness =
    TrailHarness::with_layout(capture_only_manually(), AtlasLayout::new(16, 2, 2));
  let source = harness.source;
  for _ in 0..4 {
    harness.add(TrailCapture::new(source, Vec2::ZERO));
  }
  assert_eq!(harness.atlas().len(), 4);

  let full = harness
    .app
    .world_mut()
    .resource_mut::<TrailAtlas>()
    .add(TrailCapture::new(source, Vec2::ZERO));
  assert!(full.is_none());

  harness.run(1);
  assert_eq!(harness.ghosts().len(), 4);

  harness.app.world_mut().write_message(ClearTrails);
  harness.run(1);
  assert!(harness.atlas().is_empty());
  assert!(harness.ghosts().is_empty());

  harness.add(TrailCapture::new(source, Vec2::ZERO));
  assert_eq!(harness.atlas().len(), 1);
}

#[test]
fn color_mode_change_clears_trails() {
  let mut harness = TrailHarness::new(capture_only_manually());
  let source = harness.source;
  harness.run(1);
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  harness.run(1);
  assert_eq!(harness.atlas().len(), 1);

  harness.settings_mut().color_mode = TrailColorMode::OnionSkin;
  harness.run(1);
  assert!(harness.atlas().is_empty());
}

#[test]
fn texture_is_created_lazily_and_released_on_teardown() {
  let mut harness = TrailHarness::new(capture_only_manually());
  harness.run(3);
  assert!(harness.atlas().texture().is_none());

  let source = harness.source;
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  harness.run(1);
  let handle = harness.atlas().texture().cloned().expect("atlas texture");
  assert!(harness.app.world().resource::<Assets<Image>>().get(&handle).is_some());

  harness.app.world_mut().write_message(TrailTeardown);
  harness.run(1);
  assert!(harness.atlas().texture().is_none());
  assert!(harness.atlas().surface().is_none());
  assert!(harness.atlas().is_empty());
  assert!(harness.app.world().resource::<Assets<Image>>().get(&handle).is_none());

  // Teardown twice is harmless.
  harness.app.world_mut().write_message(TrailTeardown);
  harness.run(1);
  assert!(harness.atlas().texture().is_none());
}

#[test]
fn silhouette_modes_whiten_cells() {
  let mut harness = TrailHarness::new(capture_only_manually());
  let source = harness.source;
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  harness.run(1);

  let surface = harness.atlas().surface().expect("surface");
  assert_eq!(surface[(8, 8)], Rgba::new(255, 255, 255, 255));
  assert_eq!(surface[(0, 0)], Rgba::new(0, 0, 0, 0));
}

#[test]
fn onion_skin_keeps_sprite_colors() {
  let mut harness = TrailHarness::new(TrailSettings {
    color_mode: TrailColorMode::OnionSkin,
    ..capture_only_manually()
  });
  let source = harness.source;
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  harness.run(1);

  let surface = harness.atlas().surface().expect("surface");
  assert_eq!(surface[(8, 8)], Rgba::new(255, 0, 0, 255));
}

#[test]
fn inverted_source_flips_scale() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.0,
    ..default()
  });
  let source = harness.source;
  harness
    .app
    .world_mut()
    .get_mut::<TrailSource>(source)
    .unwrap()
    .inverted = true;
  harness.run(3);

  let snapshot = harness.atlas().iter().next().cloned().expect("snapshot");
  assert_eq!(snapshot.scale(), Vec2::new(1.0, -1.0));
  assert_eq!(snapshot.position(), Vec2::new(10.0, 20.0));
}

#[test]
fn suppressed_source_is_not_captured() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.0,
    ..default()
  });
  let source = harness.source;
  harness
    .app
    .world_mut()
    .get_mut::<TrailSource>(source)
    .unwrap()
    .suppressed = true;
  harness.run(10);
  assert!(harness.atlas().is_empty());
}

#[test]
fn hair_color_mode_uses_chain_color() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.0,
    color_mode: TrailColorMode::HairColor,
    ..default()
  });
  let hair_image = solid_image(&mut harness.app, 2, 2, [255, 255, 255, 255]);
  let hair_color = Color::srgb(0.25, 0.5, 1.0);
  let hair = harness
    .app
    .world_mut()
    .spawn(HairChain {
      nodes: vec![HairNode::new(Vec2::new(10.0, 20.0), Vec2::ONE)],
      segment_image: hair_image,
      color: hair_color,
    })
    .id();
  let source = harness.source;
  harness
    .app
    .world_mut()
    .get_mut::<TrailSource>(source)
    .unwrap()
    .hair = Some(hair);
  harness.run(3);

  let snapshot = harness.atlas().iter().next().cloned().expect("snapshot");
  assert_eq!(snapshot.color(), hair_color);
  assert_eq!(snapshot.hair(), Some(hair));
}

#[test]
fn host_freeze_holds_fades() {
  let mut harness = TrailHarness::new(capture_only_manually());
  let source = harness.source;
  harness.run(1);
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  let mut frozen = TrailCapture::new(source, Vec2::ZERO);
  frozen.frozen_update = true;
  harness.add(frozen);

  harness.app.insert_resource(HostFreeze(true));
  harness.run(4);

  let percents: Vec<f32> = harness.atlas().iter().map(|s| s.percent()).collect();
  assert_eq!(percents[0], 0.0);
  assert!(percents[1] > 0.0);
}

#[test]
fn raw_time_fades_while_paused() {
  let mut harness = TrailHarness::new(capture_only_manually());
  let source = harness.source;
  harness.run(1);
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  let mut raw = TrailCapture::new(source, Vec2::ZERO);
  raw.use_raw_time = true;
  harness.add(raw);

  harness.app.world_mut().resource_mut::<Time<Virtual>>().pause();
  harness.run(4);

  let percents: Vec<f32> = harness.atlas().iter().map(|s| s.percent()).collect();
  assert_eq!(percents[0], 0.0);
  assert!(percents[1] > 0.0);
}

#[test]
fn despawned_source_leaves_empty_cell() {
  let mut harness = TrailHarness::new(TrailSettings {
    color_mode: TrailColorMode::OnionSkin,
    ..capture_only_manually()
  });
  let source = harness.source;
  harness.add(TrailCapture::new(source, Vec2::ZERO));
  harness.app.world_mut().despawn(source);
  harness.run(1);

  let snapshot = harness.atlas().iter().next().cloned().expect("snapshot");
  assert!(snapshot.is_drawn());
  assert_eq!(harness.atlas().surface().expect("surface")[(8, 8)], Rgba::new(0, 0, 0, 0));
}

#[test]
fn capture_sees_movement_from_the_same_frame() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.0,
    opacity: 1.0,
    ..default()
  });
  harness
    .app
    .add_systems(Update, step_right.before(TrailSystems::Capture));
  harness.run(3);

  let source = harness.source;
  let current = harness.app.world().get::<Transform>(source).unwrap().translation;
  let latest = harness
    .atlas()
    .iter()
    .max_by_key(|s| s.index())
    .cloned()
    .expect("snapshot");
  assert_eq!(latest.position(), current.truncate());
  assert_eq!(current.x, 40.0);

  let ghost = harness
    .ghosts()
    .into_iter()
    .find(|(g, _, _)| g.index == latest.index())
    .expect("ghost");
  assert_eq!(ghost.2.translation.truncate(), current.truncate());
}

#[test]
fn mirrored_scale_is_captured() {
  let mut harness = TrailHarness::new(TrailSettings {
    interval: 0.0,
    ..default()
  });
  let source = harness.source;
  harness
    .app
    .world_mut()
    .get_mut::<Transform>(source)
    .unwrap()
    .scale = Vec3::new(-1.0, -1.0, 1.0);
  harness.run(3);

  let snapshot = harness.atlas().iter().next().cloned().expect("snapshot");
  assert_eq!(snapshot.scale(), Vec2::new(-1.0, -1.0));
}

#[test]
fn escaping_hair_chain_is_truncated() {
  let mut harness = TrailHarness::new(TrailSettings {
    color_mode: TrailColorMode::OnionSkin,
    ..capture_only_manually()
  });
  let hair_image = solid_image(&mut harness.app, 2, 2, [255, 255, 255, 255]);
  // Cell limit is 16 / 2 - 1 = 7. Node 2 spans x -8..-6 and fails, so
  // node 3 is dropped even though it would fit.
  let nodes = vec![
    HairNode::new(Vec2::new(10.0, 20.0), Vec2::ONE),
    HairNode::new(Vec2::new(7.0, 20.0), Vec2::ONE),
    HairNode::new(Vec2::new(3.0, 20.0), Vec2::ONE),
    HairNode::new(Vec2::new(10.0, 15.0), Vec2::ONE),
  ];
  let hair = harness
    .app
    .world_mut()
    .spawn(HairChain {
      nodes: nodes.clone(),
      segment_image: hair_image,
      color: Color::srgb(0.0, 0.0, 1.0),
    })
    .id();

  let mut capture = TrailCapture::new(harness.source, Vec2::new(10.0, 20.0));
  capture.hair = Some(hair);
  harness.add(capture);
  harness.run(1);

  // Cell 0 center (8, 8); the 4x4 sprite covers 6..10 on both axes.
  let blue = Rgba::new(0, 0, 255, 255);
  let clear = Rgba::new(0, 0, 0, 0);
  let surface = harness.atlas().surface().expect("surface");
  assert_eq!(surface[(8, 8)], Rgba::new(255, 0, 0, 255));
  assert_eq!(surface[(4, 8)], blue);
  assert_eq!(surface[(5, 7)], blue);
  assert_eq!(surface[(0, 8)], clear);
  assert_eq!(surface[(1, 7)], clear);
  assert_eq!(surface[(8, 12)], clear);
  assert_eq!(surface[(7, 13)], clear);

  let chain = harness.app.world().get::<HairChain>(hair).unwrap();
  assert_eq!(chain.nodes, nodes);
}

#[test]
fn sprite_rect_selects_source_region() {
  let mut harness = TrailHarness::new(TrailSettings {
    color_mode: TrailColorMode::OnionSkin,
    ..capture_only_manually()
  });
  let image = split_image(&mut harness.app);
  let sprite = harness
    .app
    .world_mut()
    .spawn(Sprite {
      image,
      rect: Some(Rect::new(2.0, 0.0, 4.0, 2.0)),
      ..default()
    })
    .id();
  harness.add(TrailCapture::new(sprite, Vec2::ZERO));
  harness.run(1);

  // Only the 2x2 green half is drawn, centered on (8, 8).
  let surface = harness.atlas().surface().expect("surface");
  assert_eq!(surface[(7, 7)], Rgba::new(0, 255, 0, 255));
  assert_eq!(surface[(8, 8)], Rgba::new(0, 255, 0, 255));
  assert_eq!(surface[(6, 8)], Rgba::new(0, 0, 0, 0));
  assert_eq!(surface[(9, 8)], Rgba::new(0, 0, 0, 0));
}

#[test]
fn atlas_sprite_uses_its_frame() {
  let mut harness = TrailHarness::new(TrailSettings {
    color_mode: TrailColorMode::OnionSkin,
    ..capture_only_manually()
  });
  let image = split_image(&mut harness.app);
  let layout = harness
    .app
    .world_mut()
    .resource_mut::<Assets<TextureAtlasLayout>>()
    .add(TextureAtlasLayout::from_grid(UVec2::splat(2), 2, 1, None, None));
  let sprite = harness
    .app
    .world_mut()
    .spawn(Sprite::from_atlas_image(
      image,
      TextureAtlas { layout, index: 1 },
    ))
    .id();
  harness.add(TrailCapture::new(sprite, Vec2::ZERO));
  harness.run(1);

  let surface = harness.atlas().surface().expect("surface");
  assert_eq!(surface[(7, 7)], Rgba::new(0, 255, 0, 255));
  assert_eq!(surface[(8, 8)], Rgba::new(0, 255, 0, 255));
  assert_eq!(surface[(6, 8)], Rgba::new(0, 0, 0, 0));
}

#[test]
fn moved_snapshot_moves_its_ghost() {
  let mut harness = TrailHarness::new(capture_only_manually());
  let source = harness.source;
  harness.add(TrailCapture::new(source, Vec2::new(10.0, 20.0)));
  harness.run(1);

  {
    let mut atlas = harness.app.world_mut().resource_mut::<TrailAtlas>();
    for snapshot in atlas.iter_mut() {
      snapshot.set_position(Vec2::new(-50.0, 0.0));
    }
    assert!(!atlas.is_dirty());
  }
  harness.run(1);

  let ghosts = harness.ghosts();
  assert_eq!(ghosts.len(), 1);
  assert_eq!(ghosts[0].2.translation.truncate(), Vec2::new(-50.0, 0.0));
}

/// Pool of 4096 cells, 0.1s interval, 2s lifetime: the live count settles
/// near duration / interval and never grows past it.
#[test]
fn default_pool_scenario_settles_near_twenty() {
  let mut atlas = TrailAtlas::default();
  assert_eq!(atlas.capacity(), 4096);

  let dt = 0.01;
  let mut elapsed = 0.0f32;
  let mut max_live = 0;
  for _ in 0..600 {
    atlas.tick(dt, dt, false);
    elapsed += dt;
    if bevy_trailine::on_interval(elapsed, dt, 0.1) {
      let mut capture = TrailCapture::new(Entity::PLACEHOLDER, Vec2::ZERO);
      capture.duration = 2.0;
      assert!(atlas.add(capture).is_some());
    }
    max_live = max_live.max(atlas.len());
  }

  let live = atlas.len();
  assert!((19..=22).contains(&live), "live snapshots: {live}");
  assert!(max_live <= 22);
  assert!(atlas.iter().all(|s| s.index() < 22));
}
