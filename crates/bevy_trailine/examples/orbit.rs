//! Orbiting character leaving a motion trail.
//!
//! A procedural sprite circles the origin, dragging a five-node hair chain.
//!
//! Controls:
//! - `Space`: cycle color mode (pattern, hair color, onion skin)
//! - `C`: clear trails
//! - `F1`: toggle the atlas overlay
//! - `G`: toggle inverted gravity
//!
//! Run with: `cargo run -p bevy_trailine --example orbit`

use bevy::asset::RenderAssetUsages;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_trailine::{
  ClearTrails, HairChain, HairNode, TrailColorMode, TrailPlugin, TrailSettings, TrailSource,
  TrailSystems,
};

const ORBIT_RADIUS: f32 = 180.0;
const ORBIT_SPEED: f32 = 1.6;
const HAIR_NODES: usize = 5;
const HAIR_STEP: f32 = 3.0;

fn main() {
  App::new()
    .add_plugins(
      DefaultPlugins
        .set(ImagePlugin::default_nearest())
        .set(WindowPlugin {
          primary_window: Some(Window {
            title: "Trailine Orbit".to_string(),
            resolution: (1200, 800).into(),
            ..default()
          }),
          ..default()
        }),
    )
    .add_plugins(TrailPlugin::default().settings(TrailSettings {
      interval: 0.05,
      duration: 0.6,
      opacity: 0.8,
      ..default()
    }))
    .add_systems(Startup, setup)
    .add_systems(
      Update,
      (orbit_character, follow_hair)
        .chain()
        .before(TrailSystems::Capture),
    )
    .add_systems(Update, handle_input)
    .run();
}

#[derive(Component)]
struct Character;

/// Filled circle with a darker rim, `size` texels across.
fn body_image(size: u32) -> Image {
  let mut data = Vec::with_capacity((size * size * 4) as usize);
  let r = size as f32 * 0.5;
  for y in 0..size {
    for x in 0..size {
      let d = Vec2::new(x as f32 + 0.5 - r, y as f32 + 0.5 - r).length();
      let texel = if d > r {
        [0, 0, 0, 0]
      } else if d > r - 2.0 {
        [40, 40, 60, 255]
      } else {
        [230, 230, 240, 255]
      };
      data.extend_from_slice(&texel);
    }
  }
  Image::new(
    Extent3d {
      width: size,
      height: size,
      depth_or_array_layers: 1,
    },
    TextureDimension::D2,
    data,
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  )
}

fn setup(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
  commands.spawn(Camera2d);

  let hair = commands
    .spawn(HairChain {
      nodes: vec![HairNode::new(Vec2::ZERO, Vec2::ONE); HAIR_NODES],
      segment_image: images.add(body_image(8)),
      color: Color::srgb_u8(0xac, 0x32, 0x32),
    })
    .id();

  commands.spawn((
    Name::new("Character"),
    Character,
    TrailSource {
      hair: Some(hair),
      ..default()
    },
    Sprite::from_image(images.add(body_image(24))),
    Transform::from_xyz(ORBIT_RADIUS, 0.0, 10.0),
  ));
}

fn orbit_character(time: Res<Time>, mut characters: Query<&mut Transform, With<Character>>) {
  let angle = time.elapsed_secs() * ORBIT_SPEED;
  for mut transform in &mut characters {
    transform.translation.x = angle.cos() * ORBIT_RADIUS;
    transform.translation.y = angle.sin() * ORBIT_RADIUS * 0.6;
  }
}

/// Each node trails the previous one at a fixed distance.
fn follow_hair(
  characters: Query<(&Transform, &TrailSource), With<Character>>,
  mut chains: Query<&mut HairChain>,
) {
  for (transform, source) in &characters {
    let Some(mut chain) = source.hair.and_then(|e| chains.get_mut(e).ok()) else {
      continue;
    };
    let mut previous = transform.translation.truncate() + Vec2::new(0.0, 6.0);
    for (i, node) in chain.nodes.iter_mut().enumerate() {
      if i == 0 {
        node.position = previous;
      } else {
        let dir = (node.position - previous).normalize_or(Vec2::NEG_Y);
        node.position = previous + dir * HAIR_STEP;
      }
      node.scale = Vec2::splat(1.0 - i as f32 * 0.12);
      previous = node.position;
    }
  }
}

fn handle_input(
  keys: Res<ButtonInput<KeyCode>>,
  mut settings: ResMut<TrailSettings>,
  mut sources: Query<&mut TrailSource>,
  mut clears: MessageWriter<ClearTrails>,
) {
  if keys.just_pressed(KeyCode::Space) {
    settings.color_mode = match settings.color_mode {
      TrailColorMode::Pattern => TrailColorMode::HairColor,
      TrailColorMode::HairColor => TrailColorMode::OnionSkin,
      TrailColorMode::OnionSkin => TrailColorMode::Pattern,
    };
    info!("Trail color mode: {:?}", settings.color_mode);
  }
  if keys.just_pressed(KeyCode::KeyC) {
    clears.write(ClearTrails);
  }
  if keys.just_pressed(KeyCode::F1) {
    settings.debug.render_atlas = !settings.debug.render_atlas;
  }
  if keys.just_pressed(KeyCode::KeyG) {
    for mut source in &mut sources {
      source.inverted = !source.inverted;
    }
  }
}
