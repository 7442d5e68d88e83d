use bevy::prelude::*;
use serde::{Deserialize, Deserializer, de};

/// A looping color gradient sampled by scene time.
///
/// Colors are spaced evenly over `duration` seconds and the last one blends
/// back into the first.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrailPattern {
  #[serde(deserialize_with = "deserialize_hex_colors")]
  pub colors: Vec<Color>,
  pub duration: f32,
}

impl Default for TrailPattern {
  fn default() -> Self {
    Self {
      colors: vec![Color::srgb_u8(0xac, 0x32, 0x32), Color::srgb_u8(0x44, 0xb7, 0xff)],
      duration: 1.0,
    }
  }
}

impl TrailPattern {
  pub fn new(colors: Vec<Color>, duration: f32) -> Self {
    Self { colors, duration }
  }

  /// Color of the gradient at `time` seconds.
  pub fn color_at(&self, time: f32) -> Color {
    let n = self.colors.len();
    match n {
      0 => return Color::WHITE,
      1 => return self.colors[0],
      _ => {}
    }
    if self.duration <= 0.0 || !time.is_finite() {
      return self.colors[0];
    }

    let phase = (time / self.duration).rem_euclid(1.0) * n as f32;
    let i = (phase.floor() as usize) % n;
    let t = phase - phase.floor();

    let from = self.colors[i].to_srgba();
    let to = self.colors[(i + 1) % n].to_srgba();
    Color::Srgba(from.mix(&to, t))
  }
}

/// Parses `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Result<Color, String> {
  let s = s.trim_start_matches('#');
  if s.len() != 6 {
    return Err(format!("hex color must be 6 characters, got {s:?}"));
  }
  let channel = |range: std::ops::Range<usize>| {
    s.get(range)
      .ok_or_else(|| format!("invalid hex color {s:?}"))
      .and_then(|c| u8::from_str_radix(c, 16).map_err(|e| e.to_string()))
  };
  Ok(Color::srgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn deserialize_hex_colors<'de, D>(deserializer: D) -> Result<Vec<Color>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Vec<String> = Deserialize::deserialize(deserializer)?;
  raw
    .iter()
    .map(|s| parse_hex_color(s).map_err(de::Error::custom))
    .collect()
}
