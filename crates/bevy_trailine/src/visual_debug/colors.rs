//! Color palette for the atlas overlay.

use bevy::prelude::Color;

/// Green #88B04B
pub const GREEN: Color = Color::srgb(0.533, 0.690, 0.294);

/// Coral #FF6F61
pub const CORAL: Color = Color::srgb(1.0, 0.435, 0.380);
