//! Trail debug UI helpers.

use bevy_egui::egui;

use crate::config::TrailSettings;

/// Renders trail setting controls into the given egui UI.
/// Returns true if any setting changed.
pub fn trail_debug_checkboxes(ui: &mut egui::Ui, settings: &mut TrailSettings) -> bool {
  let mut changed = false;

  changed |= ui.checkbox(&mut settings.enabled, "Trails").changed();
  changed |= ui
    .checkbox(&mut settings.debug.render_atlas, "Trail atlas")
    .changed();
  changed |= ui
    .checkbox(&mut settings.hide_host_trails, "Hide host trails")
    .changed();
  changed |= ui
    .checkbox(&mut settings.use_raw_time, "Fade on real time")
    .changed();
  changed |= ui
    .add(egui::Slider::new(&mut settings.opacity, 0.0..=1.0).text("Trail opacity"))
    .changed();

  changed
}
