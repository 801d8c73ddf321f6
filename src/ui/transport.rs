// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback transport controls.
//!
//! Play/pause button, seek slider, and the frame/time readout shared by
//! every feed.

use crate::models::playback::PlaybackClock;
use crate::overlay;

/// Result of transport interaction.
pub enum TransportAction {
    None,
    TogglePlay,
    Seek(f64),
}

/// Display the transport bar for the shared clock.
pub fn show(ui: &mut egui::Ui, clock: &PlaybackClock) -> TransportAction {
    let mut action = TransportAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let label = if clock.is_playing() { "⏸ Pause" } else { "▶ Play" };
        if ui.button(label).clicked() {
            action = TransportAction::TogglePlay;
        }

        ui.separator();

        let duration = clock.duration().unwrap_or(0.0);
        let mut position = clock.position();
        let slider = egui::Slider::new(&mut position, 0.0..=duration.max(0.001))
            .show_value(false)
            .trailing_fill(true);
        if ui.add(slider).changed() {
            action = TransportAction::Seek(position);
        }

        ui.separator();

        ui.label(format!(
            "{} / {}  (frame {})",
            format_time(clock.position()),
            format_time(duration),
            overlay::frame_index_at(clock.position())
        ));
    });

    action
}

/// Seconds as "m:ss.t". Rounds to tenths first so the seconds field
/// carries into the minutes instead of reading "60.0".
fn format_time(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let minutes = tenths / 600;
    let rest = (tenths % 600) as f64 / 10.0;
    format!("{}:{:04.1}", minutes, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00.0");
        assert_eq!(format_time(9.96), "0:10.0");
        assert_eq!(format_time(59.94), "0:59.9");
        assert_eq!(format_time(59.96), "1:00.0");
        assert_eq!(format_time(65.25), "1:05.3");
        assert_eq!(format_time(-3.0), "0:00.0");
    }
}
