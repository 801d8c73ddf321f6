// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-feed playback surface.
//!
//! This module renders one camera feed: the frame for the shared clock
//! position, the detection overlay on top of it, and click handling for
//! picking a detection.

use crate::io::media::Feed;
use crate::models::annotation::{AnnotatedFrame, DetectedObject};
use crate::overlay::{self, OverlaySurface};

/// Result of feed interaction.
pub enum PlayerAction {
    None,
    /// The user clicked a detection on this feed.
    ObjectActivated(DetectedObject),
}

/// One feed's display state: decoder, current texture, and the overlay
/// registration captured at the last play transition.
pub struct FeedView {
    pub feed: Feed,
    texture: Option<egui::TextureHandle>,
    texture_index: Option<u32>,
    surface: OverlaySurface,
}

impl FeedView {
    pub fn new(feed: Feed) -> Self {
        Self {
            feed,
            texture: None,
            texture_index: None,
            surface: OverlaySurface::new(),
        }
    }

    pub fn label(&self) -> String {
        self.feed.label()
    }

    pub fn duration_secs(&self) -> f64 {
        self.feed.store.duration_secs()
    }

    /// Draw this feed for the clock position `seconds`. When `register`
    /// is set (the clock just transitioned to playing), the overlay
    /// geometry is recaptured from the rectangle drawn this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        seconds: f64,
        frames: &[AnnotatedFrame],
        register: bool,
    ) -> PlayerAction {
        let mut action = PlayerAction::None;

        ui.label(egui::RichText::new(self.label()).strong());

        // Fit to the column width, keeping the source aspect ratio.
        let source_size = self
            .feed
            .store
            .size()
            .filter(|(w, h)| *w > 0 && *h > 0);
        let aspect = source_size
            .map(|(w, h)| w as f32 / h as f32)
            .unwrap_or(16.0 / 9.0);
        let display_width = ui.available_width();
        let display_size = egui::vec2(display_width, display_width / aspect);

        let (rect, response) = ui.allocate_exact_size(display_size, egui::Sense::click());

        self.update_texture(ui.ctx(), seconds);

        let painter = ui.painter_at(rect);
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(25));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No frames",
                egui::FontId::proportional(14.0),
                egui::Color32::from_gray(130),
            );
        }

        if register {
            let source = source_size
                .map(|(w, h)| egui::vec2(w as f32, h as f32))
                .unwrap_or_else(|| rect.size());
            self.surface.register(source, rect.size());
        }

        // Overlay for the frame the clock points at right now.
        painter.extend(overlay::overlay_shapes(frames, seconds, &self.surface, rect.min));

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = egui::pos2(pos.x - rect.min.x, pos.y - rect.min.y);
                if let Some(object) = overlay::hit_test(frames, seconds, &self.surface, local) {
                    action = PlayerAction::ObjectActivated(object.clone());
                }
            }
        }

        action
    }

    /// Load the texture for the clock position, reusing the current one
    /// while the displayed frame index is unchanged.
    fn update_texture(&mut self, ctx: &egui::Context, seconds: f64) {
        let count = self.feed.store.frame_count();
        if count == 0 {
            return;
        }
        let display_index = overlay::frame_index_at(seconds).min(count - 1);
        if self.texture_index == Some(display_index) {
            return;
        }

        // Record the attempt either way so a bad frame is not re-decoded
        // on every repaint.
        self.texture_index = Some(display_index);
        if let Some(img) = self.feed.store.frame_at(display_index) {
            let size = [img.width as usize, img.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &img.pixels);
            self.texture = Some(ctx.load_texture(
                format!("feed_{}", self.feed.name),
                color_image,
                egui::TextureOptions::LINEAR,
            ));
        }
    }
}
