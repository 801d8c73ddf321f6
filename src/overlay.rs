// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame-synchronized detection overlay.
//!
//! Maps the shared playback position to a frame index, finds the
//! detections recorded for that exact index, and turns them into stroke
//! rectangles on a registered display surface. Clicks on the surface are
//! resolved back to source coordinates and hit-tested against the same
//! detections.
//!
//! The lookup is equality based: a frame record matches only when its
//! `frame_index` equals the derived index, and the first matching record
//! wins. Vector position means nothing here; sparse and out-of-order
//! track data render correctly without padding.

use egui::{pos2, Pos2, Rect, Rounding, Shape, Stroke, Vec2};

use crate::models::annotation::{AnnotatedFrame, DetectedObject};
use crate::util::colors;
use crate::util::geometry::ViewTransform;

/// Fixed annotation cadence of the source material.
pub const FRAME_RATE: f64 = 30.0;

/// Stroke width of detection rectangles, in surface pixels.
pub const STROKE_WIDTH: f32 = 2.0;

/// Frame index the overlay shows at a given playback position.
pub fn frame_index_at(seconds: f64) -> u32 {
    (seconds.max(0.0) * FRAME_RATE).floor() as u32
}

/// The frame record for `index`, if any. First match wins when an index
/// appears more than once.
pub fn active_frame(frames: &[AnnotatedFrame], index: u32) -> Option<&AnnotatedFrame> {
    frames.iter().find(|f| f.frame_index == index)
}

/// Display geometry for one feed's overlay.
///
/// Geometry is captured only when [`register`](Self::register) is called,
/// which the player does on each paused-to-playing transition. Between
/// transitions the captured mapping is reused as-is, so overlays drawn
/// after a resize stay at the old scale until playback restarts.
#[derive(Debug, Clone, Default)]
pub struct OverlaySurface {
    registered: Option<ViewTransform>,
}

impl OverlaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the mapping from source pixels to the current display
    /// rectangle.
    pub fn register(&mut self, source: Vec2, surface: Vec2) {
        self.registered = Some(ViewTransform::fit(
            (source.x, source.y),
            (surface.x, surface.y),
        ));
    }

    fn transform(&self) -> Option<&ViewTransform> {
        self.registered.as_ref()
    }
}

/// Stroke rectangles for the frame active at `seconds`, positioned from
/// `origin` (the surface's top-left corner in screen space).
///
/// Returns nothing when the surface has not been registered or no frame
/// record matches; a missing frame is an empty overlay, never an error.
pub fn overlay_shapes(
    frames: &[AnnotatedFrame],
    seconds: f64,
    surface: &OverlaySurface,
    origin: Pos2,
) -> Vec<Shape> {
    let Some(transform) = surface.transform() else {
        return Vec::new();
    };
    let Some(frame) = active_frame(frames, frame_index_at(seconds)) else {
        return Vec::new();
    };

    let mut shapes = Vec::with_capacity(frame.objects.len());
    for object in &frame.objects {
        let Some((x1, y1, x2, y2)) = object.corners() else {
            continue;
        };
        let (sx1, sy1) = transform.to_surface(x1, y1);
        let (sx2, sy2) = transform.to_surface(x2, y2);
        let rect = Rect::from_two_pos(
            pos2(origin.x + sx1, origin.y + sy1),
            pos2(origin.x + sx2, origin.y + sy2),
        );
        shapes.push(Shape::rect_stroke(
            rect,
            Rounding::ZERO,
            Stroke::new(STROKE_WIDTH, colors::object_color(&object.color, object.id)),
        ));
    }
    shapes
}

/// Resolve a click at `local` (surface coordinates, origin already
/// subtracted) to the detection under it, if any.
///
/// Bounds are compared exactly as stored, inclusive on all edges; the
/// first detection in payload order wins.
pub fn hit_test<'a>(
    frames: &'a [AnnotatedFrame],
    seconds: f64,
    surface: &OverlaySurface,
    local: Pos2,
) -> Option<&'a DetectedObject> {
    let transform = surface.transform()?;
    let frame = active_frame(frames, frame_index_at(seconds))?;
    let (x, y) = transform.to_source(local.x, local.y);

    frame.objects.iter().find(|object| {
        object
            .corners()
            .map(|(x1, y1, x2, y2)| x1 <= x && x <= x2 && y1 <= y && y <= y2)
            .unwrap_or(false)
    })
}
