// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the transform between source-video pixel
//! coordinates (the space detection bounding boxes are expressed in)
//! and the rendered surface the overlay paints on.

/// Per-axis scale from source-video pixels to a rendered surface.
///
/// Built from the video's intrinsic size and the surface size captured at
/// the last play transition. Degenerates to the identity when the surface
/// matches the source exactly, or when the source size is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale_x: f32,
    scale_y: f32,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Build a transform that maps `source` pixel space onto `surface`.
    /// A degenerate source or surface size yields the identity.
    pub fn fit(source: (f32, f32), surface: (f32, f32)) -> Self {
        if source.0 <= 0.0 || source.1 <= 0.0 || surface.0 <= 0.0 || surface.1 <= 0.0 {
            return Self::IDENTITY;
        }
        Self {
            scale_x: surface.0 / source.0,
            scale_y: surface.1 / source.1,
        }
    }

    /// Map a point from source-video pixels to surface coordinates.
    pub fn to_surface(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale_x, y * self.scale_y)
    }

    /// Map a point from surface coordinates back to source-video pixels.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.scale_x, y / self.scale_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_when_sizes_match() {
        let t = ViewTransform::fit((1920.0, 1080.0), (1920.0, 1080.0));
        assert_eq!(t, ViewTransform::IDENTITY);
        assert_eq!(t.to_surface(960.0, 540.0), (960.0, 540.0));
    }

    #[test]
    fn test_roundtrip_scaled() {
        let t = ViewTransform::fit((1920.0, 1080.0), (640.0, 360.0));
        let (sx, sy) = t.to_surface(960.0, 540.0);
        assert!((sx - 320.0).abs() < 0.0001);
        assert!((sy - 180.0).abs() < 0.0001);

        let (bx, by) = t.to_source(sx, sy);
        assert!((bx - 960.0).abs() < 0.0001);
        assert!((by - 540.0).abs() < 0.0001);
    }

    #[test]
    fn test_degenerate_source_is_identity() {
        let t = ViewTransform::fit((0.0, 0.0), (640.0, 360.0));
        assert_eq!(t, ViewTransform::IDENTITY);

        let t = ViewTransform::fit((1920.0, 1080.0), (0.0, 360.0));
        assert_eq!(t, ViewTransform::IDENTITY);
    }

    #[test]
    fn test_anisotropic_scale() {
        // Width halved, height untouched: axes scale independently.
        let t = ViewTransform::fit((100.0, 100.0), (50.0, 100.0));
        assert_eq!(t.to_surface(10.0, 10.0), (5.0, 10.0));
        assert_eq!(t.to_source(5.0, 10.0), (10.0, 10.0));
    }
}
