// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stroke color handling for detection overlays.
//!
//! Tracking payloads carry colors as free-form strings (CSS-style names
//! or hex). This module parses the common forms and supplies a
//! deterministic per-track fallback palette for objects without a usable
//! color.

use egui::Color32;

/// Distinct palette for tracks that arrive without a color of their own.
const TRACK_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

/// Parse a color string as the tracking payloads express them: a CSS-style
/// name ("blue") or a `#rrggbb` hex triplet.
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color32::from_rgb(r, g, b));
        }
        return None;
    }

    let named = match value.to_ascii_lowercase().as_str() {
        "red" => Color32::from_rgb(255, 0, 0),
        "green" => Color32::from_rgb(0, 128, 0),
        "blue" => Color32::from_rgb(0, 0, 255),
        "yellow" => Color32::from_rgb(255, 255, 0),
        "orange" => Color32::from_rgb(255, 165, 0),
        "purple" => Color32::from_rgb(128, 0, 128),
        "cyan" => Color32::from_rgb(0, 255, 255),
        "magenta" => Color32::from_rgb(255, 0, 255),
        "pink" => Color32::from_rgb(255, 192, 203),
        "lime" => Color32::from_rgb(0, 255, 0),
        "teal" => Color32::from_rgb(0, 128, 128),
        "navy" => Color32::from_rgb(0, 0, 128),
        "white" => Color32::from_rgb(255, 255, 255),
        "black" => Color32::from_rgb(0, 0, 0),
        "gray" | "grey" => Color32::from_rgb(128, 128, 128),
        _ => return None,
    };
    Some(named)
}

/// Deterministic palette color for a track id.
pub fn track_color(id: i64) -> Color32 {
    let index = id.rem_euclid(TRACK_PALETTE.len() as i64) as usize;
    TRACK_PALETTE[index]
}

/// Resolve the stroke color for one detected object: its own color string
/// when parseable, the track palette otherwise.
pub fn object_color(color: &str, id: Option<i64>) -> Color32 {
    parse_color(color).unwrap_or_else(|| track_color(id.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("blue"), Some(Color32::from_rgb(0, 0, 255)));
        assert_eq!(parse_color("RED"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(parse_color(" grey "), Some(Color32::from_rgb(128, 128, 128)));
        assert_eq!(parse_color("chartreuse"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_color("#ff8000"), Some(Color32::from_rgb(255, 128, 0)));
        assert_eq!(parse_color("#f80"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_track_palette_is_stable_and_distinct() {
        assert_eq!(track_color(3), track_color(3));
        assert_ne!(track_color(0), track_color(1));
        // Wraps past the palette length and never panics on negatives.
        assert_eq!(track_color(10), track_color(0));
        assert_eq!(track_color(-3), track_color(7));
    }

    #[test]
    fn test_object_color_fallback() {
        assert_eq!(object_color("red", Some(5)), Color32::from_rgb(255, 0, 0));
        assert_eq!(object_color("", Some(5)), track_color(5));
        assert_eq!(object_color("not-a-color", None), track_color(0));
    }
}
