// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking annotation data structures.
//!
//! This module defines the per-frame detection payloads exchanged with
//! the tracking service and stored inside project archives.

use serde::{Deserialize, Serialize};

/// All detections that belong to a single video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedFrame {
    pub frame_index: u32,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
}

/// A single detected object with its bounding box in source pixels.
///
/// Payloads come from more than one producer (detector exports, tracking
/// service responses), so most fields tolerate absence and are repaired
/// by [`validate_and_clean`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub class_id: i32,
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` in source pixel coordinates.
    pub bbox: Vec<f32>,
    /// `[x, y]` center in source pixel coordinates.
    #[serde(default)]
    pub center: Vec<f32>,
    /// Center after projection to the top-down view, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_center: Option<Vec<f32>>,
    /// Stroke color as the producer expressed it ("blue", "#1f77b4", ...).
    #[serde(default)]
    pub color: String,
    /// Which feed produced this detection.
    #[serde(default)]
    pub source: String,
    /// Track identity assigned by the tracking service.
    #[serde(default, alias = "track_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl DetectedObject {
    /// Bounding box corners as `(x1, y1, x2, y2)`, or `None` when the
    /// payload did not carry a full box.
    pub fn corners(&self) -> Option<(f32, f32, f32, f32)> {
        if self.bbox.len() == 4 {
            Some((self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3]))
        } else {
            None
        }
    }

    /// Coordinate key used to address this object in assignment maps and
    /// tracking requests: `"[x, y]"` from the transformed center when
    /// present, the raw center otherwise.
    pub fn coord_key(&self) -> Option<String> {
        let point = self
            .transformed_center
            .as_deref()
            .filter(|c| c.len() == 2)
            .or_else(|| {
                if self.center.len() == 2 {
                    Some(self.center.as_slice())
                } else {
                    None
                }
            })?;
        Some(format!("[{}, {}]", point[0], point[1]))
    }
}

/// Outcome of validating a batch of frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub kept: usize,
    pub dropped: usize,
    pub warnings: Vec<String>,
}

impl CleanReport {
    pub fn summary(&self) -> String {
        format!("{} objects kept, {} dropped", self.kept, self.dropped)
    }
}

/// Validate detections in place, repairing what can be repaired and
/// dropping what cannot.
///
/// Rules:
/// - objects without a 4-element bbox are dropped
/// - a missing center is rebuilt from the bbox midpoint
/// - confidence is clamped to `[0, 1]`
/// - a malformed transformed center is cleared rather than kept
/// - an empty source is labeled `"unknown"`
pub fn validate_and_clean(frames: &mut Vec<AnnotatedFrame>) -> CleanReport {
    let mut report = CleanReport::default();

    for frame in frames.iter_mut() {
        let frame_index = frame.frame_index;
        frame.objects.retain_mut(|object| {
            if object.bbox.len() != 4 {
                report.dropped += 1;
                report.warnings.push(format!(
                    "frame {}: dropped object with {}-element bbox",
                    frame_index,
                    object.bbox.len()
                ));
                return false;
            }

            if object.center.len() != 2 {
                object.center = vec![
                    (object.bbox[0] + object.bbox[2]) / 2.0,
                    (object.bbox[1] + object.bbox[3]) / 2.0,
                ];
            }

            if !(0.0..=1.0).contains(&object.confidence) {
                object.confidence = object.confidence.clamp(0.0, 1.0);
            }

            if let Some(tc) = &object.transformed_center {
                if tc.len() != 2 {
                    report.warnings.push(format!(
                        "frame {}: cleared malformed transformed center",
                        frame_index
                    ));
                    object.transformed_center = None;
                }
            }

            if object.source.is_empty() {
                object.source = "unknown".to_string();
            }

            report.kept += 1;
            true
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(bbox: Vec<f32>) -> DetectedObject {
        DetectedObject {
            class_id: 0,
            confidence: 0.9,
            bbox,
            center: Vec::new(),
            transformed_center: None,
            color: String::new(),
            source: String::new(),
            id: None,
        }
    }

    #[test]
    fn test_deserialize_detector_payload() {
        let json = r#"{
            "frame_index": 42,
            "objects": [{
                "class_id": 0,
                "confidence": 0.87,
                "bbox": [10.0, 20.0, 50.0, 80.0],
                "center": [30.0, 50.0],
                "color": "blue",
                "source": "field_left"
            }]
        }"#;

        let frame: AnnotatedFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.frame_index, 42);
        assert_eq!(frame.objects.len(), 1);
        assert_eq!(frame.objects[0].corners(), Some((10.0, 20.0, 50.0, 80.0)));
        assert_eq!(frame.objects[0].id, None);
    }

    #[test]
    fn test_deserialize_tracker_alias() {
        // Tracking responses label identity as track_id.
        let json = r#"{
            "class_id": 1,
            "confidence": 0.5,
            "bbox": [0.0, 0.0, 10.0, 10.0],
            "track_id": 7
        }"#;
        let object: DetectedObject = serde_json::from_str(json).unwrap();
        assert_eq!(object.id, Some(7));
    }

    #[test]
    fn test_coord_key_prefers_transformed_center() {
        let mut o = object(vec![0.0, 0.0, 10.0, 10.0]);
        o.center = vec![5.0, 5.0];
        assert_eq!(o.coord_key(), Some("[5, 5]".to_string()));

        o.transformed_center = Some(vec![12.5, 40.0]);
        assert_eq!(o.coord_key(), Some("[12.5, 40]".to_string()));
    }

    #[test]
    fn test_coord_key_absent_without_center() {
        let o = object(vec![0.0, 0.0, 10.0, 10.0]);
        assert_eq!(o.coord_key(), None);
    }

    #[test]
    fn test_validate_drops_bad_bbox() {
        let mut frames = vec![AnnotatedFrame {
            frame_index: 0,
            objects: vec![object(vec![1.0, 2.0]), object(vec![0.0, 0.0, 4.0, 4.0])],
        }];

        let report = validate_and_clean(&mut frames);
        assert_eq!(report.kept, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(frames[0].objects.len(), 1);
    }

    #[test]
    fn test_validate_repairs_center_and_confidence() {
        let mut bad = object(vec![0.0, 0.0, 10.0, 20.0]);
        bad.confidence = 1.5;
        bad.transformed_center = Some(vec![1.0]);
        let mut frames = vec![AnnotatedFrame {
            frame_index: 3,
            objects: vec![bad],
        }];

        let report = validate_and_clean(&mut frames);
        assert_eq!(report.kept, 1);
        let repaired = &frames[0].objects[0];
        assert_eq!(repaired.center, vec![5.0, 10.0]);
        assert_eq!(repaired.confidence, 1.0);
        assert_eq!(repaired.transformed_center, None);
        assert_eq!(repaired.source, "unknown");
        assert!(!report.warnings.is_empty());
    }
}
