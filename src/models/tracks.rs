// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered storage for tracking frames.
//!
//! Holds the per-frame detections for a project, merges tracking service
//! responses over the range they cover, and fills short per-track gaps by
//! linear interpolation.

use std::collections::BTreeMap;

use crate::models::annotation::{
    validate_and_clean, AnnotatedFrame, CleanReport, DetectedObject,
};

/// All annotated frames for a project, ordered by frame index.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    frames: Vec<AnnotatedFrame>,
}

impl TrackStore {
    /// Build a store from raw frames, validating and ordering them.
    pub fn from_frames(mut frames: Vec<AnnotatedFrame>) -> (Self, CleanReport) {
        let report = validate_and_clean(&mut frames);
        // Stable sort keeps first-record-wins lookups intact when an
        // index appears more than once.
        frames.sort_by_key(|f| f.frame_index);
        (Self { frames }, report)
    }

    pub fn frames(&self) -> &[AnnotatedFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Replace every stored frame inside the index range covered by
    /// `incoming`, keeping frames outside it. Returns the number of
    /// frames that were replaced.
    pub fn merge_range(&mut self, incoming: Vec<AnnotatedFrame>) -> usize {
        let (Some(lo), Some(hi)) = (
            incoming.iter().map(|f| f.frame_index).min(),
            incoming.iter().map(|f| f.frame_index).max(),
        ) else {
            return 0;
        };

        let before = self.frames.len();
        self.frames
            .retain(|f| f.frame_index < lo || f.frame_index > hi);
        let replaced = before - self.frames.len();

        self.frames.extend(incoming);
        self.frames.sort_by_key(|f| f.frame_index);
        replaced
    }

    /// Fill gaps in each track by linear interpolation.
    ///
    /// For every track id, consecutive observations separated by at most
    /// `max_gap` missing frames get synthetic detections in between.
    /// Frame records are created where none exist. Returns the number of
    /// objects inserted.
    pub fn interpolate_gaps(&mut self, max_gap: u32) -> usize {
        // First observation wins per (id, frame), matching lookup order.
        let mut observations: BTreeMap<i64, BTreeMap<u32, DetectedObject>> = BTreeMap::new();
        for frame in &self.frames {
            for object in &frame.objects {
                if let Some(id) = object.id {
                    observations
                        .entry(id)
                        .or_default()
                        .entry(frame.frame_index)
                        .or_insert_with(|| object.clone());
                }
            }
        }

        let mut pending: BTreeMap<u32, Vec<DetectedObject>> = BTreeMap::new();
        for track in observations.values() {
            let mut prev: Option<(u32, &DetectedObject)> = None;
            for (&index, object) in track {
                if let Some((prev_index, prev_object)) = prev {
                    let span = index - prev_index;
                    if span > 1 && span - 1 <= max_gap {
                        for missing in (prev_index + 1)..index {
                            let u = (missing - prev_index) as f32 / span as f32;
                            pending
                                .entry(missing)
                                .or_default()
                                .push(lerp_object(prev_object, object, u));
                        }
                    }
                }
                prev = Some((index, object));
            }
        }

        let mut inserted = 0;
        let mut first_record: BTreeMap<u32, usize> = BTreeMap::new();
        for (pos, frame) in self.frames.iter().enumerate() {
            first_record.entry(frame.frame_index).or_insert(pos);
        }
        for (index, objects) in pending {
            inserted += objects.len();
            match first_record.get(&index) {
                Some(&pos) => self.frames[pos].objects.extend(objects),
                None => self.frames.push(AnnotatedFrame {
                    frame_index: index,
                    objects,
                }),
            }
        }
        self.frames.sort_by_key(|f| f.frame_index);
        inserted
    }
}

fn lerp(a: f32, b: f32, u: f32) -> f32 {
    a + (b - a) * u
}

fn lerp_slice(a: &[f32], b: &[f32], u: f32) -> Vec<f32> {
    a.iter().zip(b).map(|(&x, &y)| lerp(x, y, u)).collect()
}

/// Blend two observations of the same track at interpolation factor `u`.
fn lerp_object(a: &DetectedObject, b: &DetectedObject, u: f32) -> DetectedObject {
    let transformed_center = match (&a.transformed_center, &b.transformed_center) {
        (Some(ta), Some(tb)) if ta.len() == tb.len() => Some(lerp_slice(ta, tb, u)),
        _ => None,
    };
    DetectedObject {
        class_id: a.class_id,
        confidence: lerp(a.confidence, b.confidence, u),
        bbox: lerp_slice(&a.bbox, &b.bbox, u),
        center: lerp_slice(&a.center, &b.center, u),
        transformed_center,
        color: a.color.clone(),
        source: a.source.clone(),
        id: a.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(frame_index: u32, id: i64, bbox: Vec<f32>) -> AnnotatedFrame {
        let center = vec![(bbox[0] + bbox[2]) / 2.0, (bbox[1] + bbox[3]) / 2.0];
        AnnotatedFrame {
            frame_index,
            objects: vec![DetectedObject {
                class_id: 0,
                confidence: 0.8,
                bbox,
                center,
                transformed_center: None,
                color: "blue".to_string(),
                source: "field_left".to_string(),
                id: Some(id),
            }],
        }
    }

    #[test]
    fn test_from_frames_orders_by_index() {
        let (store, report) = TrackStore::from_frames(vec![
            tracked(5, 1, vec![0.0, 0.0, 1.0, 1.0]),
            tracked(2, 1, vec![0.0, 0.0, 1.0, 1.0]),
        ]);
        assert_eq!(report.kept, 2);
        let indices: Vec<u32> = store.frames().iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![2, 5]);
    }

    #[test]
    fn test_merge_replaces_overlapping_range() {
        let (mut store, _) = TrackStore::from_frames(vec![
            tracked(0, 1, vec![0.0, 0.0, 1.0, 1.0]),
            tracked(5, 1, vec![0.0, 0.0, 1.0, 1.0]),
            tracked(10, 1, vec![0.0, 0.0, 1.0, 1.0]),
        ]);

        let replaced = store.merge_range(vec![
            tracked(4, 2, vec![2.0, 2.0, 3.0, 3.0]),
            tracked(6, 2, vec![2.0, 2.0, 3.0, 3.0]),
        ]);

        // Frame 5 fell inside [4, 6] and was replaced; 0 and 10 survive.
        assert_eq!(replaced, 1);
        let indices: Vec<u32> = store.frames().iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![0, 4, 6, 10]);
        assert_eq!(store.frames()[1].objects[0].id, Some(2));
    }

    #[test]
    fn test_merge_empty_is_noop() {
        let (mut store, _) =
            TrackStore::from_frames(vec![tracked(3, 1, vec![0.0, 0.0, 1.0, 1.0])]);
        assert_eq!(store.merge_range(Vec::new()), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_interpolate_fills_short_gap() {
        let (mut store, _) = TrackStore::from_frames(vec![
            tracked(0, 7, vec![0.0, 0.0, 10.0, 10.0]),
            tracked(4, 7, vec![40.0, 0.0, 50.0, 10.0]),
        ]);

        let inserted = store.interpolate_gaps(10);
        assert_eq!(inserted, 3);
        let indices: Vec<u32> = store.frames().iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);

        // Frame 2 sits halfway between the endpoints.
        let mid = &store.frames()[2].objects[0];
        assert_eq!(mid.bbox, vec![20.0, 0.0, 30.0, 10.0]);
        assert_eq!(mid.center, vec![25.0, 5.0]);
        assert_eq!(mid.id, Some(7));
    }

    #[test]
    fn test_interpolate_respects_max_gap() {
        let (mut store, _) = TrackStore::from_frames(vec![
            tracked(0, 7, vec![0.0, 0.0, 10.0, 10.0]),
            tracked(40, 7, vec![40.0, 0.0, 50.0, 10.0]),
        ]);
        assert_eq!(store.interpolate_gaps(10), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_interpolate_adds_into_existing_frames() {
        let gap_frame = AnnotatedFrame {
            frame_index: 1,
            objects: vec![DetectedObject {
                class_id: 0,
                confidence: 0.9,
                bbox: vec![100.0, 100.0, 110.0, 110.0],
                center: vec![105.0, 105.0],
                transformed_center: None,
                color: "red".to_string(),
                source: "field_right".to_string(),
                id: Some(3),
            }],
        };
        let (mut store, _) = TrackStore::from_frames(vec![
            tracked(0, 7, vec![0.0, 0.0, 10.0, 10.0]),
            gap_frame,
            tracked(2, 7, vec![20.0, 0.0, 30.0, 10.0]),
        ]);

        assert_eq!(store.interpolate_gaps(10), 1);
        // The synthetic detection joined the existing frame 1 record.
        assert_eq!(store.len(), 3);
        let frame1 = &store.frames()[1];
        assert_eq!(frame1.objects.len(), 2);
        assert!(frame1.objects.iter().any(|o| o.id == Some(7)));
    }

    #[test]
    fn test_interpolate_blends_transformed_center() {
        let mut a = tracked(0, 1, vec![0.0, 0.0, 10.0, 10.0]);
        a.objects[0].transformed_center = Some(vec![0.0, 0.0]);
        let mut b = tracked(2, 1, vec![0.0, 0.0, 10.0, 10.0]);
        b.objects[0].transformed_center = Some(vec![10.0, 20.0]);

        let (mut store, _) = TrackStore::from_frames(vec![a, b]);
        store.interpolate_gaps(5);
        let mid = &store.frames()[1].objects[0];
        assert_eq!(mid.transformed_center, Some(vec![5.0, 10.0]));
    }
}
