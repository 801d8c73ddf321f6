// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Track data serialization and deserialization.
//!
//! This module handles exporting and importing annotated frames in YAML
//! and JSON formats, for exchange with detectors and analysis scripts.

use crate::models::annotation::AnnotatedFrame;
use anyhow::Result;
use std::path::Path;

/// Export annotated frames to YAML format.
pub fn export_yaml(frames: &[AnnotatedFrame], path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(frames)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export annotated frames to JSON format.
pub fn export_json(frames: &[AnnotatedFrame], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(frames)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import annotated frames from YAML format.
pub fn import_yaml(path: &Path) -> Result<Vec<AnnotatedFrame>> {
    let yaml = std::fs::read_to_string(path)?;
    let frames = serde_yaml::from_str(&yaml)?;
    Ok(frames)
}

/// Import annotated frames from JSON format.
pub fn import_json(path: &Path) -> Result<Vec<AnnotatedFrame>> {
    let json = std::fs::read_to_string(path)?;
    let frames = serde_json::from_str(&json)?;
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::DetectedObject;

    fn sample() -> Vec<AnnotatedFrame> {
        vec![AnnotatedFrame {
            frame_index: 30,
            objects: vec![DetectedObject {
                class_id: 0,
                confidence: 0.66,
                bbox: vec![5.0, 5.0, 25.0, 45.0],
                center: vec![15.0, 25.0],
                transformed_center: Some(vec![100.0, 200.0]),
                color: "red".to_string(),
                source: "field_right".to_string(),
                id: Some(4),
            }],
        }]
    }

    #[test]
    fn test_json_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json");

        let frames = sample();
        export_json(&frames, &path).unwrap();
        assert_eq!(import_json(&path).unwrap(), frames);
    }

    #[test]
    fn test_yaml_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.yaml");

        let frames = sample();
        export_yaml(&frames, &path).unwrap();
        assert_eq!(import_yaml(&path).unwrap(), frames);
    }

    #[test]
    fn test_import_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(import_json(&dir.path().join("absent.json")).is_err());
    }
}
