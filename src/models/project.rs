// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! This module defines the archive manifest and the in-memory state of
//! an open review project: tracks, roster, and track-to-player
//! assignments.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::roster::Player;
use super::tracks::TrackStore;

/// Manifest schema version written into new archives.
pub const PROJECT_VERSION: &str = "1.0.0";

/// Contents of `project.json` inside a project archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "lastModified")]
    pub last_modified: String,
    pub version: String,
}

impl ProjectMeta {
    /// Manifest for a freshly created project, stamped with the current
    /// time.
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.into(),
            created_at: now.clone(),
            last_modified: now,
            version: PROJECT_VERSION.to_string(),
        }
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.last_modified = chrono::Utc::now().to_rfc3339();
    }
}

/// Coordinate-key to player-id assignments, as sent to the tracking
/// service.
pub type AssignmentMap = BTreeMap<String, i64>;

/// Everything the review screen operates on.
#[derive(Debug)]
pub struct ProjectData {
    pub meta: ProjectMeta,
    /// Archive this project was opened from and saves back to.
    pub archive_path: PathBuf,
    pub tracks: TrackStore,
    pub roster: Vec<Player>,
    pub assignments: AssignmentMap,
}

impl ProjectData {
    pub fn new(meta: ProjectMeta, archive_path: PathBuf, tracks: TrackStore) -> Self {
        Self {
            meta,
            archive_path,
            tracks,
            roster: Vec::new(),
            assignments: AssignmentMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_field_names() {
        let meta = ProjectMeta::new("derby");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "derby");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastModified").is_some());
        assert_eq!(json["version"], PROJECT_VERSION);
    }

    #[test]
    fn test_touch_updates_last_modified_only() {
        let mut meta = ProjectMeta::new("derby");
        let created = meta.created_at.clone();
        meta.last_modified = "2020-01-01T00:00:00+00:00".to_string();
        meta.touch();
        assert_eq!(meta.created_at, created);
        assert_ne!(meta.last_modified, "2020-01-01T00:00:00+00:00");
    }
}
