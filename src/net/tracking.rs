// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client for the external tracking service.
//!
//! The service takes the current frame index plus the operator's
//! coordinate-to-player assignments, re-runs tracking from that frame,
//! and answers with corrected track data. Requests run on a background
//! thread and report back over a channel, like every other long
//! operation in the app.

use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::annotation::AnnotatedFrame;

/// Tracking jobs cover long chunks of video; give the service room.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Body of `POST /update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Frame the operator was looking at when corrections were made.
    pub frame_id: u32,
    /// `"[x, y]"` coordinate keys mapped to assigned player ids.
    pub coord_id: BTreeMap<String, i64>,
}

/// Answer from `POST /update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Frame where the service lost one or more tracks, if it did.
    pub lost_frame_id: u32,
    /// Player ids whose tracks were lost at that frame.
    #[serde(default)]
    pub lost_ids: Vec<i64>,
    /// Re-tracked frames covering the processed chunk.
    #[serde(default)]
    pub tracks: Vec<AnnotatedFrame>,
}

/// Blocking HTTP client for one tracking service instance.
pub struct TrackingClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TrackingClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Run one tracking update and wait for the corrected tracks.
    pub fn update(&self, request: &UpdateRequest) -> Result<UpdateResponse> {
        let url = format!("{}/update", self.base_url.trim_end_matches('/'));
        log::info!(
            "Requesting tracking update from frame {} ({} assignments)",
            request.frame_id,
            request.coord_id.len()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .with_context(|| format!("Tracking request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Tracking service error {}: {}", status, body);
        }

        response
            .json::<UpdateResponse>()
            .context("Malformed tracking service response")
    }
}

/// Spawn a tracking update on a background thread. The receiver yields
/// exactly one result.
pub fn spawn_update(
    base_url: String,
    request: UpdateRequest,
) -> Receiver<Result<UpdateResponse, String>> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || {
        let result = TrackingClient::new(base_url)
            .and_then(|client| client.update(&request))
            .map_err(|e| format!("Tracking update failed: {:#}", e));
        let _ = sender.send(result);
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let mut coord_id = BTreeMap::new();
        coord_id.insert("[12.5, 40]".to_string(), 7);
        let request = UpdateRequest {
            frame_id: 150,
            coord_id,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["frame_id"], 150);
        assert_eq!(json["coord_id"]["[12.5, 40]"], 7);
    }

    #[test]
    fn test_response_defaults_for_missing_fields() {
        let response: UpdateResponse =
            serde_json::from_str(r#"{"lost_frame_id": 210}"#).unwrap();
        assert_eq!(response.lost_frame_id, 210);
        assert!(response.lost_ids.is_empty());
        assert!(response.tracks.is_empty());
    }

    #[test]
    fn test_response_parses_tracks() {
        let response: UpdateResponse = serde_json::from_str(
            r#"{
                "lost_frame_id": 60,
                "lost_ids": [3, 9],
                "tracks": [{
                    "frame_index": 58,
                    "objects": [{
                        "class_id": 0,
                        "confidence": 0.9,
                        "bbox": [0.0, 0.0, 5.0, 5.0],
                        "track_id": 3
                    }]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(response.lost_ids, vec![3, 9]);
        assert_eq!(response.tracks[0].objects[0].id, Some(3));
    }
}
