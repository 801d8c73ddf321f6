// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (frame sequences and videos).
//!
//! This module discovers the camera feeds inside a project's `video/`
//! directory and loads their frames as RGBA pixel buffers suitable for
//! display in egui. A feed is either a directory of numbered frame
//! images or a single video file; video decoding needs the
//! `video-opencv` feature.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[cfg(feature = "video-opencv")]
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTraitConst},
};

use crate::overlay::FRAME_RATE;

/// Feed names the capture rig produces, in display order.
pub const KNOWN_FEEDS: [&str; 3] = ["field_left", "field_right", "generated_topdown"];

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];
const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// A decoded frame as RGBA8 pixels.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load a single image file as RGBA8.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?;
    let rgba = img.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// What backs a feed on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedKind {
    /// Directory of frame images, already sorted into playback order.
    Frames(Vec<PathBuf>),
    /// A single video file.
    Video(PathBuf),
}

/// A discovered feed, before any decoder is opened.
///
/// Specs are plain paths so discovery can run on a background thread;
/// decoders are opened on the UI thread afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSpec {
    pub name: String,
    pub kind: FeedKind,
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scan a project's `video/` directory for feeds.
///
/// Subdirectories containing frame images become [`FeedKind::Frames`]
/// feeds; video files become [`FeedKind::Video`]. Known rig feeds come
/// first in their fixed order, anything else follows alphanumerically.
pub fn discover_feeds(video_dir: &Path) -> Vec<FeedSpec> {
    let entries = match std::fs::read_dir(video_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read video directory {}: {}", video_dir.display(), e);
            return Vec::new();
        }
    };

    let mut specs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let mut frames: Vec<PathBuf> = std::fs::read_dir(&path)
                .map(|dir| {
                    dir.flatten()
                        .map(|e| e.path())
                        .filter(|p| p.is_file() && has_extension(p, &IMAGE_EXTENSIONS))
                        .collect()
                })
                .unwrap_or_default();
            if frames.is_empty() {
                continue;
            }
            alphanumeric_sort::sort_path_slice(&mut frames);
            let name = entry.file_name().to_string_lossy().into_owned();
            specs.push(FeedSpec {
                name,
                kind: FeedKind::Frames(frames),
            });
        } else if has_extension(&path, &VIDEO_EXTENSIONS) {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "video".to_string());
            specs.push(FeedSpec {
                name,
                kind: FeedKind::Video(path),
            });
        }
    }

    specs.sort_by(|a, b| {
        let rank = |name: &str| {
            KNOWN_FEEDS
                .iter()
                .position(|k| *k == name)
                .unwrap_or(KNOWN_FEEDS.len())
        };
        rank(&a.name)
            .cmp(&rank(&b.name))
            .then_with(|| alphanumeric_sort::compare_str(&a.name, &b.name))
    });
    specs
}

/// Human-readable label for a feed name ("field_left" -> "Field Left").
pub fn feed_label(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// An opened feed with its frame source.
pub struct Feed {
    pub name: String,
    pub store: FrameStore,
}

impl Feed {
    /// Open the decoder for a discovered feed. Failures degrade to an
    /// unavailable store so one bad feed never blocks the others.
    pub fn open(spec: FeedSpec) -> Self {
        let store = match spec.kind {
            FeedKind::Frames(paths) => FrameStore::Sequence(SequenceStore::new(paths)),
            #[cfg(feature = "video-opencv")]
            FeedKind::Video(path) => match VideoStore::open(&path) {
                Ok(store) => FrameStore::Video(store),
                Err(e) => {
                    log::error!("Failed to open video {}: {}", path.display(), e);
                    FrameStore::Unavailable
                }
            },
            #[cfg(not(feature = "video-opencv"))]
            FeedKind::Video(path) => {
                log::warn!(
                    "Video feed {} needs the video-opencv feature; showing it as unavailable",
                    path.display()
                );
                FrameStore::Unavailable
            }
        };
        Self {
            name: spec.name,
            store,
        }
    }

    pub fn label(&self) -> String {
        feed_label(&self.name)
    }
}

/// Source of decoded frames for one feed.
pub enum FrameStore {
    Sequence(SequenceStore),
    #[cfg(feature = "video-opencv")]
    Video(VideoStore),
    Unavailable,
}

impl FrameStore {
    /// Source pixel dimensions, when known.
    pub fn size(&self) -> Option<(u32, u32)> {
        match self {
            FrameStore::Sequence(store) => store.size,
            #[cfg(feature = "video-opencv")]
            FrameStore::Video(store) => Some(store.size),
            FrameStore::Unavailable => None,
        }
    }

    pub fn frame_count(&self) -> u32 {
        match self {
            FrameStore::Sequence(store) => store.paths.len() as u32,
            #[cfg(feature = "video-opencv")]
            FrameStore::Video(store) => store.frames,
            FrameStore::Unavailable => 0,
        }
    }

    /// Playable length in seconds.
    pub fn duration_secs(&self) -> f64 {
        match self {
            #[cfg(feature = "video-opencv")]
            FrameStore::Video(store) => store.frames as f64 / store.fps,
            _ => self.frame_count() as f64 / FRAME_RATE,
        }
    }

    /// Decode the frame at `index`, clamped to the last available frame.
    pub fn frame_at(&mut self, index: u32) -> Option<LoadedImage> {
        match self {
            FrameStore::Sequence(store) => store.frame_at(index),
            #[cfg(feature = "video-opencv")]
            FrameStore::Video(store) => store.frame_at(index),
            FrameStore::Unavailable => None,
        }
    }
}

/// Frames stored as individual image files.
pub struct SequenceStore {
    paths: Vec<PathBuf>,
    size: Option<(u32, u32)>,
}

impl SequenceStore {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        // Probe dimensions without decoding full pixel data.
        let size = paths
            .iter()
            .find_map(|p| image::image_dimensions(p).ok());
        Self { paths, size }
    }

    fn frame_at(&mut self, index: u32) -> Option<LoadedImage> {
        let last = self.paths.len().checked_sub(1)?;
        let path = &self.paths[(index as usize).min(last)];
        match load_image(path) {
            Ok(img) => Some(img),
            Err(e) => {
                log::error!("Failed to decode frame {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Frames decoded out of a video file via OpenCV.
#[cfg(feature = "video-opencv")]
pub struct VideoStore {
    capture: VideoCapture,
    size: (u32, u32),
    frames: u32,
    fps: f64,
}

#[cfg(feature = "video-opencv")]
impl VideoStore {
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .context("Video path is not valid UTF-8")?;
        let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            anyhow::bail!("OpenCV could not open {}", path.display());
        }

        let width = VideoCaptureTraitConst::get(&capture, videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = VideoCaptureTraitConst::get(&capture, videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let frames = VideoCaptureTraitConst::get(&capture, videoio::CAP_PROP_FRAME_COUNT)? as u32;
        let mut fps = VideoCaptureTraitConst::get(&capture, videoio::CAP_PROP_FPS)?;
        if !fps.is_finite() || fps <= 0.0 {
            fps = FRAME_RATE;
        }

        Ok(Self {
            capture,
            size: (width, height),
            frames,
            fps,
        })
    }

    fn frame_at(&mut self, index: u32) -> Option<LoadedImage> {
        use opencv::videoio::VideoCaptureTrait;

        let index = index.min(self.frames.saturating_sub(1));
        let result = (|| -> Result<LoadedImage> {
            VideoCaptureTrait::set(
                &mut self.capture,
                videoio::CAP_PROP_POS_FRAMES,
                index as f64,
            )?;
            let mut frame = Mat::default();
            if !VideoCaptureTrait::read(&mut self.capture, &mut frame)? || frame.empty() {
                anyhow::bail!("no frame at index {}", index);
            }
            let mut rgba = Mat::default();
            imgproc::cvt_color(&frame, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
            Ok(LoadedImage {
                width: self.size.0,
                height: self.size.1,
                pixels: rgba.data_bytes()?.to_vec(),
            })
        })();

        match result {
            Ok(img) => Some(img),
            Err(e) => {
                log::error!("Video decode failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discover_orders_known_feeds_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["field_right", "extra_cam", "field_left"] {
            let feed = dir.path().join(name);
            fs::create_dir(&feed).unwrap();
            touch(&feed.join("frame_1.png"));
        }
        touch(&dir.path().join("notes.txt"));

        let names: Vec<String> = discover_feeds(dir.path())
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["field_left", "field_right", "extra_cam"]);
    }

    #[test]
    fn test_discover_sorts_frames_alphanumerically() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("field_left");
        fs::create_dir(&feed).unwrap();
        for name in ["frame_10.png", "frame_2.png", "frame_1.png"] {
            touch(&feed.join(name));
        }
        touch(&feed.join("ignore.json"));

        let specs = discover_feeds(dir.path());
        let FeedKind::Frames(paths) = &specs[0].kind else {
            panic!("expected frame feed");
        };
        let names: Vec<&str> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["frame_1.png", "frame_2.png", "frame_10.png"]);
    }

    #[test]
    fn test_discover_detects_video_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("field_left.mp4"));

        let specs = discover_feeds(dir.path());
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "field_left");
        assert!(matches!(specs[0].kind, FeedKind::Video(_)));
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_feeds(dir.path()).is_empty());
        assert!(discover_feeds(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_feed_labels() {
        assert_eq!(feed_label("field_left"), "Field Left");
        assert_eq!(feed_label("generated_topdown"), "Generated Topdown");
        assert_eq!(feed_label("cam3"), "Cam3");
    }

    #[test]
    fn test_sequence_store_clamps_index() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("frame_1.png");
        let second = dir.path().join("frame_2.png");
        image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]))
            .save(&first)
            .unwrap();
        image::RgbaImage::from_pixel(2, 3, image::Rgba([0, 255, 0, 255]))
            .save(&second)
            .unwrap();

        let mut store = SequenceStore::new(vec![first, second]);
        assert_eq!(store.size, Some((2, 3)));

        let clamped = store.frame_at(99).unwrap();
        assert_eq!((clamped.width, clamped.height), (2, 3));
        // Past-the-end reads return the last frame.
        assert_eq!(&clamped.pixels[0..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_empty_sequence_has_no_frames() {
        let mut store = SequenceStore::new(Vec::new());
        assert_eq!(store.size, None);
        assert!(store.frame_at(0).is_none());
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let mut store = FrameStore::Unavailable;
        assert_eq!(store.size(), None);
        assert_eq!(store.frame_count(), 0);
        assert_eq!(store.duration_secs(), 0.0);
        assert!(store.frame_at(0).is_none());
    }
}
