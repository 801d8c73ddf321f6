// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project archive handling.
//!
//! A project is a single zip archive with a `.tuna` extension: a
//! `project.json` manifest, an optional `tracks.json` payload, and
//! `audio/`, `midi/`, `video/` directories. Media lives under `video/`
//! and is extracted to a scratch directory while the project is open.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::models::annotation::AnnotatedFrame;
use crate::models::project::{ProjectMeta, PROJECT_VERSION};

pub const PROJECT_EXTENSION: &str = "tuna";
pub const PROJECT_MANIFEST: &str = "project.json";
pub const TRACKS_ENTRY: &str = "tracks.json";
pub const MEDIA_DIRS: [&str; 3] = ["audio", "midi", "video"];

/// A project opened from disk, with its media staged in a scratch
/// directory that lives as long as the returned value.
pub struct OpenedProject {
    pub meta: ProjectMeta,
    pub tracks: Vec<AnnotatedFrame>,
    pub workdir: TempDir,
    pub video_dir: PathBuf,
}

fn write_manifest<W: Write + std::io::Seek>(
    writer: &mut ZipWriter<W>,
    meta: &ProjectMeta,
) -> Result<()> {
    let options = SimpleFileOptions::default();
    writer.start_file(PROJECT_MANIFEST, options)?;
    let json = serde_json::to_string_pretty(meta)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

/// Create an empty project archive at `path`.
pub fn create_project(path: &Path, name: &str) -> Result<ProjectMeta> {
    let meta = ProjectMeta::new(name);
    let file = File::create(path)
        .with_context(|| format!("Failed to create project file: {}", path.display()))?;
    let mut writer = ZipWriter::new(file);

    write_manifest(&mut writer, &meta)?;
    for dir in MEDIA_DIRS {
        writer.add_directory(dir, SimpleFileOptions::default())?;
    }
    writer.finish()?;

    log::info!("Created project {} at {}", name, path.display());
    Ok(meta)
}

/// Create a project archive and stage everything under `media_dir` into
/// its `video/` directory.
pub fn import_project(path: &Path, name: &str, media_dir: &Path) -> Result<ProjectMeta> {
    let meta = ProjectMeta::new(name);
    let file = File::create(path)
        .with_context(|| format!("Failed to create project file: {}", path.display()))?;
    let mut writer = ZipWriter::new(file);

    write_manifest(&mut writer, &meta)?;
    for dir in MEDIA_DIRS {
        writer.add_directory(dir, SimpleFileOptions::default())?;
    }
    stage_directory(&mut writer, media_dir, Path::new("video"))
        .with_context(|| format!("Failed to stage media from {}", media_dir.display()))?;
    writer.finish()?;

    log::info!(
        "Imported {} into project {}",
        media_dir.display(),
        path.display()
    );
    Ok(meta)
}

fn stage_directory<W: Write + std::io::Seek>(
    writer: &mut ZipWriter<W>,
    source: &Path,
    prefix: &Path,
) -> Result<()> {
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let archived = prefix.join(entry.file_name());
        let archived_name = archived.to_string_lossy().replace('\\', "/");
        if path.is_dir() {
            writer.add_directory(archived_name, SimpleFileOptions::default())?;
            stage_directory(writer, &path, &archived)?;
        } else {
            writer.start_file(archived_name, SimpleFileOptions::default())?;
            let mut file = File::open(&path)?;
            std::io::copy(&mut file, writer)?;
        }
    }
    Ok(())
}

/// Open a project archive: parse the manifest, read stored tracks, and
/// extract the `video/` directory to a scratch location.
pub fn open_project(path: &Path) -> Result<OpenedProject> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open project file: {}", path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Not a readable project archive: {}", path.display()))?;

    let meta: ProjectMeta = {
        let mut entry = archive
            .by_name(PROJECT_MANIFEST)
            .with_context(|| format!("{} is missing {}", path.display(), PROJECT_MANIFEST))?;
        let mut raw = String::new();
        entry.read_to_string(&mut raw)?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed {} in {}", PROJECT_MANIFEST, path.display()))?
    };
    if meta.version != PROJECT_VERSION {
        log::warn!(
            "Project {} has version {}, expected {}",
            meta.name,
            meta.version,
            PROJECT_VERSION
        );
    }

    let tracks = match archive.by_name(TRACKS_ENTRY) {
        Ok(mut entry) => {
            let mut raw = String::new();
            entry.read_to_string(&mut raw)?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Malformed {} in {}", TRACKS_ENTRY, path.display()))?
        }
        Err(zip::result::ZipError::FileNotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let workdir = TempDir::new().context("Failed to create scratch directory")?;
    let video_dir = workdir.path().join("video");
    fs::create_dir_all(&video_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().starts_with("video/") {
            continue;
        }
        // enclosed_name rejects paths that would escape the scratch dir.
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let target = workdir.path().join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
    }

    log::info!(
        "Opened project {} ({} track frames)",
        meta.name,
        tracks.len()
    );
    Ok(OpenedProject {
        meta,
        tracks,
        workdir,
        video_dir,
    })
}

/// Write the project back to its archive, refreshing the manifest
/// timestamp and replacing the stored tracks. Media entries are copied
/// through untouched.
pub fn save_project(path: &Path, meta: &mut ProjectMeta, tracks: &[AnnotatedFrame]) -> Result<()> {
    meta.touch();

    let file = File::open(path)
        .with_context(|| format!("Failed to open project file: {}", path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(".project-save")
        .tempfile_in(parent)
        .context("Failed to create staging file for save")?;
    let mut writer = ZipWriter::new(staging);

    write_manifest(&mut writer, meta)?;
    writer.start_file(TRACKS_ENTRY, SimpleFileOptions::default())?;
    writer.write_all(serde_json::to_string(&tracks)?.as_bytes())?;

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.name() == PROJECT_MANIFEST || entry.name() == TRACKS_ENTRY {
            continue;
        }
        writer.raw_copy_file(entry)?;
    }

    let staging = writer.finish()?;
    drop(archive);
    staging
        .persist(path)
        .map_err(|e| anyhow::anyhow!("Failed to replace {}: {}", path.display(), e))?;

    log::info!("Saved project {} ({} track frames)", meta.name, tracks.len());
    Ok(())
}
