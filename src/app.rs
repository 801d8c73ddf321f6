// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait: home/review routing, background project loading,
//! the shared playback clock, and the tracking service round trip.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

use tempfile::TempDir;

use crate::io::archive;
use crate::io::media::{self, Feed, FeedSpec};
use crate::io::serialization;
use crate::models::annotation::{validate_and_clean, AnnotatedFrame};
use crate::models::playback::PlaybackClock;
use crate::models::project::{ProjectData, ProjectMeta};
use crate::models::roster;
use crate::models::tracks::TrackStore;
use crate::net::tracking::{self, UpdateRequest, UpdateResponse};
use crate::overlay;
use crate::settings::Settings;
use crate::ui::assignment::{self, AssignmentAction, PendingAssignment};
use crate::ui::home::{self, HomeAction};
use crate::ui::player::{FeedView, PlayerAction};
use crate::ui::transport::{self, TransportAction};

/// Tracks the service reported lost in its last update.
pub struct LostReport {
    pub frame_id: u32,
    pub ids: Vec<i64>,
}

/// One line of user-visible feedback at the bottom of the window.
struct StatusLine {
    text: String,
    error: bool,
}

/// Result of background project loading.
struct LoadedProject {
    meta: ProjectMeta,
    tracks: Vec<AnnotatedFrame>,
    archive_path: PathBuf,
    specs: Vec<FeedSpec>,
    workdir: TempDir,
}

/// Everything alive while a project is open. Dropping this closes the
/// feeds and removes the scratch media directory.
struct ReviewState {
    project: ProjectData,
    feeds: Vec<FeedView>,
    clock: PlaybackClock,

    /// Detection clicked on a feed, awaiting a player assignment.
    pending: Option<PendingAssignment>,

    /// Lost tracks reported by the last tracking update.
    lost: Option<LostReport>,

    /// Keeps the extracted media on disk until the project closes.
    _workdir: TempDir,
}

/// Main application state.
pub struct TunascopeApp {
    /// Settings loaded at startup
    settings: Settings,

    /// Project name typed on the home screen
    project_name: String,

    /// Open project, when reviewing
    review: Option<ReviewState>,

    /// Receiver for background project loading
    project_loader: Option<Receiver<Result<LoadedProject, String>>>,

    /// Receiver for an in-flight tracking service update
    tracking_job: Option<Receiver<Result<UpdateResponse, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Status line content
    status: Option<StatusLine>,
}

impl TunascopeApp {
    /// Create a new application instance.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            project_name: String::new(),
            review: None,
            project_loader: None,
            tracking_job: None,
            loading_message: None,
            status: None,
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.status = Some(StatusLine { text, error: false });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.status = Some(StatusLine { text, error: true });
    }

    /// Open an existing project archive (asynchronously).
    fn open_project_async(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.project_loader = Some(receiver);
        self.loading_message = Some("Opening project...".to_string());

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let _ = sender.send(load_project(path));
        });
    }

    /// Create an empty project archive, then open it (asynchronously).
    fn create_project_async(&mut self, path: PathBuf, name: String) {
        let (sender, receiver) = channel();
        self.project_loader = Some(receiver);
        self.loading_message = Some("Creating project...".to_string());

        std::thread::spawn(move || {
            let result = archive::create_project(&path, &name)
                .map_err(|e| format!("Failed to create project: {:#}", e))
                .and_then(|_| load_project(path));
            let _ = sender.send(result);
        });
    }

    /// Create a project archive from a capture directory, then open it
    /// (asynchronously).
    fn import_project_async(&mut self, archive_path: PathBuf, name: String, media_dir: PathBuf) {
        let (sender, receiver) = channel();
        self.project_loader = Some(receiver);
        self.loading_message = Some("Importing media...".to_string());

        std::thread::spawn(move || {
            let result = archive::import_project(&archive_path, &name, &media_dir)
                .map_err(|e| format!("Failed to import media: {:#}", e))
                .and_then(|_| load_project(archive_path));
            let _ = sender.send(result);
        });
    }

    /// Move a finished load into review state.
    fn finish_project_load(&mut self, loaded: LoadedProject) {
        let feeds: Vec<FeedView> = loaded
            .specs
            .into_iter()
            .map(|spec| FeedView::new(Feed::open(spec)))
            .collect();

        let (tracks, report) = TrackStore::from_frames(loaded.tracks);

        let mut clock = PlaybackClock::new();
        let duration = feeds
            .iter()
            .map(|f| f.duration_secs())
            .fold(0.0_f64, f64::max);
        if duration > 0.0 {
            clock.set_duration(duration);
        }

        let name = loaded.meta.name.clone();
        let feed_count = feeds.len();
        let project = ProjectData::new(loaded.meta, loaded.archive_path, tracks);
        self.review = Some(ReviewState {
            project,
            feeds,
            clock,
            pending: None,
            lost: None,
            _workdir: loaded.workdir,
        });

        if report.dropped > 0 {
            self.set_status(format!(
                "Opened {} ({} feeds; {})",
                name,
                feed_count,
                report.summary()
            ));
        } else {
            self.set_status(format!("Opened {} ({} feeds)", name, feed_count));
        }
    }

    /// Write the open project back to its archive.
    fn save_project(&mut self) {
        let result = match self.review.as_mut() {
            Some(review) => archive::save_project(
                &review.project.archive_path,
                &mut review.project.meta,
                review.project.tracks.frames(),
            )
            .map(|_| review.project.meta.name.clone()),
            None => return,
        };
        match result {
            Ok(name) => self.set_status(format!("Saved project {}", name)),
            Err(e) => self.set_error(format!("Failed to save project: {:#}", e)),
        }
    }

    /// Close the open project. Dropping the review state stops playback
    /// and removes the scratch media directory.
    fn close_project(&mut self) {
        if let Some(review) = self.review.take() {
            log::info!("Closed project {}", review.project.meta.name);
        }
        self.status = None;
    }

    /// Replace the project's tracks from an exported file.
    fn load_tracks(&mut self, path: PathBuf) {
        if self.review.is_none() {
            return;
        }
        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::import_yaml(&path),
            Some("json") => serialization::import_json(&path),
            _ => {
                self.set_error(format!("Unsupported file extension: {:?}", extension));
                return;
            }
        };

        match result {
            Ok(frames) => {
                let (store, report) = TrackStore::from_frames(frames);
                let count = store.len();
                if let Some(review) = self.review.as_mut() {
                    review.project.tracks = store;
                    review.lost = None;
                }
                self.set_status(format!(
                    "Loaded {} track frames ({})",
                    count,
                    report.summary()
                ));
            }
            Err(e) => self.set_error(format!("Failed to load tracks: {:#}", e)),
        }
    }

    /// Export the project's tracks to a file.
    fn export_tracks(&mut self, path: PathBuf) {
        let result = match self.review.as_ref() {
            Some(review) => {
                let extension = path.extension().and_then(|s| s.to_str());
                match extension {
                    Some("yaml") | Some("yml") => {
                        serialization::export_yaml(review.project.tracks.frames(), &path)
                    }
                    Some("json") => {
                        serialization::export_json(review.project.tracks.frames(), &path)
                    }
                    _ => {
                        self.set_error(format!("Unsupported file extension: {:?}", extension));
                        return;
                    }
                }
            }
            None => return,
        };
        match result {
            Ok(_) => self.set_status(format!("Exported tracks to {}", path.display())),
            Err(e) => self.set_error(format!("Failed to export tracks: {:#}", e)),
        }
    }

    /// Send the current frame and assignments to the tracking service.
    fn start_tracking_job(&mut self) {
        if self.tracking_job.is_some() {
            return;
        }
        let request = match self.review.as_ref() {
            Some(review) if !review.project.assignments.is_empty() => UpdateRequest {
                frame_id: overlay::frame_index_at(review.clock.position()),
                coord_id: review.project.assignments.clone(),
            },
            Some(_) => {
                self.set_status("Assign at least one player before generating tracking");
                return;
            }
            None => return,
        };

        self.tracking_job = Some(tracking::spawn_update(
            self.settings.tracking_service_url.clone(),
            request,
        ));
        self.set_status("Tracking update running...");
    }

    /// Merge a tracking service response into the open project.
    fn apply_tracking_response(&mut self, mut response: UpdateResponse) {
        let report = validate_and_clean(&mut response.tracks);
        if report.dropped > 0 {
            log::warn!("Tracking response: {}", report.summary());
        }

        let cleaning = if report.dropped > 0 {
            format!("; {}", report.summary())
        } else {
            String::new()
        };

        let mut status = None;
        if let Some(review) = self.review.as_mut() {
            let merged = response.tracks.len();
            let replaced = review.project.tracks.merge_range(response.tracks);

            // Park the clock where the service lost its tracks so the
            // operator can correct from there.
            review.clock.pause();
            review
                .clock
                .seek(response.lost_frame_id as f64 / overlay::FRAME_RATE);

            if response.lost_ids.is_empty() {
                review.lost = None;
                status = Some(format!(
                    "Merged {} tracked frames ({} replaced){}",
                    merged, replaced, cleaning
                ));
            } else {
                let ids = response
                    .lost_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                status = Some(format!(
                    "Merged {} tracked frames; lost ids {} at frame {}{}",
                    merged, ids, response.lost_frame_id, cleaning
                ));
                review.lost = Some(LostReport {
                    frame_id: response.lost_frame_id,
                    ids: response.lost_ids,
                });
            }
        }
        if let Some(text) = status {
            self.set_status(text);
        }
    }

    /// Fill short per-track gaps in the project's tracks.
    fn update_interpolations(&mut self) {
        let max_gap = self.settings.interpolation_max_gap;
        let inserted = match self.review.as_mut() {
            Some(review) if !review.project.tracks.is_empty() => {
                review.project.tracks.interpolate_gaps(max_gap)
            }
            Some(_) => {
                self.set_status("No tracks to interpolate");
                return;
            }
            None => return,
        };
        self.set_status(format!(
            "Interpolation added {} detections (max gap {} frames)",
            inserted, max_gap
        ));
    }

    /// Apply an action from the assignment panel or prompt.
    fn handle_assignment_action(&mut self, action: AssignmentAction) {
        match action {
            AssignmentAction::None => {}
            AssignmentAction::Assign { key, player_id } => {
                let mut status = None;
                if let Some(review) = self.review.as_mut() {
                    review.project.assignments.insert(key.clone(), player_id);
                    review.pending = None;
                    status = Some(format!("Assigned player {} to {}", player_id, key));
                }
                if let Some(text) = status {
                    self.set_status(text);
                }
            }
            AssignmentAction::Cancel => {
                // Dismiss with no side effects.
                if let Some(review) = self.review.as_mut() {
                    review.pending = None;
                }
            }
            AssignmentAction::RemoveAssignment(key) => {
                if let Some(review) = self.review.as_mut() {
                    review.project.assignments.remove(&key);
                    log::info!("Removed assignment {}", key);
                }
            }
            AssignmentAction::InitializeRoster => {
                if let Some(review) = self.review.as_mut() {
                    review.project.roster = roster::default_squad();
                }
                self.set_status("Initialized roster with players 1-23");
            }
        }
    }
}

/// Open an archive and discover its feeds; runs on a loader thread.
fn load_project(path: PathBuf) -> Result<LoadedProject, String> {
    let opened = archive::open_project(&path)
        .map_err(|e| format!("Failed to open project: {:#}", e))?;
    let specs = media::discover_feeds(&opened.video_dir);
    log::info!("Discovered {} feeds in {}", specs.len(), opened.meta.name);

    Ok(LoadedProject {
        meta: opened.meta,
        tracks: opened.tracks,
        archive_path: path,
        specs,
        workdir: opened.workdir,
    })
}

impl eframe::App for TunascopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed project loading
        if let Some(ref receiver) = self.project_loader {
            if let Ok(result) = receiver.try_recv() {
                self.project_loader = None;
                self.loading_message = None;

                match result {
                    Ok(loaded) => self.finish_project_load(loaded),
                    Err(e) => self.set_error(e),
                }
            }
        }

        // Check for a finished tracking update
        if let Some(ref receiver) = self.tracking_job {
            if let Ok(result) = receiver.try_recv() {
                self.tracking_job = None;

                match result {
                    Ok(response) => self.apply_tracking_response(response),
                    Err(e) => self.set_error(e),
                }
            }
        }

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() || self.tracking_job.is_some() {
            ctx.request_repaint();
        }

        // Space toggles playback unless a text field is focused
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            if let Some(review) = self.review.as_mut() {
                review.clock.toggle();
            }
        }

        // Advance the shared clock by this frame's wall time
        if let Some(review) = self.review.as_mut() {
            let dt = ctx.input(|i| i.stable_dt);
            review.clock.advance(dt);
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Project...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Project", &[archive::PROJECT_EXTENSION])
                            .set_file_name("untitled.tuna")
                            .save_file()
                        {
                            let name = stem_name(&path);
                            self.create_project_async(path, name);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Import Capture Folder...").clicked() {
                        if let Some(media_dir) = rfd::FileDialog::new().pick_folder() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("Project", &[archive::PROJECT_EXTENSION])
                                .set_file_name("untitled.tuna")
                                .save_file()
                            {
                                let name = stem_name(&path);
                                self.import_project_async(path, name, media_dir);
                            }
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Project...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Project", &[archive::PROJECT_EXTENSION])
                            .pick_file()
                        {
                            self.open_project_async(path);
                        }
                        ui.close_menu();
                    }

                    ui.separator();
                    let has_project = self.review.is_some();
                    if ui
                        .add_enabled(has_project, egui::Button::new("Save Project"))
                        .clicked()
                    {
                        self.save_project();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(has_project, egui::Button::new("Close Project"))
                        .clicked()
                    {
                        self.close_project();
                        ui.close_menu();
                    }

                    ui.separator();
                    if ui
                        .add_enabled(has_project, egui::Button::new("Load Tracks..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Tracks", &["json", "yaml", "yml"])
                            .pick_file()
                        {
                            self.load_tracks(path);
                        }
                        ui.close_menu();
                    }
                    ui.menu_button("Export Tracks", |ui| {
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("tracks.json")
                                .save_file()
                            {
                                self.export_tracks(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("tracks.yaml")
                                .save_file()
                            {
                                self.export_tracks(path);
                            }
                            ui.close_menu();
                        }
                    });

                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Tracking", |ui| {
                    let can_track = self.review.is_some() && self.tracking_job.is_none();
                    if ui
                        .add_enabled(can_track, egui::Button::new("Generate 30s Tracking"))
                        .clicked()
                    {
                        self.start_tracking_job();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.review.is_some(), egui::Button::new("Update Interpolations"))
                        .clicked()
                    {
                        self.update_interpolations();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.set_status(format!("Tunascope {}", env!("CARGO_PKG_VERSION")));
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.status {
                    Some(status) if status.error => {
                        ui.colored_label(egui::Color32::from_rgb(220, 80, 80), &status.text);
                    }
                    Some(status) => {
                        ui.label(&status.text);
                    }
                    None => {
                        ui.label(egui::RichText::new("Ready").weak());
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(review) = &self.review {
                        ui.label(format!("{} track frames", review.project.tracks.len()));
                        ui.separator();
                        ui.label(&review.project.meta.name);
                    }
                });
            });
        });

        // Assignment panel (right side)
        let mut panel_action = AssignmentAction::None;
        if let Some(review) = self.review.as_mut() {
            panel_action = egui::SidePanel::right("assignments")
                .default_width(260.0)
                .show(ctx, |ui| {
                    assignment::panel(
                        ui,
                        &mut review.project.roster,
                        &review.project.assignments,
                        review.lost.as_ref(),
                    )
                })
                .inner;
        }
        self.handle_assignment_action(panel_action);

        // Main area: loading spinner, review screen, or home screen
        let home_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    HomeAction::None
                } else if let Some(review) = self.review.as_mut() {
                    match transport::show(ui, &review.clock) {
                        TransportAction::TogglePlay => review.clock.toggle(),
                        TransportAction::Seek(seconds) => review.clock.seek(seconds),
                        TransportAction::None => {}
                    }
                    ui.separator();

                    // One shared play event re-registers every feed's
                    // overlay geometry this frame.
                    let register = review.clock.take_play_event();
                    let ReviewState {
                        project,
                        feeds,
                        clock,
                        pending,
                        ..
                    } = review;
                    let frames = project.tracks.frames();
                    let seconds = clock.position();

                    if feeds.is_empty() {
                        ui.centered_and_justified(|ui| {
                            ui.label(
                                egui::RichText::new(
                                    "No feeds in this project. Import a capture folder to add media.",
                                )
                                .color(egui::Color32::from_gray(150)),
                            );
                        });
                    } else {
                        let count = feeds.len();
                        ui.columns(count, |columns| {
                            for (i, feed) in feeds.iter_mut().enumerate() {
                                match feed.show(&mut columns[i], seconds, frames, register) {
                                    PlayerAction::ObjectActivated(object) => {
                                        match object.coord_key() {
                                            Some(key) => {
                                                *pending =
                                                    Some(PendingAssignment::new(object, key));
                                            }
                                            None => log::warn!(
                                                "Clicked detection has no usable coordinate"
                                            ),
                                        }
                                    }
                                    PlayerAction::None => {}
                                }
                            }
                        });
                    }
                    HomeAction::None
                } else {
                    home::show(ui, &mut self.project_name)
                }
            })
            .inner;

        match home_action {
            HomeAction::CreateProject { path, name } => self.create_project_async(path, name),
            HomeAction::ImportProject {
                archive,
                name,
                media_dir,
            } => self.import_project_async(archive, name, media_dir),
            HomeAction::OpenProject(path) => self.open_project_async(path),
            HomeAction::None => {}
        }

        // Assignment prompt window
        let mut prompt_action = AssignmentAction::None;
        if let Some(review) = self.review.as_mut() {
            if let Some(pending) = review.pending.as_mut() {
                prompt_action = assignment::prompt(ctx, pending, &review.project.roster);
            }
        }
        self.handle_assignment_action(prompt_action);

        // Keep painting once playback has begun, also while paused, so
        // the overlay always reflects the clock.
        if self
            .review
            .as_ref()
            .map_or(false, |r| r.clock.has_started())
        {
            ctx.request_repaint();
        }
    }
}

/// Project name derived from an archive file name.
fn stem_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::DetectedObject;

    fn app_with_open_review() -> TunascopeApp {
        let mut app = TunascopeApp::new(Settings::default());
        let (tracks, _) = TrackStore::from_frames(Vec::new());
        let project = ProjectData::new(
            ProjectMeta::new("match"),
            PathBuf::from("match.tuna"),
            tracks,
        );
        app.review = Some(ReviewState {
            project,
            feeds: Vec::new(),
            clock: PlaybackClock::new(),
            pending: None,
            lost: None,
            _workdir: tempfile::tempdir().unwrap(),
        });
        app
    }

    fn tracked(frame_index: u32, bbox: Vec<f32>) -> AnnotatedFrame {
        AnnotatedFrame {
            frame_index,
            objects: vec![DetectedObject {
                class_id: 0,
                confidence: 0.9,
                bbox,
                center: Vec::new(),
                transformed_center: None,
                color: String::new(),
                source: String::new(),
                id: Some(3),
            }],
        }
    }

    #[test]
    fn test_tracking_status_reports_cleaning() {
        let mut app = app_with_open_review();
        app.apply_tracking_response(UpdateResponse {
            lost_frame_id: 60,
            lost_ids: Vec::new(),
            tracks: vec![tracked(0, vec![0.0, 0.0, 4.0, 4.0]), tracked(1, vec![1.0])],
        });

        let status = app.status.as_ref().unwrap();
        assert!(!status.error);
        assert!(
            status.text.contains("1 objects kept, 1 dropped"),
            "{}",
            status.text
        );

        // The clock parks where the service lost its tracks.
        let review = app.review.as_ref().unwrap();
        assert!(!review.clock.is_playing());
        assert_eq!(review.clock.position(), 2.0);
    }

    #[test]
    fn test_tracking_status_silent_about_clean_payloads() {
        let mut app = app_with_open_review();
        app.apply_tracking_response(UpdateResponse {
            lost_frame_id: 30,
            lost_ids: vec![7],
            tracks: vec![tracked(0, vec![0.0, 0.0, 4.0, 4.0])],
        });

        let status = app.status.as_ref().unwrap();
        assert!(status.text.contains("lost ids 7 at frame 30"), "{}", status.text);
        assert!(!status.text.contains("dropped"), "{}", status.text);

        let review = app.review.as_ref().unwrap();
        let lost = review.lost.as_ref().unwrap();
        assert_eq!(lost.frame_id, 30);
        assert_eq!(lost.ids, vec![7]);
    }
}
