// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Track assignment UI.
//!
//! The side panel lists the roster and current coordinate-to-player
//! assignments; the prompt window appears when a detection is clicked
//! and asks which player it is.

use crate::app::LostReport;
use crate::models::annotation::DetectedObject;
use crate::models::project::AssignmentMap;
use crate::models::roster::Player;

/// Result of assignment interaction.
pub enum AssignmentAction {
    None,
    /// Bind a coordinate key to a player id.
    Assign { key: String, player_id: i64 },
    /// Dismiss the prompt without changing anything.
    Cancel,
    RemoveAssignment(String),
    InitializeRoster,
}

/// A clicked detection waiting for the operator's answer.
pub struct PendingAssignment {
    pub object: DetectedObject,
    /// Coordinate key the assignment will be stored under.
    pub key: String,
    /// Manual id entry buffer.
    pub input: String,
}

impl PendingAssignment {
    pub fn new(object: DetectedObject, key: String) -> Self {
        let input = object.id.map(|id| id.to_string()).unwrap_or_default();
        Self { object, key, input }
    }
}

/// Display the roster and assignment side panel.
pub fn panel(
    ui: &mut egui::Ui,
    roster: &mut [Player],
    assignments: &AssignmentMap,
    lost: Option<&LostReport>,
) -> AssignmentAction {
    let mut action = AssignmentAction::None;

    ui.heading("Assignments");
    ui.separator();

    if let Some(report) = lost {
        let ids = report
            .ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        ui.colored_label(
            egui::Color32::from_rgb(230, 160, 60),
            format!("Tracks lost at frame {}: {}", report.frame_id, ids),
        );
        ui.separator();
    }

    if assignments.is_empty() {
        ui.label(egui::RichText::new("Click a box on any feed to assign it").weak());
    } else {
        for (key, player_id) in assignments {
            ui.horizontal(|ui| {
                let name = roster
                    .iter()
                    .find(|p| p.id == *player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("Player {}", player_id));
                ui.label(format!("{} ← {}", name, key));
                if ui.small_button("✖").clicked() {
                    action = AssignmentAction::RemoveAssignment(key.clone());
                }
            });
        }
    }

    ui.add_space(8.0);
    ui.separator();

    if roster.is_empty() {
        if ui.button("Initialize Players").clicked() {
            action = AssignmentAction::InitializeRoster;
        }
        ui.label(egui::RichText::new("Creates players 1-23").weak());
    } else {
        egui::CollapsingHeader::new(format!("Roster ({} players)", roster.len()))
            .default_open(false)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(240.0)
                    .show(ui, |ui| {
                        for player in roster.iter_mut() {
                            ui.horizontal(|ui| {
                                ui.label(format!("{:>2}", player.id));
                                ui.text_edit_singleline(&mut player.name);
                            });
                        }
                    });
            });
    }

    action
}

/// Display the assignment prompt for a clicked detection. Returns an
/// action once the operator decides; the prompt never blocks playback.
pub fn prompt(
    ctx: &egui::Context,
    pending: &mut PendingAssignment,
    roster: &[Player],
) -> AssignmentAction {
    let mut action = AssignmentAction::None;
    let mut open = true;

    egui::Window::new("Assign Player")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Grid::new("assignment_details")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Feed:");
                    ui.label(&pending.object.source);
                    ui.end_row();
                    ui.label("Confidence:");
                    ui.label(format!("{:.2}", pending.object.confidence));
                    ui.end_row();
                    ui.label("Coordinate:");
                    ui.label(&pending.key);
                    ui.end_row();
                    if let Some(id) = pending.object.id {
                        ui.label("Current id:");
                        ui.label(id.to_string());
                        ui.end_row();
                    }
                });

            ui.separator();

            if roster.is_empty() {
                ui.label(egui::RichText::new("No roster yet; enter an id below").weak());
            } else {
                egui::ScrollArea::vertical()
                    .max_height(200.0)
                    .show(ui, |ui| {
                        for player in roster {
                            let label = format!("{:>2}  {}", player.id, player.name);
                            if ui.selectable_label(false, label).clicked() {
                                action = AssignmentAction::Assign {
                                    key: pending.key.clone(),
                                    player_id: player.id,
                                };
                            }
                        }
                    });
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Player id:");
                ui.add(egui::TextEdit::singleline(&mut pending.input).desired_width(60.0));

                let parsed = pending.input.trim().parse::<i64>().ok();
                if ui
                    .add_enabled(parsed.is_some(), egui::Button::new("Assign"))
                    .clicked()
                {
                    if let Some(player_id) = parsed {
                        action = AssignmentAction::Assign {
                            key: pending.key.clone(),
                            player_id,
                        };
                    }
                }
                if ui.button("Cancel").clicked() {
                    action = AssignmentAction::Cancel;
                }
            });
        });

    if !open {
        action = AssignmentAction::Cancel;
    }
    action
}
