// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Home screen shown before a project is open.
//!
//! Offers the three ways in: create an empty project, import a capture
//! directory into a new project, or open an existing archive.

use std::path::PathBuf;

use crate::io::archive::PROJECT_EXTENSION;

/// Result of home screen interaction.
pub enum HomeAction {
    None,
    CreateProject { path: PathBuf, name: String },
    ImportProject { archive: PathBuf, name: String, media_dir: PathBuf },
    OpenProject(PathBuf),
}

fn archive_file_name(name: &str) -> String {
    let stem = name.trim();
    if stem.is_empty() {
        format!("untitled.{}", PROJECT_EXTENSION)
    } else {
        format!("{}.{}", stem, PROJECT_EXTENSION)
    }
}

fn project_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        "untitled".to_string()
    } else {
        name.to_string()
    }
}

/// Display the home screen.
pub fn show(ui: &mut egui::Ui, name_input: &mut String) -> HomeAction {
    let mut action = HomeAction::None;

    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(
                egui::RichText::new("Tunascope")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Sports Tracking Review")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(24.0);

            ui.horizontal(|ui| {
                // Keep the row centered under the heading.
                let row_width = 320.0;
                ui.add_space((ui.available_width() - row_width).max(0.0) / 2.0);
                ui.label("Project name:");
                ui.add(
                    egui::TextEdit::singleline(name_input)
                        .hint_text("untitled")
                        .desired_width(180.0),
                );
            });
            ui.add_space(12.0);

            if ui.button("New Project...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Project", &[PROJECT_EXTENSION])
                    .set_file_name(archive_file_name(name_input))
                    .save_file()
                {
                    action = HomeAction::CreateProject {
                        path,
                        name: project_name(name_input),
                    };
                }
            }
            ui.add_space(6.0);

            if ui.button("Import Capture Folder...").clicked() {
                if let Some(media_dir) = rfd::FileDialog::new().pick_folder() {
                    if let Some(archive) = rfd::FileDialog::new()
                        .add_filter("Project", &[PROJECT_EXTENSION])
                        .set_file_name(archive_file_name(name_input))
                        .save_file()
                    {
                        action = HomeAction::ImportProject {
                            archive,
                            name: project_name(name_input),
                            media_dir,
                        };
                    }
                }
            }
            ui.add_space(6.0);

            if ui.button("Open Project...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Project", &[PROJECT_EXTENSION])
                    .pick_file()
                {
                    action = HomeAction::OpenProject(path);
                }
            }

            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Projects bundle media and track data in one .tuna file")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("derby"), "derby.tuna");
        assert_eq!(archive_file_name("  "), "untitled.tuna");
    }

    #[test]
    fn test_project_name_fallback() {
        assert_eq!(project_name(" match 3 "), "match 3");
        assert_eq!(project_name(""), "untitled");
    }
}
