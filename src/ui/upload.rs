// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Upload section: drop zone plus photo and file buttons.

/// Result of upload section interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    None,
    TakePhoto,
    PickFile,
}

/// Display the drop zone and upload buttons.
pub fn show(ui: &mut egui::Ui, files_hovering: bool, camera_available: bool) -> UploadAction {
    let mut action = UploadAction::None;

    let (fill, stroke) = if files_hovering {
        (
            egui::Color32::from_rgb(255, 248, 200),
            egui::Stroke::new(3.0, egui::Color32::from_rgb(234, 179, 8)),
        )
    } else {
        (
            egui::Color32::from_rgb(255, 253, 235),
            egui::Stroke::new(2.0, egui::Color32::from_rgb(250, 204, 21)),
        )
    };

    egui::Frame::none()
        .fill(fill)
        .stroke(stroke)
        .rounding(egui::Rounding::same(16.0))
        .inner_margin(egui::Margin::same(24.0))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("🍌").size(64.0));
                ui.add_space(8.0);
                ui.heading(
                    egui::RichText::new("Drop Your Banana Here!")
                        .strong()
                        .color(egui::Color32::from_gray(40)),
                );
                ui.label(
                    egui::RichText::new("Or use the buttons below to select")
                        .color(egui::Color32::from_gray(90)),
                );
            });
        });

    ui.add_space(12.0);

    ui.columns(2, |columns| {
        let photo = egui::Button::new(egui::RichText::new("📷 Take Photo").size(16.0))
            .fill(egui::Color32::from_rgb(234, 179, 8))
            .min_size(egui::vec2(columns[0].available_width(), 44.0));
        let photo = columns[0]
            .add_enabled(camera_available, photo)
            .on_disabled_hover_text("Set camera.command in the config file to enable capture");
        if photo.clicked() {
            action = UploadAction::TakePhoto;
        }

        let upload = egui::Button::new(egui::RichText::new("⬆ Upload Image").size(16.0))
            .fill(egui::Color32::from_rgb(34, 197, 94))
            .min_size(egui::vec2(columns[1].available_width(), 44.0));
        if columns[1].add(upload).clicked() {
            action = UploadAction::PickFile;
        }
    });

    action
}
