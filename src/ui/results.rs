// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Results section: image preview, progress, error banner and verdict card.

use crate::models::session::ViewState;
use crate::models::verdict::{RipenessLevel, RipenessVerdict};
use crate::util::geometry::fit_within;

/// Texture of the selected image, kept visible across failures.
pub struct Preview {
    pub texture: egui::TextureHandle,
    pub size: (u32, u32),
    pub file_name: String,
}

const CARD_FILL: egui::Color32 = egui::Color32::from_rgb(255, 255, 255);

/// Display everything to the right of the upload section.
pub fn show(ui: &mut egui::Ui, preview: Option<&Preview>, state: &ViewState) {
    if let Some(preview) = preview {
        card(ui, CARD_FILL, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new("Your Banana").strong());
                ui.label(egui::RichText::new(&preview.file_name).weak());
            });
            ui.add_space(8.0);

            let side = ui.available_width().min(360.0);
            let (width, height) = fit_within(preview.size.0, preview.size.1, (side, side));
            ui.vertical_centered(|ui| {
                ui.image((preview.texture.id(), egui::vec2(width, height)));
            });
        });
        ui.add_space(12.0);
    }

    match state {
        ViewState::Idle => {}
        ViewState::Analyzing => {
            card(ui, CARD_FILL, |ui| {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.add_space(8.0);
                    ui.heading(egui::RichText::new("Analyzing Your Banana...").strong());
                    ui.label("Checking the ripeness level!");
                });
            });
        }
        ViewState::Failed(err) => {
            card(ui, egui::Color32::from_rgb(254, 242, 242), |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("⚠").size(24.0).color(egui::Color32::from_rgb(239, 68, 68)));
                    ui.heading(
                        egui::RichText::new("Oops!")
                            .strong()
                            .color(egui::Color32::from_rgb(153, 27, 27)),
                    );
                });
                ui.label(egui::RichText::new(err.user_message()).color(egui::Color32::from_rgb(185, 28, 28)));
            });
        }
        ViewState::Succeeded(verdict) => verdict_card(ui, verdict),
    }
}

fn verdict_card(ui: &mut egui::Ui, verdict: &RipenessVerdict) {
    card(ui, CARD_FILL, |ui| {
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("🍌").size(48.0));
            ui.heading(
                egui::RichText::new(capitalize(&verdict.ripeness))
                    .size(28.0)
                    .strong()
                    .color(level_color(verdict.level())),
            );
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(format!("Confidence: {:.0}%", verdict.confidence))
                    .size(16.0)
                    .strong(),
            );
            ui.add(egui::ProgressBar::new((verdict.confidence / 100.0) as f32).desired_width(240.0));
            ui.add_space(8.0);
            ui.label(egui::RichText::new(&verdict.description).color(egui::Color32::from_gray(80)));
        });
    });
}

fn card(ui: &mut egui::Ui, fill: egui::Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(fill)
        .rounding(egui::Rounding::same(16.0))
        .inner_margin(egui::Margin::same(16.0))
        .shadow(egui::epaint::Shadow {
            offset: egui::vec2(0.0, 2.0),
            blur: 8.0,
            spread: 0.0,
            color: egui::Color32::from_black_alpha(30),
        })
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            add_contents(ui);
        });
}

/// Text colour for a ripeness stage; unrecognised text reads as yellow.
pub fn level_color(level: Option<RipenessLevel>) -> egui::Color32 {
    match level {
        Some(RipenessLevel::Unripe) => egui::Color32::from_rgb(22, 163, 74),
        Some(RipenessLevel::Perfect) | None => egui::Color32::from_rgb(234, 179, 8),
        Some(RipenessLevel::VeryRipe) => egui::Color32::from_rgb(249, 115, 22),
        Some(RipenessLevel::Overripe) => egui::Color32::from_rgb(180, 83, 9),
    }
}

fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize("spotted/very ripe"), "Spotted/very Ripe");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_unknown_ripeness_is_yellow() {
        assert_eq!(level_color(None), level_color(Some(RipenessLevel::Perfect)));
        assert_ne!(
            level_color(Some(RipenessLevel::VeryRipe)),
            level_color(Some(RipenessLevel::Overripe))
        );
    }
}
