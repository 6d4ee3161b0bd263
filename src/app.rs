// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Image loading and analysis run on background threads. Results come back
//! over a channel tagged with the generation of the submission that
//! produced them; anything older than the latest submission is dropped.

use crate::analysis::{
    self,
    gemini::{GeminiClient, InferenceBackend},
};
use crate::audio::{player::AudioPlayer, select_cue, Attempt, AudioCue, DeferredCue};
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::io::{camera, media, serialization};
use crate::models::{report::AnalysisReport, session::Session, verdict::RipenessVerdict};
use crate::ui::{results, upload};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Where a submitted image comes from.
enum ImageSource {
    File { path: PathBuf, mime: String },
    Bytes { name: String, mime: String, bytes: Arc<[u8]> },
    Camera { command: Vec<String> },
}

/// Messages from background threads.
enum WorkerEvent {
    ImageLoaded {
        generation: u64,
        image: media::LoadedImage,
    },
    AnalysisFinished {
        generation: u64,
        result: Result<RipenessVerdict, AnalysisError>,
    },
    PlaybackFailed {
        generation: u64,
        cue: AudioCue,
        attempt: Attempt,
    },
}

/// Main application state.
pub struct PazhamApp {
    config: AppConfig,

    /// Inference service client
    backend: Arc<dyn InferenceBackend>,

    /// Cue player (None when sound is disabled or unavailable)
    player: Option<AudioPlayer>,

    /// Submission lifecycle and view state
    session: Session,

    /// Preview of the image behind the current submission
    preview: Option<results::Preview>,

    /// Playback retry waiting for the next click
    deferred_cue: DeferredCue,

    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
}

impl PazhamApp {
    /// Create the application, optionally submitting an image straight away.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, initial_image: Option<PathBuf>) -> anyhow::Result<Self> {
        let backend: Arc<dyn InferenceBackend> = Arc::new(GeminiClient::new(&config.inference)?);
        if config.inference.api_key.is_none() {
            log::warn!("No API key configured; analyses will fail until one is set");
        }

        let player = if config.audio.enabled {
            match AudioPlayer::new(config.audio.clone()) {
                Ok(player) => Some(player),
                Err(e) => {
                    log::warn!("Audio disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let (events_tx, events_rx) = channel();
        let mut app = Self {
            config,
            backend,
            player,
            session: Session::new(),
            preview: None,
            deferred_cue: DeferredCue::default(),
            events_tx,
            events_rx,
        };

        if let Some(path) = initial_image {
            app.submit_path(path, None, &cc.egui_ctx);
        }
        Ok(app)
    }

    /// Submit a file if its declared type is an image; anything else is ignored.
    fn submit_path(&mut self, path: PathBuf, declared: Option<String>, ctx: &egui::Context) {
        match media::accepted_mime(&path, declared.as_deref()) {
            Some(mime) => self.submit(ImageSource::File { path, mime }, ctx),
            None => log::debug!("Ignoring {}: not an image", path.display()),
        }
    }

    fn submit_dropped(&mut self, file: egui::DroppedFile, ctx: &egui::Context) {
        match (file.path, file.bytes) {
            (Some(path), _) => self.submit_path(path, Some(file.mime), ctx),
            (None, Some(bytes)) if media::is_image_mime(&file.mime) => {
                let source = ImageSource::Bytes {
                    name: file.name,
                    mime: file.mime,
                    bytes,
                };
                self.submit(source, ctx);
            }
            _ => log::debug!("Ignoring dropped item {:?}", file.name),
        }
    }

    /// Reset per-submission state and return the new generation.
    fn begin_submission(&mut self) -> u64 {
        let generation = self.session.begin();
        self.deferred_cue.cancel();
        self.preview = None;
        generation
    }

    /// Start a new submission on a background thread.
    fn submit(&mut self, source: ImageSource, ctx: &egui::Context) {
        let generation = self.begin_submission();
        log::info!("Starting analysis #{}", generation);

        let backend = Arc::clone(&self.backend);
        let structured_output = self.config.inference.structured_output;
        let sender = self.events_tx.clone();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = acquire(source).and_then(|image| {
                let encoded = image.encoded.clone();
                let _ = sender.send(WorkerEvent::ImageLoaded { generation, image });
                ctx.request_repaint();
                analysis::analyze(backend.as_ref(), &encoded, structured_output)
            });

            let _ = sender.send(WorkerEvent::AnalysisFinished { generation, result });
            ctx.request_repaint();
        });
    }

    fn play_cue(&self, cue: AudioCue, attempt: Attempt, ctx: &egui::Context) {
        let Some(player) = &self.player else {
            return;
        };
        let generation = self.session.generation();
        let sender = self.events_tx.clone();
        let ctx = ctx.clone();
        player.play(cue, attempt, move |_| {
            let _ = sender.send(WorkerEvent::PlaybackFailed {
                generation,
                cue,
                attempt,
            });
            ctx.request_repaint();
        });
    }

    fn handle_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event, ctx);
        }
    }

    /// Apply one worker event. Events from superseded submissions are dropped.
    fn apply_event(&mut self, event: WorkerEvent, ctx: &egui::Context) {
        match event {
            WorkerEvent::ImageLoaded { generation, image } => {
                if !self.session.is_current(generation) {
                    return;
                }
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                let texture = ctx.load_texture("selected_image", color_image, egui::TextureOptions::LINEAR);
                self.preview = Some(results::Preview {
                    texture,
                    size: (image.width, image.height),
                    file_name: image.file_name,
                });
            }
            WorkerEvent::AnalysisFinished { generation, result } => {
                if let Err(e) = &result {
                    log::error!("Analysis #{} failed: {}", generation, e);
                }
                if let Some(verdict) = self.session.resolve(generation, result) {
                    log::info!(
                        "Analysis #{}: {} ({:.0}%)",
                        generation,
                        verdict.ripeness,
                        verdict.confidence
                    );
                    if let Some(cue) = select_cue(&verdict.ripeness) {
                        self.play_cue(cue, Attempt::First, ctx);
                    }
                }
            }
            WorkerEvent::PlaybackFailed {
                generation,
                cue,
                attempt,
            } => {
                if self.session.is_current(generation) {
                    self.deferred_cue.on_failure(cue, attempt);
                } else {
                    log::debug!("Dropping {:?} cue failure from submission {}", cue, generation);
                }
            }
        }
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"])
            .pick_file()
        {
            self.submit_path(path, None, ctx);
        }
    }

    fn take_photo(&mut self, ctx: &egui::Context) {
        let command = self.config.camera.command.clone();
        self.submit(ImageSource::Camera { command }, ctx);
    }

    /// Export the current verdict to a file.
    fn save_report(&self, path: PathBuf) {
        let Some(verdict) = self.session.verdict() else {
            return;
        };
        let image_file = self
            .preview
            .as_ref()
            .map(|p| p.file_name.clone())
            .unwrap_or_default();
        let report = AnalysisReport::new(image_file, self.backend.model().to_string(), verdict.clone());

        match serialization::export_report(&report, &path) {
            Ok(()) => log::info!("Exported report to {}", path.display()),
            Err(e) => log::error!("Failed to export report: {}", e),
        }
    }
}

/// Read (or capture) and encode the submitted image.
fn acquire(source: ImageSource) -> Result<media::LoadedImage, AnalysisError> {
    let loaded = match source {
        ImageSource::File { path, mime } => media::load_image(&path, &mime),
        ImageSource::Bytes { name, mime, bytes } => media::load_image_bytes(&bytes, &mime, name),
        ImageSource::Camera { command } => {
            camera::capture(&command).and_then(|shot| media::load_image(&shot, "image/jpeg"))
        }
    };
    loaded.map_err(|e| AnalysisError::Input(format!("{:#}", e)))
}

impl eframe::App for PazhamApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_events(ctx);

        // A click anywhere releases a blocked audio cue.
        if self.deferred_cue.is_armed() && ctx.input(|i| i.pointer.any_click()) {
            if let Some(cue) = self.deferred_cue.take_on_click() {
                self.play_cue(cue, Attempt::Retry, ctx);
            }
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.into_iter().next() {
            self.submit_dropped(file, ctx);
        }
        let files_hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        // Request repaint while analyzing (to update spinner)
        if self.session.is_analyzing() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        ui.close_menu();
                        self.pick_file(ctx);
                    }
                    let has_verdict = self.session.verdict().is_some();
                    ui.menu_button("Save Report", |ui| {
                        if ui.add_enabled(has_verdict, egui::Button::new("Save as YAML...")).clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("ripeness.yaml")
                                .save_file()
                            {
                                self.save_report(path);
                            }
                            ui.close_menu();
                        }
                        if ui.add_enabled(has_verdict, egui::Button::new("Save as JSON...")).clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("ripeness.json")
                                .save_file()
                            {
                                self.save_report(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        let panel_fill = egui::Color32::from_rgb(254, 249, 195);
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(panel_fill))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.heading(
                        egui::RichText::new("🍌 PazhamPazhutho 🍌")
                            .size(36.0)
                            .strong()
                            .color(egui::Color32::from_rgb(202, 138, 4)),
                    );
                    ui.label(
                        egui::RichText::new("Lets analyze your BANANAAAAA!")
                            .size(18.0)
                            .color(egui::Color32::from_gray(60)),
                    );
                    ui.add_space(16.0);
                });

                let mut action = upload::UploadAction::None;
                ui.columns(2, |columns| {
                    action = upload::show(&mut columns[0], files_hovering, self.config.camera.is_configured());
                    egui::ScrollArea::vertical().show(&mut columns[1], |ui| {
                        results::show(ui, self.preview.as_ref(), self.session.state());
                    });
                });

                match action {
                    upload::UploadAction::TakePhoto => self.take_photo(ctx),
                    upload::UploadAction::PickFile => self.pick_file(ctx),
                    upload::UploadAction::None => {}
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gemini::GenerateContentRequest;
    use crate::models::session::ViewState;
    use image::{DynamicImage, ImageFormat, RgbImage};

    struct Offline;

    impl InferenceBackend for Offline {
        fn generate(&self, _: &GenerateContentRequest) -> Result<String, AnalysisError> {
            Err(AnalysisError::MissingApiKey)
        }

        fn model(&self) -> &str {
            "offline"
        }
    }

    fn test_app() -> PazhamApp {
        let (events_tx, events_rx) = channel();
        PazhamApp {
            config: AppConfig::default(),
            backend: Arc::new(Offline),
            player: None,
            session: Session::new(),
            preview: None,
            deferred_cue: DeferredCue::default(),
            events_tx,
            events_rx,
        }
    }

    fn loaded(name: &str) -> media::LoadedImage {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        media::load_image_bytes(bytes.get_ref(), "image/png", name.to_string()).unwrap()
    }

    fn verdict() -> RipenessVerdict {
        RipenessVerdict {
            ripeness: "yellow/perfect".to_string(),
            confidence: 92.0,
            description: "firm, bright yellow".to_string(),
        }
    }

    fn playback_failed(generation: u64) -> WorkerEvent {
        WorkerEvent::PlaybackFailed {
            generation,
            cue: AudioCue::Ripe,
            attempt: Attempt::First,
        }
    }

    #[test]
    fn test_late_cue_failure_from_replaced_submission_is_dropped() {
        let ctx = egui::Context::default();
        let mut app = test_app();

        let first = app.begin_submission();
        app.apply_event(
            WorkerEvent::AnalysisFinished {
                generation: first,
                result: Ok(verdict()),
            },
            &ctx,
        );
        let second = app.begin_submission();

        app.apply_event(playback_failed(first), &ctx);
        assert!(!app.deferred_cue.is_armed());

        app.apply_event(playback_failed(second), &ctx);
        assert_eq!(app.deferred_cue.take_on_click(), Some(AudioCue::Ripe));
    }

    #[test]
    fn test_new_submission_cancels_pending_cue() {
        let ctx = egui::Context::default();
        let mut app = test_app();

        let first = app.begin_submission();
        app.apply_event(playback_failed(first), &ctx);
        assert!(app.deferred_cue.is_armed());

        app.begin_submission();
        assert!(!app.deferred_cue.is_armed());
    }

    #[test]
    fn test_failed_read_does_not_show_previous_image() {
        let ctx = egui::Context::default();
        let mut app = test_app();

        let first = app.begin_submission();
        app.apply_event(
            WorkerEvent::ImageLoaded {
                generation: first,
                image: loaded("first.png"),
            },
            &ctx,
        );
        assert_eq!(app.preview.as_ref().map(|p| p.file_name.as_str()), Some("first.png"));

        let second = app.begin_submission();
        assert!(app.preview.is_none());
        app.apply_event(
            WorkerEvent::AnalysisFinished {
                generation: second,
                result: Err(AnalysisError::Input("broken.heic is not a readable image".to_string())),
            },
            &ctx,
        );

        assert!(app.preview.is_none());
        assert!(matches!(app.session.state(), ViewState::Failed(AnalysisError::Input(_))));
    }

    #[test]
    fn test_stale_preview_is_ignored() {
        let ctx = egui::Context::default();
        let mut app = test_app();

        let first = app.begin_submission();
        let second = app.begin_submission();
        app.apply_event(
            WorkerEvent::ImageLoaded {
                generation: first,
                image: loaded("old.png"),
            },
            &ctx,
        );
        assert!(app.preview.is_none());

        app.apply_event(
            WorkerEvent::ImageLoaded {
                generation: second,
                image: loaded("new.png"),
            },
            &ctx,
        );
        assert_eq!(app.preview.as_ref().map(|p| p.file_name.as_str()), Some("new.png"));
    }

    #[test]
    fn test_preview_survives_failed_analysis() {
        let ctx = egui::Context::default();
        let mut app = test_app();

        let generation = app.begin_submission();
        app.apply_event(
            WorkerEvent::ImageLoaded {
                generation,
                image: loaded("banana.png"),
            },
            &ctx,
        );
        app.apply_event(
            WorkerEvent::AnalysisFinished {
                generation,
                result: Err(AnalysisError::NoJson),
            },
            &ctx,
        );

        assert!(app.preview.is_some());
        assert!(matches!(app.session.state(), ViewState::Failed(AnalysisError::NoJson)));
    }
}
