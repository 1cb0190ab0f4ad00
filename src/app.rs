// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the [`Studio`], keeps the preview texture
//! in sync with the captured frames, and routes toolbar, properties and
//! canvas input to studio commands.

use crate::capture::SystemCaptureProvider;
use crate::config::Config;
use crate::io::{export, serialization};
use crate::recording::{FileSink, RecorderSink};
use crate::studio::{Notice, NoticeLevel, SinkFactory, Studio};
use crate::ui::canvas::{self, PointerEvent, PointerTracker};
use crate::ui::properties::{self, PropertiesAction};
use crate::ui::toolbar::{self, ToolbarAction};
use image::RgbaImage;
use std::time::Instant;

/// Main application state.
pub struct CropRecorderApp {
    /// Sources, region and recording state
    studio: Studio,

    /// Latest captured frame, uploaded for display
    preview: Option<egui::TextureHandle>,

    /// Press on the preview that has not been released yet
    pointer: PointerTracker,
}

impl CropRecorderApp {
    /// Create the application with the system capture backends.
    pub fn new(config: Config) -> Self {
        let sink_factory: SinkFactory = Box::new(|config: &Config| {
            Box::new(FileSink::in_temp_dir(config.gif_speed)) as Box<dyn RecorderSink>
        });
        let mut studio = Studio::new(Box::new(SystemCaptureProvider), sink_factory, config);
        if let Err(e) = studio.refresh_sources() {
            log::warn!("Could not list capture sources: {}", e);
        }

        Self {
            studio,
            preview: None,
            pointer: PointerTracker::default(),
        }
    }

    /// Upload a captured frame as the preview texture.
    fn update_preview(&mut self, ctx: &egui::Context, frame: &RgbaImage) {
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
        match self.preview.as_mut() {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.preview = Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
            }
        }
    }

    /// Ask where to save the last recording and write it there.
    fn download_recording(&mut self) {
        let config = self.studio.config();
        let Some(media) = self.studio.recorded() else {
            return;
        };

        let file_name = export::timestamped_file_name(&config.filename_prefix, media.video_extension);
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Recording", &[media.video_extension])
            .set_file_name(file_name);
        if let Some(dir) = config.save_directory() {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        let notice = match export::write_recording(media, &path) {
            Ok(files) => Notice::info(format!("Saved {} file(s) to {}", files.len(), path.display())),
            Err(e) => {
                log::error!("Failed to save recording: {:#}", e);
                Notice {
                    level: NoticeLevel::Error,
                    message: format!("Failed to save recording: {}", e),
                }
            }
        };
        self.studio.post_notice(notice);
    }

    /// Write the current settings to the config file.
    fn save_settings(&mut self) {
        let Some(path) = Config::resolve_path() else {
            log::warn!("No config directory available");
            return;
        };

        let notice = match serialization::export_config(self.studio.config(), &path) {
            Ok(()) => {
                log::info!("Saved settings to {}", path.display());
                Notice::info(format!("Settings saved to {}", path.display()))
            }
            Err(e) => {
                log::error!("Failed to save settings: {}", e);
                Notice {
                    level: NoticeLevel::Error,
                    message: format!("Failed to save settings: {}", e),
                }
            }
        };
        self.studio.post_notice(notice);
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        // Failures are reported through the studio notice.
        let result = match action {
            ToolbarAction::RefreshSources => self.studio.refresh_sources(),
            ToolbarAction::SelectSource(index) => self.studio.select_source(index),
            ToolbarAction::SelectRegion => self.studio.begin_region_selection(),
            ToolbarAction::ClearRegion => {
                self.studio.clear_region();
                Ok(())
            }
            ToolbarAction::StartRecording => self.studio.start_recording(),
            ToolbarAction::StopRecording => self.studio.stop_recording(),
            ToolbarAction::Download => {
                self.download_recording();
                Ok(())
            }
            ToolbarAction::None => Ok(()),
        };
        if let Err(e) = result {
            log::debug!("{:?} failed: {}", action, e);
        }
    }

    fn handle_properties(&mut self, action: PropertiesAction) {
        match action {
            PropertiesAction::SetMicrophone(include) => self.studio.set_include_microphone(include),
            PropertiesAction::SetSystemAudio(include) => self.studio.set_include_system_audio(include),
            PropertiesAction::SetFrameRateCap(cap) => self.studio.set_frame_rate_cap(cap),
            PropertiesAction::SetMoveClamp(clamp) => self.studio.set_move_clamp(clamp),
            PropertiesAction::SaveSettings => self.save_settings(),
            PropertiesAction::None => {}
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.studio.notice() else {
            return;
        };
        let color = match notice.level {
            NoticeLevel::Info => egui::Color32::LIGHT_GREEN,
            NoticeLevel::Warning => egui::Color32::YELLOW,
            NoticeLevel::Error => egui::Color32::LIGHT_RED,
        };
        let message = notice.message.clone();

        let dismissed = egui::TopBottomPanel::bottom("notice")
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(message).color(color));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small_button("✖").on_hover_text("Dismiss").clicked()
                    })
                    .inner
                })
                .inner
            })
            .inner;

        if dismissed {
            self.studio.dismiss_notice();
        }
    }
}

impl eframe::App for CropRecorderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.studio.tick(Instant::now()) {
            Some(frame) => self.update_preview(ctx, &frame),
            None if !self.studio.has_live_source() => self.preview = None,
            None => {}
        }

        // Keep pulling frames while a source is live
        if self.studio.has_live_source() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let can_download = self.studio.recorded().is_some() && !self.studio.is_recording();
                    if ui.add_enabled(can_download, egui::Button::new("Save Recording...")).clicked() {
                        self.download_recording();
                        ui.close_menu();
                    }
                    if ui.button("Save Settings").clicked() {
                        self.save_settings();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.studio))
            .inner;
        self.handle_toolbar(toolbar_action);

        self.show_notice(ctx);

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, &self.studio))
            .inner;
        self.handle_properties(properties_action);

        // Escape abandons the region
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.studio.clear_region();
        }

        // Main canvas (center)
        let output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &self.preview,
                    self.studio.source_size(),
                    self.studio.selector(),
                    self.studio.is_recording(),
                    &mut self.pointer,
                )
            })
            .inner;

        if let Some(viewport) = output.viewport {
            self.studio.set_viewport(viewport);
        }
        for event in output.events {
            match event {
                PointerEvent::Down(p) => self.studio.pointer_down(p),
                PointerEvent::Move(p) => self.studio.pointer_move(p),
                PointerEvent::Up(p) => self.studio.pointer_up(p),
            }
        }
    }
}
