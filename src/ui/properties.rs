// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region and recording properties panel.
//!
//! Shows the selected region in preview and source coordinates, the
//! state of the current recording, and the recording settings.

use crate::models::editor::MoveClamp;
use crate::recording::VideoTrack;
use crate::studio::Studio;

/// Setting changed from the panel this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertiesAction {
    None,
    SetMicrophone(bool),
    SetSystemAudio(bool),
    SetFrameRateCap(Option<u32>),
    SetMoveClamp(MoveClamp),
    SaveSettings,
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, studio: &Studio) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Properties");
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        show_source(ui, studio);
        ui.add_space(8.0);
        show_region(ui, studio);
        ui.add_space(8.0);
        show_recording(ui, studio);
        ui.add_space(8.0);
        action = show_settings(ui, studio);
    });

    action
}

fn show_source(ui: &mut egui::Ui, studio: &Studio) {
    ui.label(egui::RichText::new("Source").strong());
    match (studio.source(), studio.source_size()) {
        (Some(info), Some(size)) => {
            ui.label(info.name.as_str());
            ui.label(format!("Frame size: {}x{}", size.width, size.height));
        }
        _ => {
            ui.label(egui::RichText::new("No source selected").italics().weak());
        }
    }
    if let Some(viewport) = studio.viewport() {
        ui.label(format!("Preview: {:.0}x{:.0}", viewport.width, viewport.height));
    }
}

fn show_region(ui: &mut egui::Ui, studio: &Studio) {
    ui.label(egui::RichText::new("Region").strong());
    let Some(region) = studio.region() else {
        ui.label(egui::RichText::new("Whole source").italics().weak());
        return;
    };

    egui::Grid::new("region_grid")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            let source = region.source_rect();
            ui.label("");
            ui.label("Preview");
            ui.label("Source");
            ui.end_row();

            for (name, view, src) in [
                ("x", region.rect.x, source.x),
                ("y", region.rect.y, source.y),
                ("width", region.rect.width, source.width),
                ("height", region.rect.height, source.height),
            ] {
                ui.label(name);
                ui.label(format!("{:.1}", view));
                ui.label(format!("{:.1}", src));
                ui.end_row();
            }
        });

    ui.label(format!(
        "Scale: {:.3} x {:.3}",
        region.scale.x, region.scale.y
    ));
    if !region.rect.has_area() {
        ui.label(
            egui::RichText::new("Empty region, the whole source will be recorded")
                .color(egui::Color32::YELLOW),
        );
    }
}

fn show_recording(ui: &mut egui::Ui, studio: &Studio) {
    ui.label(egui::RichText::new("Recording").strong());

    if let Some(session) = studio.session() {
        ui.label(egui::RichText::new("● Recording").color(egui::Color32::RED));
        match session.video() {
            VideoTrack::Cropped(compositor) => {
                let (w, h) = compositor.surface_size();
                let crop = compositor.crop_rect();
                ui.label(format!("Output: {}x{} (cropped)", w, h));
                ui.label(format!("Crop origin: ({}, {})", crop.x, crop.y));
                if compositor.is_stopped() {
                    ui.label(egui::RichText::new("Compositor stopped").weak());
                }
            }
            VideoTrack::Source(_) => {
                if let Some(size) = studio.source_size() {
                    ui.label(format!("Output: {}x{}", size.width, size.height));
                }
            }
        }
        ui.label(format!("Frames: {}", session.frames()));
        ui.label(format!("Audio tracks: {}", session.audio_track_count()));
    } else if let Some(media) = studio.recorded() {
        ui.label(format!(
            "Last recording: {} frames, {:.1}s",
            media.frames,
            media.duration.as_secs_f64()
        ));
        ui.label(format!("Audio tracks: {}", media.audio.len()));
    } else {
        ui.label(egui::RichText::new("Idle").italics().weak());
    }
}

fn show_settings(ui: &mut egui::Ui, studio: &Studio) -> PropertiesAction {
    let mut action = PropertiesAction::None;
    let config = studio.config();
    let locked = studio.is_recording();

    ui.label(egui::RichText::new("Settings").strong());

    ui.add_enabled_ui(!locked, |ui| {
        let mut include_microphone = config.include_microphone;
        if ui.checkbox(&mut include_microphone, "Include microphone").changed() {
            action = PropertiesAction::SetMicrophone(include_microphone);
        }

        let mut include_system_audio = config.include_system_audio;
        if ui
            .checkbox(&mut include_system_audio, "Include system audio")
            .on_hover_text("Recorded only where the platform supports audio loopback")
            .changed()
        {
            action = PropertiesAction::SetSystemAudio(include_system_audio);
        }

        let mut capped = config.frame_rate_cap.is_some();
        let mut fps = config.frame_rate_cap.unwrap_or(30);
        ui.horizontal(|ui| {
            let toggled = ui.checkbox(&mut capped, "Limit frame rate").changed();
            let edited = ui
                .add_enabled(capped, egui::DragValue::new(&mut fps).range(1..=120).suffix(" fps"))
                .changed();
            if toggled || edited {
                action = PropertiesAction::SetFrameRateCap(capped.then_some(fps));
            }
        });

        ui.label("At preview edges:");
        let mut move_clamp = config.move_clamp;
        let mut changed = ui
            .radio_value(&mut move_clamp, MoveClamp::Independent, "Slide along edges")
            .changed();
        changed |= ui
            .radio_value(&mut move_clamp, MoveClamp::Proportional, "Keep drag direction")
            .changed();
        if changed {
            action = PropertiesAction::SetMoveClamp(move_clamp);
        }
    });

    ui.add_space(4.0);
    if ui.button("Save settings").clicked() {
        action = PropertiesAction::SaveSettings;
    }

    action
}
