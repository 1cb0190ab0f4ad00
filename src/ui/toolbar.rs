// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with source selection and recording controls.

use crate::models::selection::SelectionState;
use crate::studio::Studio;

/// Command requested from the toolbar this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    RefreshSources,
    SelectSource(usize),
    SelectRegion,
    ClearRegion,
    StartRecording,
    StopRecording,
    Download,
}

/// Display the toolbar and return the button the user pressed, if any.
pub fn show(ui: &mut egui::Ui, studio: &Studio) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let recording = studio.is_recording();
    let has_source = studio.has_live_source();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Source:");

        let selected_text = studio
            .source()
            .map(|s| s.label())
            .unwrap_or_else(|| "None".to_string());
        ui.add_enabled_ui(!recording, |ui| {
            egui::ComboBox::from_id_source("source_picker")
                .selected_text(selected_text)
                .width(260.0)
                .show_ui(ui, |ui| {
                    for (index, info) in studio.sources().iter().enumerate() {
                        let current = studio.source().is_some_and(|s| s == info);
                        if ui.selectable_label(current, info.label()).clicked() {
                            action = ToolbarAction::SelectSource(index);
                        }
                    }
                });

            if ui.button("⟳").on_hover_text("Refresh sources").clicked() {
                action = ToolbarAction::RefreshSources;
            }
        });

        ui.separator();

        let selecting = studio.selector().state() == SelectionState::Selecting;
        if ui
            .add_enabled(has_source && !recording, egui::SelectableLabel::new(selecting, "▭ Select Region"))
            .clicked()
        {
            action = ToolbarAction::SelectRegion;
        }

        if ui
            .add_enabled(studio.region().is_some() && !recording, egui::Button::new("✖ Clear Region"))
            .clicked()
        {
            action = ToolbarAction::ClearRegion;
        }

        ui.separator();

        if recording {
            if ui.button("⏹ Stop Recording").clicked() {
                action = ToolbarAction::StopRecording;
            }
        } else if ui
            .add_enabled(has_source, egui::Button::new("⏺ Start Recording"))
            .clicked()
        {
            action = ToolbarAction::StartRecording;
        }

        if ui
            .add_enabled(studio.recorded().is_some() && !recording, egui::Button::new("💾 Download"))
            .clicked()
        {
            action = ToolbarAction::Download;
        }
    });

    action
}
