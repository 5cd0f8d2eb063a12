//! Main toolbar: mode selector, handle tools, pivot and draw options

use egui::Ui;

use crate::state::settings::{Alignment, Mode, Pivot};
use crate::state::AppState;
use crate::viewport::handles::HandleTool;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        for mode in Mode::ALL {
            if ui
                .selectable_label(state.settings.mode == mode, mode.label())
                .clicked()
            {
                state.set_mode(mode);
            }
        }

        ui.separator();

        if state.settings.mode == Mode::Edit {
            for tool in [
                HandleTool::Move,
                HandleTool::Rotate,
                HandleTool::Scale,
                HandleTool::Rect,
            ] {
                ui.selectable_value(&mut state.tool, tool, tool.label());
            }
            ui.separator();
        }

        egui::ComboBox::from_id_salt("pivot")
            .selected_text(format!("Pivot: {}", state.settings.pivot.label()))
            .show_ui(ui, |ui| {
                for pivot in [Pivot::Center, Pivot::Surface] {
                    ui.selectable_value(&mut state.settings.pivot, pivot, pivot.label());
                }
            });

        egui::ComboBox::from_id_salt("alignment")
            .selected_text(format!("Align: {}", state.settings.alignment.label()))
            .show_ui(ui, |ui| {
                for alignment in [Alignment::XAxis, Alignment::YAxis, Alignment::ZAxis] {
                    ui.selectable_value(
                        &mut state.settings.alignment,
                        alignment,
                        alignment.label(),
                    );
                }
            });

        ui.checkbox(&mut state.settings.draw_full_volume, "Full volume");
        ui.checkbox(&mut state.settings.grid_snap, "Grid snap");

        ui.separator();

        if ui
            .add_enabled(state.scene.can_undo(), egui::Button::new("Undo"))
            .clicked()
        {
            state.scene.undo();
        }
        if ui
            .add_enabled(state.scene.can_redo(), egui::Button::new("Redo"))
            .clicked()
        {
            state.scene.redo();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.toggle_value(&mut state.settings.show_properties, "Properties");
        });
    });
}
