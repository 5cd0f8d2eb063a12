use egui::Ui;

use crate::state::settings::Mode;
use crate::state::AppState;
use crate::viewport::ViewportPanel;

pub fn show(ui: &mut Ui, state: &AppState, viewport: &ViewportPanel) {
    ui.horizontal(|ui| {
        ui.weak(format!("Volumes: {}", state.scene.scene.volumes.len()));
        ui.separator();
        ui.weak(format!("Mode: {}", state.settings.mode.label()));

        if state.settings.mode == Mode::Create {
            ui.separator();
            ui.weak(format!("Stage: {}", viewport.create_stage().label()));
        }

        ui.separator();
        ui.weak(format!("Pivot: {}", state.settings.pivot.label()));

        let hint = match state.settings.mode {
            Mode::None => "1-4 select mode, Tab cycles",
            Mode::Create => {
                "Click to place, Shift+Click sets a reference plane, Alt sizes symmetrically, Esc cancels"
            }
            Mode::Edit => "Drag handles to edit, click a volume to activate it",
            Mode::Delete => "Click the highlighted volume to delete it",
        };
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(hint);
        });
    });
}
