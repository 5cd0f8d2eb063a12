//! Keyboard shortcut handling

use eframe::egui;

use crate::state::settings::Mode;
use crate::state::AppState;
use crate::viewport::handles::HandleTool;
use crate::viewport::ViewportPanel;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState, viewport: &mut ViewportPanel) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    ctx.input(|i| {
        // Ctrl+Z — undo
        if i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift {
            state.scene.undo();
        }
        // Ctrl+Shift+Z or Ctrl+Y — redo
        if (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
            || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        {
            state.scene.redo();
        }

        // Tab — cycle through the tool modes with wraparound
        if i.key_pressed(egui::Key::Tab) {
            state.set_mode(state.settings.mode.cycle());
        }
        // 1-4 — direct mode selection
        if i.key_pressed(egui::Key::Num1) {
            state.set_mode(Mode::None);
        }
        if i.key_pressed(egui::Key::Num2) {
            state.set_mode(Mode::Create);
        }
        if i.key_pressed(egui::Key::Num3) {
            state.set_mode(Mode::Edit);
        }
        if i.key_pressed(egui::Key::Num4) {
            state.set_mode(Mode::Delete);
        }

        // Q/W/E/R — handle tool within Edit mode
        if i.key_pressed(egui::Key::Q) {
            state.tool = HandleTool::Move;
        }
        if i.key_pressed(egui::Key::W) {
            state.tool = HandleTool::Rotate;
        }
        if i.key_pressed(egui::Key::E) {
            state.tool = HandleTool::Scale;
        }
        if i.key_pressed(egui::Key::R) {
            state.tool = HandleTool::Rect;
        }

        // T — toggle top-down orthographic view
        if i.key_pressed(egui::Key::T) {
            viewport.toggle_top_down();
        }
        // Home — reset camera
        if i.key_pressed(egui::Key::Home) {
            viewport.reset_camera();
        }
    });
}
