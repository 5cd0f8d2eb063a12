//! Main application module

mod keyboard;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{properties, status_bar, toolbar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct VolumeEditorApp {
    state: AppState,
    viewport: ViewportPanel,
    /// Last saved scene version (for autosave)
    last_saved_version: u64,
    /// Last persisted settings (save-on-change)
    last_settings: crate::state::ToolSettings,
}

impl VolumeEditorApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        initial_scene: Option<shared::SceneDescription>,
    ) -> Self {
        let mut state = AppState::default();

        // Load initial scene: CLI argument takes priority, then autosave
        if let Some(scene) = initial_scene {
            state.scene.set_scene(scene);
        } else if let Some(autosave) = crate::state::SceneState::load_autosave() {
            state.scene.set_scene(autosave);
            tracing::info!("Loaded autosave scene");
        }

        let last_saved_version = state.scene.version();
        let last_settings = state.settings.clone();

        Self {
            state,
            viewport: ViewportPanel::new(),
            last_saved_version,
            last_settings,
        }
    }
}

impl eframe::App for VolumeEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Autosave scene if changed
        let current_version = self.state.scene.version();
        if current_version != self.last_saved_version {
            self.state.scene.autosave();
            self.last_saved_version = current_version;
        }

        // Persist settings on change
        if self.state.settings != self.last_settings {
            self.state.settings.save();
            self.last_settings = self.state.settings.clone();
        }

        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // ── Toolbar ───────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                toolbar::show(ui, &mut self.state);
            });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state, &self.viewport);
            });

        // ── Right panel: Properties ──────────────────────────
        if self.state.settings.show_properties {
            let active = self.viewport.active_volume().cloned();
            egui::SidePanel::right("properties")
                .default_width(260.0)
                .width_range(180.0..=420.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        properties::show(ui, &mut self.state, active);
                    });
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });
    }
}
