pub mod scene;
pub mod settings;

pub use scene::SceneState;
pub use settings::{Alignment, Mode, Pivot, ToolSettings};

use crate::viewport::handles::HandleTool;

/// Combined application state
pub struct AppState {
    pub scene: SceneState,
    pub settings: ToolSettings,
    /// Active handle tool within Edit mode (not persisted)
    pub tool: HandleTool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            scene: SceneState::default(),
            settings: ToolSettings::load(),
            tool: HandleTool::Move,
        }
    }
}

impl AppState {
    /// Switch the tool mode. The caller (viewport) cancels any in-progress
    /// creation when it observes the change.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.settings.mode != mode {
            tracing::info!("Mode: {} -> {}", self.settings.mode.label(), mode.label());
            self.settings.mode = mode;
        }
    }
}
