//! Undo-aware volume operations

use shared::VolumeNode;

use super::SceneState;

impl SceneState {
    /// Register a finished volume. The pre-insert state goes on the undo
    /// stack, so undoing removes the volume again.
    pub fn add_volume(&mut self, mut volume: VolumeNode) {
        volume.transform.normalize_scale();
        self.save_undo();
        tracing::info!("Registered volume {} ({})", volume.name, volume.id);
        self.scene.volumes.push(volume);
        self.version += 1;
    }

    /// Destroy a volume through the undo log. Returns false if the id is
    /// unknown (nothing is recorded in that case).
    pub fn remove_volume(&mut self, id: &str) -> bool {
        if self.scene.volume(id).is_none() {
            return false;
        }
        self.save_undo();
        self.scene.volumes.retain(|v| v.id != id);
        tracing::info!("Destroyed volume {id}");
        self.version += 1;
        true
    }

    /// Save undo state once at the beginning of a mutation gesture
    /// (handle drag, numeric edit). Subsequent per-frame writes go through
    /// `volume_mut` + `notify_mutated` without further undo entries.
    pub fn begin_change(&mut self) {
        self.save_undo();
        self.version += 1;
    }
}
