//! Scene state management
//!
//! Holds the volume set with undo/redo history and a version counter that
//! downstream caches key off.

mod history;
mod persistence;
mod volume_ops;

use shared::{SceneDescription, VolumeNode};

/// Scene state with volumes and undo/redo history
#[derive(Default)]
pub struct SceneState {
    /// Current volume set
    pub scene: SceneDescription,
    /// Undo stack - previous states
    pub(crate) undo_stack: Vec<SceneDescription>,
    /// Redo stack - undone states
    pub(crate) redo_stack: Vec<SceneDescription>,
    /// Monotonically increasing version counter for cache invalidation
    pub(crate) version: u64,
}

impl SceneState {
    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_scene(&mut self, scene: SceneDescription) {
        self.scene = scene;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.version += 1;
    }

    pub fn volume(&self, id: &str) -> Option<&VolumeNode> {
        self.scene.volume(id)
    }

    pub fn volume_mut(&mut self, id: &str) -> Option<&mut VolumeNode> {
        self.scene.volume_mut(id)
    }

    /// Bump version without saving undo
    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }

    /// Save current state to undo stack
    pub(crate) fn save_undo(&mut self) {
        self.undo_stack.push(self.scene.clone());
        if self.undo_stack.len() > 100 {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Transform;

    fn node(id: &str) -> VolumeNode {
        VolumeNode {
            id: id.into(),
            name: format!("Volume {id}"),
            transform: Transform::new(),
        }
    }

    #[test]
    fn test_add_and_remove_with_undo() {
        let mut state = SceneState::default();
        state.add_volume(node("a"));
        assert_eq!(state.scene.volumes.len(), 1);

        state.undo();
        assert!(state.scene.volumes.is_empty());

        state.redo();
        assert_eq!(state.scene.volumes.len(), 1);

        assert!(state.remove_volume("a"));
        assert!(state.scene.volumes.is_empty());
        state.undo();
        assert_eq!(state.scene.volumes.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut state = SceneState::default();
        state.add_volume(node("a"));
        let version = state.version();
        assert!(!state.remove_volume("missing"));
        assert_eq!(state.version(), version);
        assert_eq!(state.undo_stack.len(), 1);
    }

    #[test]
    fn test_version_increments_on_mutation() {
        let mut state = SceneState::default();
        let v0 = state.version();
        state.add_volume(node("a"));
        assert!(state.version() > v0);
        let v1 = state.version();
        state.begin_change();
        assert!(state.version() > v1);
    }

    #[test]
    fn test_undo_restores_transform_change() {
        let mut state = SceneState::default();
        state.add_volume(node("a"));
        state.begin_change();
        state.volume_mut("a").unwrap().transform.position = [5.0, 0.0, 0.0];

        state.undo();
        assert_eq!(state.volume("a").unwrap().transform.position, [0.0, 0.0, 0.0]);
        state.redo();
        assert_eq!(state.volume("a").unwrap().transform.position, [5.0, 0.0, 0.0]);
    }
}
