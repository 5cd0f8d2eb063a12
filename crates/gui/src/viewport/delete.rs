//! Delete mode: closest-hit hover highlight and undo-aware destruction.

use std::collections::HashSet;

use shared::ObjectId;

use crate::state::SceneState;

use super::geometry::Ray;
use super::volume::{pick_volume, sync_handles, HandleMap};

/// The volume the cursor is over: minimum ray distance across all visible
/// volumes' collision surfaces, ties favoring the most recently active one.
pub fn hover_target(
    ray: &Ray,
    scene: &SceneState,
    visible: &HashSet<ObjectId>,
    handles: &HandleMap,
) -> Option<ObjectId> {
    pick_volume(
        ray,
        scene.scene.volumes.iter().filter(|v| visible.contains(&v.id)),
        handles,
    )
    .map(|(v, _)| v.id.clone())
}

/// Destroy the hovered volume through the undo log.
pub fn destroy(target: &ObjectId, scene: &mut SceneState, handles: &mut HandleMap) -> bool {
    let removed = scene.remove_volume(target);
    if removed {
        sync_handles(handles, &scene.scene.volumes);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use shared::{Transform, VolumeNode};

    use crate::viewport::volume;

    fn node(id: &str, z: f32) -> VolumeNode {
        let mut t = Transform::new();
        volume::set_position(&mut t, Vec3::new(0.0, 0.0, z));
        VolumeNode {
            id: id.into(),
            name: id.into(),
            transform: t,
        }
    }

    #[test]
    fn test_hover_picks_closest_visible_only() {
        let mut scene = SceneState::default();
        scene.add_volume(node("near", 2.0));
        scene.add_volume(node("far", 6.0));
        let mut handles = HandleMap::new();
        sync_handles(&mut handles, &scene.scene.volumes);

        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -4.0),
            direction: Vec3::Z,
        };

        let all: HashSet<ObjectId> = ["near".to_string(), "far".to_string()].into();
        assert_eq!(hover_target(&ray, &scene, &all, &handles).as_deref(), Some("near"));

        // The culled-out near volume can never be the hover target
        let only_far: HashSet<ObjectId> = ["far".to_string()].into();
        assert_eq!(hover_target(&ray, &scene, &only_far, &handles).as_deref(), Some("far"));
    }

    #[test]
    fn test_destroy_removes_and_supports_undo() {
        let mut scene = SceneState::default();
        scene.add_volume(node("a", 0.0));
        let mut handles = HandleMap::new();
        sync_handles(&mut handles, &scene.scene.volumes);

        assert!(destroy(&"a".to_string(), &mut scene, &mut handles));
        assert!(scene.scene.volumes.is_empty());
        assert!(handles.is_empty());

        scene.undo();
        assert_eq!(scene.scene.volumes.len(), 1);
    }
}
