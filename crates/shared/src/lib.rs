use serde::{Deserialize, Serialize};

/// Unique identifier of an object in the scene
pub type ObjectId = String;

/// Transform of a volume in world space.
///
/// `position` is always the geometric center of the box; tools that present
/// a different pivot convention convert on access. `rotation` is a unit
/// quaternion `[x, y, z, w]`. `scale` holds the full extents along the local
/// X (width), Y (height) and Z (depth) axes and is kept non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Normalize the scale to absolute values.
    pub fn normalize_scale(&mut self) {
        for s in &mut self.scale {
            *s = s.abs();
        }
    }

    /// Largest scale axis (used for conservative bounding volumes).
    pub fn max_extent(&self) -> f32 {
        self.scale[0].max(self.scale[1]).max(self.scale[2])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// One authored box volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeNode {
    pub id: ObjectId,
    pub name: String,
    pub transform: Transform,
}

/// The set of volumes under the tool's authority, in authoring order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneDescription {
    pub volumes: Vec<VolumeNode>,
}

impl SceneDescription {
    pub fn volume(&self, id: &str) -> Option<&VolumeNode> {
        self.volumes.iter().find(|v| v.id == id)
    }

    pub fn volume_mut(&mut self, id: &str) -> Option<&mut VolumeNode> {
        self.volumes.iter_mut().find(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_new_is_identity() {
        let t = Transform::new();
        assert_eq!(t.position, [0.0, 0.0, 0.0]);
        assert_eq!(t.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.scale, [1.0, 1.0, 1.0]);
        assert_eq!(t, Transform::default());
    }

    #[test]
    fn test_normalize_scale_strips_sign() {
        let mut t = Transform::new();
        t.scale = [-2.0, 0.5, -0.0];
        t.normalize_scale();
        assert_eq!(t.scale, [2.0, 0.5, 0.0]);
    }

    #[test]
    fn test_max_extent() {
        let mut t = Transform::new();
        t.scale = [1.0, 4.0, 2.5];
        assert_eq!(t.max_extent(), 4.0);
    }

    #[test]
    fn test_scene_lookup() {
        let mut scene = SceneDescription::default();
        scene.volumes.push(VolumeNode {
            id: "a".into(),
            name: "Volume 1".into(),
            transform: Transform::new(),
        });
        assert!(scene.volume("a").is_some());
        assert!(scene.volume("b").is_none());
        scene.volume_mut("a").unwrap().transform.position = [1.0, 2.0, 3.0];
        assert_eq!(scene.volume("a").unwrap().transform.position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scene_json_round_trip() {
        let mut scene = SceneDescription::default();
        scene.volumes.push(VolumeNode {
            id: "a".into(),
            name: "Volume 1".into(),
            transform: Transform {
                position: [1.0, 2.0, 3.0],
                rotation: [0.0, 0.707, 0.0, 0.707],
                scale: [2.0, 1.0, 4.0],
            },
        });
        let json = serde_json::to_string(&scene).unwrap();
        let back: SceneDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(scene, back);
    }
}
