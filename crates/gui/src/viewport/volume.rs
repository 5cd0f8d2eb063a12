//! Pivot-aware access to a volume's transform, plus the per-volume
//! authoring bookkeeping (active flag, gesture snapshot, interaction time).

use std::collections::HashMap;

use glam::{Quat, Vec3};
use shared::{ObjectId, Transform, VolumeNode};

use crate::state::settings::Pivot;

use super::geometry::{ray_obb, Ray};

/// Smallest extent a finished volume may have on any axis
pub const MIN_EXTENT: f32 = 0.001;

pub fn position(t: &Transform) -> Vec3 {
    Vec3::from(t.position)
}

pub fn rotation(t: &Transform) -> Quat {
    Quat::from_xyzw(t.rotation[0], t.rotation[1], t.rotation[2], t.rotation[3]).normalize()
}

pub fn scale(t: &Transform) -> Vec3 {
    Vec3::from(t.scale)
}

pub fn set_position(t: &mut Transform, p: Vec3) {
    t.position = p.to_array();
}

pub fn set_rotation(t: &mut Transform, q: Quat) {
    t.rotation = q.normalize().to_array();
}

pub fn set_scale(t: &mut Transform, s: Vec3) {
    t.scale = s.abs().to_array();
}

/// Local up axis in world space (the height axis)
pub fn up_axis(t: &Transform) -> Vec3 {
    rotation(t) * Vec3::Y
}

/// Local right axis in world space (the width axis)
pub fn right_axis(t: &Transform) -> Vec3 {
    rotation(t) * Vec3::X
}

/// Local forward axis in world space (the depth/length axis)
pub fn forward_axis(t: &Transform) -> Vec3 {
    rotation(t) * Vec3::Z
}

/// Center of the base face ("surface" point)
pub fn surface_point(t: &Transform) -> Vec3 {
    position(t) - up_axis(t) * (t.scale[1] * 0.5)
}

/// The position the current pivot convention presents.
/// Storage always keeps the geometric center, so switching the convention
/// moves nothing; only this view changes.
pub fn pivot_position(t: &Transform, pivot: Pivot) -> Vec3 {
    match pivot {
        Pivot::Center => position(t),
        Pivot::Surface => surface_point(t),
    }
}

/// Write a position expressed in the current pivot convention.
pub fn set_pivot_position(t: &mut Transform, pivot: Pivot, p: Vec3) {
    let center = match pivot {
        Pivot::Center => p,
        Pivot::Surface => p + up_axis(t) * (t.scale[1] * 0.5),
    };
    set_position(t, center);
}

/// Apply a delta rotation about a fixed world point; the point keeps its
/// world position while the volume spins around it.
pub fn rotate_about(t: &mut Transform, point: Vec3, delta: Quat) {
    let new_center = point + delta * (position(t) - point);
    set_rotation(t, delta * rotation(t));
    set_position(t, new_center);
}

/// Set one extent. With pivot=Surface the base face stays fixed while the
/// height axis grows; the footprint axes scale about the center either way.
pub fn set_axis_extent(t: &mut Transform, axis: usize, extent: f32, pivot: Pivot) {
    let extent = extent.abs().max(MIN_EXTENT);
    if pivot == Pivot::Surface && axis == 1 {
        let base = surface_point(t);
        t.scale[1] = extent;
        set_position(t, base + up_axis(t) * (extent * 0.5));
    } else {
        t.scale[axis] = extent;
    }
}

/// Uniform scale by a factor, anchored at the pivot-adjusted position.
pub fn scale_uniform(t: &mut Transform, factor: f32, pivot: Pivot) {
    let factor = factor.abs().max(1e-3);
    let anchor = pivot_position(t, pivot);
    let new_scale = (scale(t) * factor).max(Vec3::splat(MIN_EXTENT));
    set_scale(t, new_scale);
    // Keep the anchor fixed
    let drift = pivot_position(t, pivot) - anchor;
    set_position(t, position(t) - drift);
}

/// Reject transforms handle math cannot operate on
/// (non-finite components, collapsed scale axis).
pub fn is_well_formed(t: &Transform) -> bool {
    let finite = t.position.iter().all(|v| v.is_finite())
        && t.rotation.iter().all(|v| v.is_finite())
        && t.scale.iter().all(|v| v.is_finite());
    finite && t.scale.iter().all(|s| *s >= MIN_EXTENT)
}

/// A volume's transform captured at gesture start. All drag math is
/// computed relative to this baseline, never frame-to-frame.
#[derive(Clone, Copy, Debug)]
pub struct TransformSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TransformSnapshot {
    pub fn capture(t: &Transform) -> Self {
        Self {
            position: position(t),
            rotation: rotation(t),
            scale: scale(t),
        }
    }

    pub fn restore(&self, t: &mut Transform) {
        set_position(t, self.position);
        set_rotation(t, self.rotation);
        set_scale(t, self.scale);
    }

    pub fn surface_point(&self) -> Vec3 {
        self.position - self.rotation * Vec3::Y * (self.scale.y * 0.5)
    }
}

/// Transient authoring state the tool keeps per volume.
/// Volumes still being created never appear here: the creation session owns
/// them until finalize, which is what keeps them out of delete/selection.
#[derive(Clone, Debug, Default)]
pub struct HandleState {
    pub is_active: bool,
    /// Seconds timestamp of the last interaction (selection tie-breaks)
    pub last_interaction: f64,
    /// Gesture-start baseline; present only while a drag is in progress
    pub snapshot: Option<TransformSnapshot>,
}

pub type HandleMap = HashMap<ObjectId, HandleState>;

/// Rebuild the handle map against the current volume set: drop entries for
/// removed volumes, add defaults for new ones. Called whenever the scene
/// version changes (undo/redo fires, volumes added or removed).
pub fn sync_handles(handles: &mut HandleMap, volumes: &[VolumeNode]) {
    handles.retain(|id, _| volumes.iter().any(|v| &v.id == id));
    for v in volumes {
        handles.entry(v.id.clone()).or_default();
    }
}

/// Make one volume the active handle and stamp its interaction time.
pub fn mark_active(handles: &mut HandleMap, id: &str, time: f64) {
    for (hid, h) in handles.iter_mut() {
        h.is_active = hid == id;
        if h.is_active {
            h.last_interaction = time;
        }
    }
}

pub fn active_id(handles: &HandleMap) -> Option<&ObjectId> {
    handles.iter().find(|(_, h)| h.is_active).map(|(id, _)| id)
}

/// Snapshot every volume at pointer-down; the whole gesture is computed
/// against these baselines.
pub fn snapshot_all(handles: &mut HandleMap, volumes: &[VolumeNode]) {
    for v in volumes {
        if let Some(h) = handles.get_mut(&v.id) {
            h.snapshot = Some(TransformSnapshot::capture(&v.transform));
        }
    }
}

pub fn clear_snapshots(handles: &mut HandleMap) {
    for h in handles.values_mut() {
        h.snapshot = None;
    }
}

/// Closest-hit pick across volumes' oriented-box surfaces.
/// Exact distance ties favor the most recently active volume.
pub fn pick_volume<'a, I>(
    ray: &Ray,
    volumes: I,
    handles: &HandleMap,
) -> Option<(&'a VolumeNode, f32)>
where
    I: IntoIterator<Item = &'a VolumeNode>,
{
    let mut best: Option<(&VolumeNode, f32)> = None;

    for v in volumes {
        let t = &v.transform;
        let Some(dist) = ray_obb(ray, position(t), rotation(t), scale(t)) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((prev, prev_dist)) => {
                if dist == prev_dist {
                    let last = |id: &str| {
                        handles.get(id).map(|h| h.last_interaction).unwrap_or(0.0)
                    };
                    last(&v.id) > last(&prev.id)
                } else {
                    dist < prev_dist
                }
            }
        };
        if better {
            best = Some((v, dist));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, pos: Vec3, extents: Vec3) -> VolumeNode {
        let mut t = Transform::new();
        set_position(&mut t, pos);
        set_scale(&mut t, extents);
        VolumeNode {
            id: id.into(),
            name: id.into(),
            transform: t,
        }
    }

    #[test]
    fn test_pivot_round_trip_is_exact() {
        let mut t = Transform::new();
        set_position(&mut t, Vec3::new(1.5, 2.25, -3.0));
        set_rotation(&mut t, Quat::from_rotation_y(0.7));
        set_scale(&mut t, Vec3::new(2.0, 3.0, 4.0));
        let before = t.clone();

        // Switching the convention rewrites nothing in storage
        let center_view = pivot_position(&t, Pivot::Center);
        let surface_view = pivot_position(&t, Pivot::Surface);
        assert_eq!(t, before);
        assert!((center_view - surface_view - up_axis(&t) * 1.5).length() < 1e-6);

        // Writing back the presented position is the identity
        set_pivot_position(&mut t, Pivot::Surface, surface_view);
        assert_eq!(t.position, before.position);
    }

    #[test]
    fn test_rotate_about_keeps_point_fixed() {
        let mut t = Transform::new();
        set_position(&mut t, Vec3::new(0.0, 1.0, 0.0));
        set_scale(&mut t, Vec3::new(1.0, 2.0, 1.0));
        let surface = surface_point(&t);

        rotate_about(&mut t, surface, Quat::from_rotation_y(1.2));
        assert!((surface_point(&t) - surface).length() < 1e-5);

        rotate_about(&mut t, surface, Quat::from_rotation_x(0.4));
        assert!((surface_point(&t) - surface).length() < 1e-4);
    }

    #[test]
    fn test_set_height_surface_pivot_keeps_base() {
        let mut t = Transform::new();
        set_position(&mut t, Vec3::new(2.0, 1.0, 0.0));
        set_scale(&mut t, Vec3::new(1.0, 2.0, 1.0));
        let base = surface_point(&t);

        set_axis_extent(&mut t, 1, 5.0, Pivot::Surface);
        assert_eq!(t.scale[1], 5.0);
        assert!((surface_point(&t) - base).length() < 1e-5);
        assert!((position(&t) - (base + Vec3::Y * 2.5)).length() < 1e-5);
    }

    #[test]
    fn test_set_height_center_pivot_keeps_center() {
        let mut t = Transform::new();
        set_position(&mut t, Vec3::new(2.0, 1.0, 0.0));
        set_scale(&mut t, Vec3::new(1.0, 2.0, 1.0));

        set_axis_extent(&mut t, 1, 5.0, Pivot::Center);
        assert_eq!(position(&t), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_scale_uniform_surface_anchor() {
        let mut t = Transform::new();
        set_position(&mut t, Vec3::new(0.0, 1.0, 0.0));
        set_scale(&mut t, Vec3::new(2.0, 2.0, 2.0));
        let base = surface_point(&t);

        scale_uniform(&mut t, 2.0, Pivot::Surface);
        assert_eq!(t.scale, [4.0, 4.0, 4.0]);
        assert!((surface_point(&t) - base).length() < 1e-5);
    }

    #[test]
    fn test_well_formed_rejects_bad_transforms() {
        let mut t = Transform::new();
        assert!(is_well_formed(&t));
        t.scale[2] = 0.0;
        assert!(!is_well_formed(&t));
        t.scale[2] = f32::NAN;
        assert!(!is_well_formed(&t));
    }

    #[test]
    fn test_pick_closest() {
        let volumes = vec![
            node("near", Vec3::new(0.0, 0.0, 2.0), Vec3::splat(1.0)),
            node("far", Vec3::new(0.0, 0.0, 6.0), Vec3::splat(1.0)),
        ];
        let mut handles = HandleMap::new();
        sync_handles(&mut handles, &volumes);

        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -2.0),
            direction: Vec3::Z,
        };
        let (hit, _) = pick_volume(&ray, &volumes, &handles).unwrap();
        assert_eq!(hit.id, "near");
    }

    #[test]
    fn test_pick_tie_breaks_most_recent() {
        // Two coincident boxes: identical hit distances
        let volumes = vec![
            node("a", Vec3::new(0.0, 0.0, 2.0), Vec3::splat(1.0)),
            node("b", Vec3::new(0.0, 0.0, 2.0), Vec3::splat(1.0)),
        ];
        let mut handles = HandleMap::new();
        sync_handles(&mut handles, &volumes);
        mark_active(&mut handles, "b", 42.0);

        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -2.0),
            direction: Vec3::Z,
        };
        let (hit, _) = pick_volume(&ray, &volumes, &handles).unwrap();
        assert_eq!(hit.id, "b");

        mark_active(&mut handles, "a", 43.0);
        let (hit, _) = pick_volume(&ray, &volumes, &handles).unwrap();
        assert_eq!(hit.id, "a");
    }

    #[test]
    fn test_sync_handles_prunes_and_adds() {
        let volumes = vec![node("a", Vec3::ZERO, Vec3::ONE)];
        let mut handles = HandleMap::new();
        handles.insert("gone".into(), HandleState::default());
        sync_handles(&mut handles, &volumes);
        assert!(handles.contains_key("a"));
        assert!(!handles.contains_key("gone"));
    }
}
