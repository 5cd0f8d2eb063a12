//! Manipulation handle primitives for Edit mode.
//!
//! This is the documented seam the interaction layer drives: axis-line and
//! rotation-ring hit tests against the cursor ray, screen-projected drag
//! deltas, and the combined footprint (rect) sub-handles. All drag math is
//! expressed relative to gesture-start values supplied by the caller.

use glam::{Quat, Vec3};

use super::camera::ArcBallCamera;
use super::geometry::{nearest_canonical_frame, ray_plane, ray_segment_distance, Plane, Ray};

/// The currently selected manipulation tool within Edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleTool {
    Move,
    Rotate,
    Scale,
    Rect,
}

impl HandleTool {
    pub fn label(&self) -> &'static str {
        match self {
            HandleTool::Move => "Move",
            HandleTool::Rotate => "Rotate",
            HandleTool::Scale => "Scale",
            HandleTool::Rect => "Rect",
        }
    }
}

/// Which local axis a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleAxis {
    X,
    Y,
    Z,
}

impl HandleAxis {
    pub const ALL: [HandleAxis; 3] = [HandleAxis::X, HandleAxis::Y, HandleAxis::Z];

    pub fn index(self) -> usize {
        match self {
            HandleAxis::X => 0,
            HandleAxis::Y => 1,
            HandleAxis::Z => 2,
        }
    }

    /// World direction of this axis under the given orientation
    pub fn world_dir(self, rotation: Quat) -> Vec3 {
        match self {
            HandleAxis::X => rotation * Vec3::X,
            HandleAxis::Y => rotation * Vec3::Y,
            HandleAxis::Z => rotation * Vec3::Z,
        }
    }
}

pub const AXIS_LENGTH: f32 = 1.6;
pub const RING_RADIUS: f32 = 1.2;
pub const UNIFORM_TIP_SIZE: f32 = 0.2;
const HIT_THRESHOLD: f32 = 0.15;
/// Screen-space pick radius for footprint sub-handles (pixels)
const FOOTPRINT_PICK_RADIUS: f32 = 10.0;

/// Test if a ray hits one of the three oriented axis handles.
/// Returns the axis whose line the ray passes closest to, within threshold.
pub fn axis_hit_test(
    ray: &Ray,
    origin: Vec3,
    rotation: Quat,
    axis_length: f32,
) -> Option<HandleAxis> {
    let mut best: Option<(HandleAxis, f32)> = None;

    for axis in HandleAxis::ALL {
        let dir = axis.world_dir(rotation);
        let dist = ray_segment_distance(ray, origin, origin + dir * axis_length);
        if dist < HIT_THRESHOLD && best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((axis, dist));
        }
    }

    best.map(|(axis, _)| axis)
}

/// Test if a ray hits the uniform-scale tip at the handle origin.
pub fn uniform_tip_hit_test(ray: &Ray, origin: Vec3) -> bool {
    // Distance from the origin to the ray
    let t = (origin - ray.origin).dot(ray.direction).max(0.0);
    (ray.point_at(t) - origin).length() < UNIFORM_TIP_SIZE
}

/// Test if a ray hits one of the three rotation rings.
/// A ring lies in the plane perpendicular to its axis at the given radius.
pub fn ring_hit_test(ray: &Ray, origin: Vec3, rotation: Quat, radius: f32) -> Option<HandleAxis> {
    let mut best: Option<(HandleAxis, f32)> = None;

    for axis in HandleAxis::ALL {
        let normal = axis.world_dir(rotation);
        let plane = Plane::from_point_normal(origin, normal);
        let Some(t) = ray_plane(ray, &plane) else {
            continue;
        };
        let on_plane = ray.point_at(t);
        let dist = ((on_plane - origin).length() - radius).abs();
        if dist < HIT_THRESHOLD && best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((axis, dist));
        }
    }

    best.map(|(axis, _)| axis)
}

/// World-space drag distance along an arbitrary axis direction.
/// Projects the screen-space drag delta onto the screen-space image of the
/// axis, then converts pixels back to world units.
pub fn axis_drag_delta(
    camera: &ArcBallCamera,
    origin: Vec3,
    axis_dir: Vec3,
    screen_delta: egui::Vec2,
    rect: egui::Rect,
) -> f32 {
    let p0 = camera.project(origin, rect);
    let p1 = camera.project(origin + axis_dir, rect);

    let (Some(screen_p0), Some(screen_p1)) = (p0, p1) else {
        return 0.0;
    };

    let screen_axis = egui::vec2(screen_p1.x - screen_p0.x, screen_p1.y - screen_p0.y);
    let screen_axis_len = screen_axis.length();

    if screen_axis_len < 1.0 {
        return 0.0;
    }

    let projected = screen_delta.dot(screen_axis / screen_axis_len);

    // 1 world unit = screen_axis_len pixels
    projected / screen_axis_len
}

/// Signed rotation angle around `axis_dir` between two cursor rays,
/// measured in the rotation plane through `origin`.
pub fn ring_drag_angle(origin: Vec3, axis_dir: Vec3, start_ray: &Ray, ray: &Ray) -> Option<f32> {
    let plane = Plane::from_point_normal(origin, axis_dir);
    let a = (start_ray.point_at(ray_plane(start_ray, &plane)?) - origin).try_normalize()?;
    let b = (ray.point_at(ray_plane(ray, &plane)?) - origin).try_normalize()?;
    let sin = a.cross(b).dot(axis_dir.normalize());
    let cos = a.dot(b).clamp(-1.0, 1.0);
    Some(sin.atan2(cos))
}

/// One footprint sub-handle: the midpoint of a base-rectangle edge.
/// `local_axis` is the index of the local scale axis this edge controls
/// (0 or 2); `world_dir` points outward from the base center.
#[derive(Debug, Clone, Copy)]
pub struct FootprintHandle {
    pub local_axis: usize,
    pub world_dir: Vec3,
    pub point: Vec3,
}

/// The four edge sub-handles of the combined rect handle, expressed in the
/// canonical orthogonal frame closest to the current rotation so edges keep
/// a stable meaning after arbitrary rotations.
pub fn footprint_handles(
    base_center: Vec3,
    rotation: Quat,
    scale: Vec3,
) -> Vec<FootprintHandle> {
    let frame = nearest_canonical_frame(rotation);
    let mut handles = Vec::with_capacity(4);

    for frame_dir in [frame.x_axis, frame.z_axis] {
        // Which footprint axis of the volume this frame direction labels
        let dx = (rotation * Vec3::X).dot(frame_dir).abs();
        let dz = (rotation * Vec3::Z).dot(frame_dir).abs();
        let local_axis = if dx >= dz { 0 } else { 2 };
        let local_dir = if local_axis == 0 {
            rotation * Vec3::X
        } else {
            rotation * Vec3::Z
        };
        // Point the handle direction along the volume's own edge normal
        let aligned = if local_dir.dot(frame_dir) >= 0.0 {
            local_dir
        } else {
            -local_dir
        };

        for sign in [1.0_f32, -1.0] {
            let dir = aligned * sign;
            handles.push(FootprintHandle {
                local_axis,
                world_dir: dir,
                point: base_center + dir * (scale[local_axis] * 0.5),
            });
        }
    }

    handles
}

/// Screen-space pick of a footprint sub-handle.
pub fn footprint_handle_hit(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    pointer: egui::Pos2,
    handles: &[FootprintHandle],
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, h) in handles.iter().enumerate() {
        let Some(screen) = camera.project(h.point, rect) else {
            continue;
        };
        let d = screen.distance(pointer);
        if d < FOOTPRINT_PICK_RADIUS && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}
