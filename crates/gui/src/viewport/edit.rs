//! Edit-mode interaction: drives the handle seam against pointer input.
//!
//! One drag gesture owns the interaction from pointer-down to release; all
//! transform writes are computed from the gesture-start snapshot, never from
//! the previous frame.

use std::collections::HashSet;

use glam::{Quat, Vec3};
use shared::ObjectId;

use crate::state::settings::Pivot;
use crate::state::SceneState;

use super::camera::ArcBallCamera;
use super::geometry::{ray_plane, Plane};
use super::handles::{
    axis_drag_delta, axis_hit_test, footprint_handle_hit, footprint_handles, ring_drag_angle,
    ring_hit_test, uniform_tip_hit_test, HandleAxis, HandleTool, AXIS_LENGTH, RING_RADIUS,
};
use super::volume::{
    self, active_id, clear_snapshots, mark_active, pick_volume, snapshot_all, HandleMap,
    TransformSnapshot, MIN_EXTENT,
};

/// Granularity position deltas are rounded to when grid snapping is off
pub const MIN_DRAG_STEP: f32 = 0.001;

/// What a drag gesture is manipulating
#[derive(Debug, Clone, Copy)]
pub enum DragKind {
    MoveAxis(HandleAxis),
    RotateRing(HandleAxis),
    ScaleAxis(HandleAxis),
    ScaleUniform,
    FootprintEdge { local_axis: usize, world_dir: Vec3 },
    FootprintMove,
}

/// Active drag gesture state. The transform baseline lives in the handle
/// map snapshots taken at pointer-down.
pub struct EditDrag {
    pub volume_id: ObjectId,
    pub kind: DragKind,
    pub start_pointer: egui::Pos2,
    /// Plane hit under the pointer at drag start (footprint gestures)
    pub start_hit: Option<Vec3>,
}

/// Per-frame parameters of the edit pass
pub struct EditParams<'a> {
    pub camera: &'a ArcBallCamera,
    pub rect: egui::Rect,
    pub tool: HandleTool,
    pub pivot: Pivot,
    pub grid_snap: bool,
    pub grid_step: f32,
    /// Seconds timestamp used to stamp interactions
    pub time: f64,
}

impl EditParams<'_> {
    fn step(&self) -> f32 {
        if self.grid_snap {
            self.grid_step
        } else {
            MIN_DRAG_STEP
        }
    }
}

fn round_step(v: f32, step: f32) -> f32 {
    (v / step).round() * step
}

fn snap_pivot(snap: &TransformSnapshot, pivot: Pivot) -> Vec3 {
    match pivot {
        Pivot::Center => snap.position,
        Pivot::Surface => snap.surface_point(),
    }
}

/// Run the Edit-mode interaction for this frame.
/// Returns a warning to surface near the cursor when the active volume's
/// transform cannot be operated on.
pub fn run(
    response: &egui::Response,
    params: &EditParams,
    scene: &mut SceneState,
    handles_map: &mut HandleMap,
    visible: &HashSet<ObjectId>,
    drag: &mut Option<EditDrag>,
) -> Option<String> {
    // ── Ongoing gesture ─────────────────────────────────────
    if drag.is_some() {
        let released =
            response.drag_stopped() || !response.dragged_by(egui::PointerButton::Primary);
        if let (Some(d), Some(pos)) = (drag.as_ref(), response.interact_pointer_pos()) {
            apply_drag(d, pos, params, scene, handles_map);
        }
        if released {
            *drag = None;
            clear_snapshots(handles_map);
        }
        return None;
    }

    // ── Gesture start ───────────────────────────────────────
    if !response.drag_started_by(egui::PointerButton::Primary) {
        return None;
    }
    let Some(pos) = response.interact_pointer_pos() else {
        return None;
    };
    let ray = params.camera.screen_ray(pos, params.rect);

    // The active volume's handles get first claim on the event
    if let Some(active) = active_id(handles_map).cloned() {
        if visible.contains(&active) {
            if let Some(node) = scene.volume(&active) {
                if !volume::is_well_formed(&node.transform) {
                    return Some("Volume transform is degenerate; handles disabled".to_string());
                }

                let t = &node.transform;
                let origin = volume::pivot_position(t, params.pivot);
                let rot = volume::rotation(t);

                let kind = match params.tool {
                    HandleTool::Move => {
                        axis_hit_test(&ray, origin, rot, AXIS_LENGTH).map(DragKind::MoveAxis)
                    }
                    HandleTool::Rotate => {
                        ring_hit_test(&ray, origin, rot, RING_RADIUS).map(DragKind::RotateRing)
                    }
                    HandleTool::Scale => {
                        if uniform_tip_hit_test(&ray, origin) {
                            Some(DragKind::ScaleUniform)
                        } else {
                            axis_hit_test(&ray, origin, rot, AXIS_LENGTH).map(DragKind::ScaleAxis)
                        }
                    }
                    HandleTool::Rect => {
                        let base = volume::surface_point(t);
                        let fh = footprint_handles(base, rot, volume::scale(t));
                        footprint_handle_hit(params.camera, params.rect, pos, &fh).map(|i| {
                            DragKind::FootprintEdge {
                                local_axis: fh[i].local_axis,
                                world_dir: fh[i].world_dir,
                            }
                        })
                    }
                };

                if let Some(kind) = kind {
                    start_drag(active, kind, pos, params, scene, handles_map, drag);
                    return None;
                }
            }
        }
    }

    // No handle owns the event: arbitrate across visible volume surfaces
    let picked = pick_volume(
        &ray,
        scene.scene.volumes.iter().filter(|v| visible.contains(&v.id)),
        handles_map,
    )
    .map(|(v, _)| v.id.clone());

    if let Some(id) = picked {
        mark_active(handles_map, &id, params.time);
        if params.tool == HandleTool::Rect {
            // The rect move sub-handle: dragging the body moves the footprint
            start_drag(id, DragKind::FootprintMove, pos, params, scene, handles_map, drag);
        }
    }
    None
}

fn start_drag(
    id: ObjectId,
    kind: DragKind,
    pos: egui::Pos2,
    params: &EditParams,
    scene: &mut SceneState,
    handles_map: &mut HandleMap,
    drag: &mut Option<EditDrag>,
) {
    let Some(node) = scene.volume(&id) else {
        return;
    };
    let snapshot = TransformSnapshot::capture(&node.transform);

    // Footprint gestures need the pointer's base-plane hit as a baseline
    let start_hit = match kind {
        DragKind::FootprintEdge { .. } | DragKind::FootprintMove => {
            let up = snapshot.rotation * Vec3::Y;
            let anchor = match kind {
                DragKind::FootprintEdge { .. } => snapshot.surface_point(),
                _ => snapshot.position,
            };
            let ray = params.camera.screen_ray(pos, params.rect);
            let plane = Plane::from_point_normal(anchor, up);
            match ray_plane(&ray, &plane) {
                Some(t) => Some(ray.point_at(t)),
                // No solvable baseline: skip the gesture this frame
                None => return,
            }
        }
        _ => None,
    };

    scene.begin_change();
    // Pointer-down: every volume snapshots; the whole gesture is computed
    // against these baselines
    snapshot_all(handles_map, &scene.scene.volumes);
    mark_active(handles_map, &id, params.time);

    *drag = Some(EditDrag {
        volume_id: id,
        kind,
        start_pointer: pos,
        start_hit,
    });
}

fn apply_drag(
    d: &EditDrag,
    pos: egui::Pos2,
    params: &EditParams,
    scene: &mut SceneState,
    handles_map: &HandleMap,
) {
    let pivot = params.pivot;
    let step = params.step();
    let Some(snap) = handles_map.get(&d.volume_id).and_then(|h| h.snapshot) else {
        return;
    };
    let screen_delta = pos - d.start_pointer;

    let Some(node) = scene.volume_mut(&d.volume_id) else {
        return;
    };
    let t = &mut node.transform;

    match d.kind {
        DragKind::MoveAxis(axis) => {
            let dir = axis.world_dir(snap.rotation);
            let origin = snap_pivot(&snap, pivot);
            let moved = round_step(
                axis_drag_delta(params.camera, origin, dir, screen_delta, params.rect),
                step,
            );
            snap.restore(t);
            volume::set_pivot_position(t, pivot, origin + dir * moved);
        }

        DragKind::RotateRing(axis) => {
            let axis_dir = axis.world_dir(snap.rotation);
            let origin = snap_pivot(&snap, pivot);
            let start_ray = params.camera.screen_ray(d.start_pointer, params.rect);
            let ray = params.camera.screen_ray(pos, params.rect);
            if let Some(angle) = ring_drag_angle(origin, axis_dir, &start_ray, &ray) {
                let delta = Quat::from_axis_angle(axis_dir.normalize(), angle);
                match pivot {
                    Pivot::Center => {
                        volume::set_rotation(t, delta * snap.rotation);
                        volume::set_position(t, snap.position);
                    }
                    Pivot::Surface => {
                        // Minimal-angle delta about the surface point: the
                        // point stays fixed while the volume spins
                        let surf = snap.surface_point();
                        volume::set_rotation(t, delta * snap.rotation);
                        volume::set_position(t, surf + delta * (snap.position - surf));
                    }
                }
            }
        }

        DragKind::ScaleAxis(axis) => {
            let i = axis.index();
            let dir = axis.world_dir(snap.rotation);
            let origin = snap_pivot(&snap, pivot);
            let grown = round_step(
                axis_drag_delta(params.camera, origin, dir, screen_delta, params.rect),
                step,
            );
            let extent = (snap.scale[i] + grown).max(MIN_EXTENT);
            snap.restore(t);
            volume::set_axis_extent(t, i, extent, pivot);
        }

        DragKind::ScaleUniform => {
            // Uniform multi-axis scaling, anchored at the pivot
            let factor = (1.0 - screen_delta.y * 0.01).max(0.01);
            snap.restore(t);
            volume::scale_uniform(t, factor, pivot);
        }

        DragKind::FootprintEdge { local_axis, world_dir } => {
            let up = snap.rotation * Vec3::Y;
            let plane = Plane::from_point_normal(snap.surface_point(), up);
            let ray = params.camera.screen_ray(pos, params.rect);
            let (Some(start_hit), Some(pt)) = (d.start_hit, ray_plane(&ray, &plane)) else {
                return;
            };
            let hit = ray.point_at(pt);
            let e = round_step((hit - start_hit).dot(world_dir), step);
            let extent = (snap.scale[local_axis] + e).max(MIN_EXTENT);
            // The dragged edge follows the cursor, the opposite edge stays
            let applied = extent - snap.scale[local_axis];
            snap.restore(t);
            t.scale[local_axis] = extent;
            volume::set_position(t, snap.position + world_dir * (applied * 0.5));
        }

        DragKind::FootprintMove => {
            let up = snap.rotation * Vec3::Y;
            let plane = Plane::from_point_normal(snap.position, up);
            let ray = params.camera.screen_ray(pos, params.rect);
            let (Some(start_hit), Some(pt)) = (d.start_hit, ray_plane(&ray, &plane)) else {
                return;
            };
            let delta = ray.point_at(pt) - start_hit;
            let rounded = Vec3::new(
                round_step(delta.x, step),
                round_step(delta.y, step),
                round_step(delta.z, step),
            );
            snap.restore(t);
            volume::set_position(t, snap.position + rounded);
        }
    }

    scene.notify_mutated();
}
