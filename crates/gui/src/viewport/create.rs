//! Multi-click volume creation: the Create-mode state machine.
//!
//! A volume is built in four stages driven by pointer events:
//! PendingClick places the anchor on the construction plane, SetLength drags
//! the depth axis out, SetWidth the width, SetHeight the height. The
//! in-progress volume is owned by the session and only handed to the scene
//! at finalize; canceling at any stage simply drops it.

use glam::{Quat, Vec3};
use shared::{Transform, VolumeNode};

use super::geometry::{
    flatten_onto_plane, look_rotation, ray_obb, ray_plane, snap_to_plane_axes, Plane, Ray,
};
use super::volume;

/// Minimum length/width/height a sizing stage must measure before its click
/// is allowed to advance the build.
pub const MIN_SIZE: f32 = 0.001;

/// Placement distance along the ray when nothing else is hit
const FALLBACK_DISTANCE: f32 = 10.0;

/// Create-mode sub-stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateStage {
    #[default]
    PendingClick,
    SetLength,
    SetWidth,
    SetHeight,
}

impl CreateStage {
    pub fn label(&self) -> &'static str {
        match self {
            CreateStage::PendingClick => "Place",
            CreateStage::SetLength => "Length",
            CreateStage::SetWidth => "Width",
            CreateStage::SetHeight => "Height",
        }
    }
}

/// User-placed construction plane overriding world-geometry raycasts
#[derive(Debug, Clone, Copy)]
pub struct RefPlane {
    pub origin: Vec3,
    pub rotation: Quat,
}

/// Hit point and orientation under the cursor while waiting for the first
/// click; the renderer draws the placement gizmo here.
#[derive(Debug, Clone, Copy)]
pub struct PlacementHover {
    pub point: Vec3,
    pub rotation: Quat,
}

/// Transient state of an in-progress volume build
pub struct CreationSession {
    /// The volume being built; enters the scene only at finalize
    pub volume: VolumeNode,
    /// Orientation of the construction plane (local Y = plane up)
    pub orientation: Quat,
    /// First click point (anchor of the length stage)
    pub clicked_point: Vec3,
    /// Click point of the previous stage (anchor of the current one)
    pub previous_point: Vec3,
    /// Volume center at entry of the current stage
    anchor_position: Vec3,
    /// Magnitude measured by the current stage this frame
    measured: f32,
    /// Plane hit of the current frame, if any
    frame_hit: Option<Vec3>,
}

/// Per-frame pointer input, sampled once from the host event stream
#[derive(Default)]
pub struct CreateInput {
    pub ray: Option<Ray>,
    pub primary_clicked: bool,
    /// Right-click or Escape
    pub cancel: bool,
    /// Reference-plane modifier (Shift) held during the click
    pub plane_modifier: bool,
    /// Grow symmetrically about the stage anchor (Alt)
    pub symmetric: bool,
    /// Snap the length direction to the plane's cardinal axes (Ctrl/Cmd)
    pub axis_snap: bool,
}

/// Read-only frame context the machine samples from the host
pub struct CreateContext<'a> {
    /// "Up" of the chosen creation alignment
    pub alignment_up: Vec3,
    /// Camera view direction
    pub camera_forward: Vec3,
    /// Orthographic top-down view (height plane needs special casing)
    pub top_down: bool,
    /// Existing volumes, used as world geometry for placement raycasts
    pub volumes: &'a [VolumeNode],
}

/// The Create-mode state machine
#[derive(Default)]
pub struct CreateMachine {
    pub stage: CreateStage,
    pub session: Option<CreationSession>,
    pub reference_plane: Option<RefPlane>,
    pub hover: Option<PlacementHover>,
    spawned: u64,
}

impl CreateMachine {
    /// Cancel any in-progress build and drop the session volume.
    /// The volume set is untouched, as if the gesture never happened.
    pub fn cancel_session(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("Canceled volume creation at stage {:?}", self.stage);
        }
        self.stage = CreateStage::PendingClick;
    }

    /// Full reset on mode change: session and reference plane both go.
    pub fn reset(&mut self) {
        self.cancel_session();
        self.reference_plane = None;
        self.hover = None;
    }

    /// Advance the machine by one frame of pointer input.
    /// Returns the finished volume when the final click lands.
    pub fn update(&mut self, input: &CreateInput, ctx: &CreateContext) -> Option<VolumeNode> {
        match self.stage {
            CreateStage::PendingClick => {
                self.pending_click(input, ctx);
                None
            }
            CreateStage::SetLength => {
                self.set_length(input, ctx);
                None
            }
            CreateStage::SetWidth => {
                self.set_width(input, ctx);
                None
            }
            CreateStage::SetHeight => self.set_height(input, ctx),
        }
    }

    fn pending_click(&mut self, input: &CreateInput, ctx: &CreateContext) {
        self.hover = self.placement_hover(input.ray.as_ref(), ctx);

        if input.cancel {
            if self.reference_plane.take().is_some() {
                tracing::info!("Reference plane disabled");
            }
            return;
        }

        let Some(hover) = self.hover else {
            return;
        };

        if input.primary_clicked {
            if input.plane_modifier {
                self.reference_plane = Some(RefPlane {
                    origin: hover.point,
                    rotation: hover.rotation,
                });
                tracing::info!("Reference plane placed at {:?}", hover.point);
                return;
            }

            self.spawned += 1;
            let mut transform = Transform::new();
            volume::set_position(&mut transform, hover.point);
            volume::set_rotation(&mut transform, hover.rotation);
            volume::set_scale(&mut transform, Vec3::ZERO);

            self.session = Some(CreationSession {
                volume: VolumeNode {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: format!("Volume {}", self.spawned),
                    transform,
                },
                orientation: hover.rotation,
                clicked_point: hover.point,
                previous_point: hover.point,
                anchor_position: hover.point,
                measured: 0.0,
                frame_hit: None,
            });
            self.stage = CreateStage::SetLength;
        }
    }

    /// Where the cursor lands: reference plane first, else world geometry
    /// (existing volume surfaces, then the ground plane), else a point a
    /// fixed distance along the ray.
    fn placement_hover(&self, ray: Option<&Ray>, ctx: &CreateContext) -> Option<PlacementHover> {
        let ray = ray?;
        let aligned = Quat::from_rotation_arc(Vec3::Y, ctx.alignment_up);

        if let Some(rp) = &self.reference_plane {
            let plane = Plane::from_point_normal(rp.origin, rp.rotation * Vec3::Y);
            let t = ray_plane(ray, &plane)?;
            return Some(PlacementHover {
                point: ray.point_at(t),
                rotation: rp.rotation,
            });
        }

        let mut nearest: Option<f32> = None;
        for v in ctx.volumes {
            let t = &v.transform;
            if let Some(d) = ray_obb(
                ray,
                volume::position(t),
                volume::rotation(t),
                volume::scale(t),
            ) {
                if nearest.is_none_or(|prev| d < prev) {
                    nearest = Some(d);
                }
            }
        }
        if let Some(t) = nearest {
            return Some(PlacementHover {
                point: ray.point_at(t),
                rotation: aligned,
            });
        }

        let ground = Plane::from_point_normal(Vec3::ZERO, ctx.alignment_up);
        if let Some(t) = ray_plane(ray, &ground) {
            return Some(PlacementHover {
                point: ray.point_at(t),
                rotation: aligned,
            });
        }

        Some(PlacementHover {
            point: ray.point_at(FALLBACK_DISTANCE),
            rotation: aligned,
        })
    }

    fn set_length(&mut self, input: &CreateInput, _ctx: &CreateContext) {
        if input.cancel {
            self.cancel_session();
            return;
        }
        let Some(session) = self.session.as_mut() else {
            self.stage = CreateStage::PendingClick;
            return;
        };

        let up = session.orientation * Vec3::Y;
        let plane = Plane::from_point_normal(session.clicked_point, up);
        session.frame_hit = None;

        if let Some(ray) = &input.ray {
            if let Some(t) = ray_plane(ray, &plane) {
                let hit = ray.point_at(t);
                let mut vec = hit - session.clicked_point;
                if input.axis_snap {
                    vec = snap_to_plane_axes(
                        vec,
                        session.orientation * Vec3::X,
                        session.orientation * Vec3::Z,
                    );
                }

                let len = vec.length();
                session.measured = len;
                session.frame_hit = Some(session.clicked_point + vec);

                if len > 1e-6 {
                    let dir = vec / len;
                    if let Some(rot) = look_rotation(dir, up) {
                        let tf = &mut session.volume.transform;
                        volume::set_rotation(tf, rot);
                        if input.symmetric {
                            tf.scale[2] = len * 2.0;
                            volume::set_position(tf, session.clicked_point);
                        } else {
                            tf.scale[2] = len;
                            volume::set_position(tf, session.clicked_point + dir * (len * 0.5));
                        }
                    }
                }
            }
        }

        if input.primary_clicked {
            if session.measured >= MIN_SIZE {
                if let Some(hit) = session.frame_hit {
                    session.previous_point = hit;
                    session.anchor_position = volume::position(&session.volume.transform);
                    self.stage = CreateStage::SetWidth;
                }
            } else {
                self.cancel_session();
            }
        }
    }

    fn set_width(&mut self, input: &CreateInput, _ctx: &CreateContext) {
        if input.cancel {
            self.cancel_session();
            return;
        }
        let Some(session) = self.session.as_mut() else {
            self.stage = CreateStage::PendingClick;
            return;
        };

        let up = session.orientation * Vec3::Y;
        let plane = Plane::from_point_normal(session.previous_point, up);
        session.frame_hit = None;

        if let Some(ray) = &input.ray {
            if let Some(t) = ray_plane(ray, &plane) {
                let hit = ray.point_at(t);
                let right = volume::right_axis(&session.volume.transform);
                let w = (hit - session.previous_point).dot(right);

                session.measured = w.abs();
                session.frame_hit = Some(hit);

                let tf = &mut session.volume.transform;
                if input.symmetric {
                    tf.scale[0] = w.abs() * 2.0;
                    volume::set_position(tf, session.anchor_position);
                } else {
                    tf.scale[0] = w.abs();
                    volume::set_position(tf, session.anchor_position + right * (w * 0.5));
                }
            }
        }

        if input.primary_clicked {
            if session.measured >= MIN_SIZE {
                if let Some(hit) = session.frame_hit {
                    session.previous_point = hit;
                    session.anchor_position = volume::position(&session.volume.transform);
                    self.stage = CreateStage::SetHeight;
                }
            } else {
                self.cancel_session();
            }
        }
    }

    fn set_height(&mut self, input: &CreateInput, ctx: &CreateContext) -> Option<VolumeNode> {
        if input.cancel {
            self.cancel_session();
            return None;
        }
        let Some(session) = self.session.as_mut() else {
            self.stage = CreateStage::PendingClick;
            return None;
        };

        let up = session.orientation * Vec3::Y;
        let fwd = volume::forward_axis(&session.volume.transform);

        // Measurement-plane normal: camera forward flattened to the
        // alignment plane, falling back to the volume's own forward axis.
        // Straight-down orthographic views get a normal tilted toward the
        // up axis so the plane is never parallel to the pick ray.
        let normal = if ctx.top_down {
            (fwd + up).normalize()
        } else if let Some(flat) = flatten_onto_plane(ctx.camera_forward, up) {
            flat
        } else {
            fwd
        };

        let plane = Plane::from_point_normal(session.previous_point, normal);
        session.frame_hit = None;

        if let Some(ray) = &input.ray {
            if let Some(t) = ray_plane(ray, &plane) {
                let hit = ray.point_at(t);
                let h = (hit - session.previous_point).dot(up);

                session.measured = h.abs();
                session.frame_hit = Some(hit);

                let tf = &mut session.volume.transform;
                if input.symmetric {
                    tf.scale[1] = h.abs() * 2.0;
                    volume::set_position(tf, session.anchor_position);
                } else {
                    tf.scale[1] = h.abs();
                    volume::set_position(tf, session.anchor_position + up * (h * 0.5));
                }
            }
        }

        if input.primary_clicked {
            if session.measured >= MIN_SIZE {
                self.stage = CreateStage::PendingClick;
                if let Some(mut session) = self.session.take() {
                    session.volume.transform.normalize_scale();
                    tracing::info!(
                        "Finalized volume {} scale {:?}",
                        session.volume.name,
                        session.volume.transform.scale
                    );
                    return Some(session.volume);
                }
            } else {
                self.cancel_session();
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, 10.0, z),
            direction: Vec3::NEG_Y,
        }
    }

    fn ctx(volumes: &[VolumeNode]) -> CreateContext<'_> {
        CreateContext {
            alignment_up: Vec3::Y,
            // Looking at the scene from the front, slightly above
            camera_forward: Vec3::new(0.0, -0.6, -0.8).normalize(),
            top_down: false,
            volumes,
        }
    }

    fn click(ray: Ray) -> CreateInput {
        CreateInput {
            ray: Some(ray),
            primary_clicked: true,
            ..Default::default()
        }
    }

    fn hover(ray: Ray) -> CreateInput {
        CreateInput {
            ray: Some(ray),
            ..Default::default()
        }
    }

    /// Drive the machine through place + length stages: anchor at origin,
    /// length 2 along +Z.
    fn build_to_width(machine: &mut CreateMachine) {
        let volumes = vec![];
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));
        assert_eq!(machine.stage, CreateStage::SetLength);
        machine.update(&click(down_ray(0.0, 2.0)), &ctx(&volumes));
        assert_eq!(machine.stage, CreateStage::SetWidth);
    }

    #[test]
    fn test_length_stage_scale_and_midpoint() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));
        machine.update(&hover(down_ray(0.0, 2.0)), &ctx(&volumes));

        let session = machine.session.as_ref().unwrap();
        let tf = &session.volume.transform;
        assert!((tf.scale[2] - 2.0).abs() < 1e-5);
        assert!((volume::position(tf) - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        // Forward axis equals the recorded length direction
        assert!((volume::forward_axis(tf) - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_length_stage_symmetric_doubles_about_anchor() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));

        let mut input = hover(down_ray(0.0, 2.0));
        input.symmetric = true;
        machine.update(&input, &ctx(&volumes));

        let tf = &machine.session.as_ref().unwrap().volume.transform;
        assert!((tf.scale[2] - 4.0).abs() < 1e-5);
        assert!(volume::position(tf).length() < 1e-5);
    }

    #[test]
    fn test_full_sequence_finalizes_measured_extents() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        build_to_width(&mut machine);

        // Width: one unit along the volume's right axis (world +X)
        let done = machine.update(&click(down_ray(1.0, 2.0)), &ctx(&volumes));
        assert!(done.is_none());
        assert_eq!(machine.stage, CreateStage::SetHeight);

        // Height: aim at the vertical measurement plane through (1, 0, 2)
        let height_ray = Ray {
            origin: Vec3::new(1.0, 3.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        let node = machine
            .update(&click(height_ray), &ctx(&volumes))
            .expect("final click finalizes");

        assert_eq!(machine.stage, CreateStage::PendingClick);
        assert!(machine.session.is_none());

        let tf = &node.transform;
        assert!((tf.scale[0] - 1.0).abs() < 1e-4, "width {:?}", tf.scale);
        assert!((tf.scale[1] - 3.0).abs() < 1e-3, "height {:?}", tf.scale);
        assert!((tf.scale[2] - 2.0).abs() < 1e-4, "length {:?}", tf.scale);
        assert!(
            (volume::position(tf) - Vec3::new(0.5, 1.5, 1.0)).length() < 1e-3,
            "position {:?}",
            tf.position
        );
    }

    #[test]
    fn test_cancel_at_each_stage_leaves_no_volume() {
        let volumes = vec![];
        for cancel_after in 1..=3 {
            let mut machine = CreateMachine::default();
            let clicks = [
                click(down_ray(0.0, 0.0)),
                click(down_ray(0.0, 2.0)),
                click(down_ray(1.0, 2.0)),
            ];
            for c in clicks.iter().take(cancel_after) {
                machine.update(c, &ctx(&volumes));
            }
            assert!(machine.session.is_some());

            let cancel = CreateInput {
                cancel: true,
                ..Default::default()
            };
            let out = machine.update(&cancel, &ctx(&volumes));
            assert!(out.is_none());
            assert!(machine.session.is_none());
            assert_eq!(machine.stage, CreateStage::PendingClick);
        }
    }

    #[test]
    fn test_sub_epsilon_length_click_aborts() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));
        // Click again without moving: measured length ~0
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));
        assert!(machine.session.is_none());
        assert_eq!(machine.stage, CreateStage::PendingClick);
    }

    #[test]
    fn test_axis_snap_keeps_longest_axis() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));

        let mut input = hover(down_ray(0.5, 2.0));
        input.axis_snap = true;
        machine.update(&input, &ctx(&volumes));

        let tf = &machine.session.as_ref().unwrap().volume.transform;
        // Snapped to the plane's Z axis, length 2
        assert!((volume::forward_axis(tf) - Vec3::Z).length() < 1e-4);
        assert!((tf.scale[2] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_reference_plane_lifecycle() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();

        // Shift+click places the plane instead of starting a volume
        let mut place = click(down_ray(1.0, 1.0));
        place.plane_modifier = true;
        machine.update(&place, &ctx(&volumes));
        assert!(machine.reference_plane.is_some());
        assert!(machine.session.is_none());

        // Hover now intersects the reference plane
        machine.update(&hover(down_ray(3.0, 3.0)), &ctx(&volumes));
        let h = machine.hover.unwrap();
        assert!((h.point - Vec3::new(3.0, 0.0, 3.0)).length() < 1e-4);

        // Cancel with no pending volume disables the plane
        let cancel = CreateInput {
            cancel: true,
            ..Default::default()
        };
        machine.update(&cancel, &ctx(&volumes));
        assert!(machine.reference_plane.is_none());
    }

    #[test]
    fn test_placement_snaps_to_existing_volume_surface() {
        let mut t = Transform::new();
        volume::set_position(&mut t, Vec3::new(0.0, 1.0, 0.0));
        volume::set_scale(&mut t, Vec3::new(2.0, 2.0, 2.0));
        let volumes = vec![VolumeNode {
            id: "a".into(),
            name: "a".into(),
            transform: t,
        }];

        let mut machine = CreateMachine::default();
        machine.update(&hover(down_ray(0.0, 0.0)), &ctx(&volumes));
        // Hits the top face at y = 2 instead of the ground
        let h = machine.hover.unwrap();
        assert!((h.point.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_top_down_height_plane_is_solvable() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        build_to_width(&mut machine);
        machine.update(&click(down_ray(1.0, 2.0)), &ctx(&volumes));
        assert_eq!(machine.stage, CreateStage::SetHeight);

        // Straight-down ray in a top-down ortho view still measures height
        let top_ctx = CreateContext {
            alignment_up: Vec3::Y,
            camera_forward: Vec3::NEG_Y,
            top_down: true,
            volumes: &volumes,
        };
        machine.update(&hover(down_ray(1.0, 4.0)), &top_ctx);
        let session = machine.session.as_ref().unwrap();
        assert!(session.frame_hit.is_some(), "tilted plane must intersect");
        assert!(session.measured.is_finite());
    }

    #[test]
    fn test_mode_reset_destroys_session_and_plane() {
        let volumes = vec![];
        let mut machine = CreateMachine::default();
        let mut place = click(down_ray(1.0, 1.0));
        place.plane_modifier = true;
        machine.update(&place, &ctx(&volumes));
        machine.update(&click(down_ray(0.0, 0.0)), &ctx(&volumes));
        assert!(machine.session.is_some());

        machine.reset();
        assert!(machine.session.is_none());
        assert!(machine.reference_plane.is_none());
        assert_eq!(machine.stage, CreateStage::PendingClick);
    }
}
