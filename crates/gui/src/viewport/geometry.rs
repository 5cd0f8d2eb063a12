//! Pure geometry utilities for the viewport tools

use glam::{Mat3, Mat4, Quat, Vec3};

/// A ray in world space
#[derive(Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A plane in world space (`normal · p + d = 0`, normal unit length)
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Signed distance of a point to the plane (positive on the normal side)
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// Ray/plane intersection.
/// Returns the distance along the ray, or None if the ray is near-parallel
/// to the plane or the hit lies behind the origin.
pub fn ray_plane(ray: &Ray, plane: &Plane) -> Option<f32> {
    let denom = plane.normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = -plane.signed_distance(ray.origin) / denom;
    (t >= 0.0).then_some(t)
}

/// Snap a direction lying in a plane to the nearest of the plane's two
/// cardinal axes by comparing squared projections and keeping the longest.
pub fn snap_to_plane_axes(dir: Vec3, right: Vec3, forward: Vec3) -> Vec3 {
    let r = dir.dot(right);
    let f = dir.dot(forward);
    if r * r >= f * f {
        right * r
    } else {
        forward * f
    }
}

/// Remove the `up` component of `v` and normalize.
/// Returns None when the flattened vector is degenerate.
pub fn flatten_onto_plane(v: Vec3, up: Vec3) -> Option<Vec3> {
    let flat = v - up * v.dot(up);
    let len = flat.length();
    if len < 1e-4 {
        return None;
    }
    Some(flat / len)
}

/// Orientation with local +Z = `forward` and local +Y as close to `up` as
/// the orthonormal basis allows.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize()?;
    let r = up.cross(f).try_normalize()?;
    let u = f.cross(r);
    Some(Quat::from_mat3(&Mat3::from_cols(r, u, f)))
}

/// Ray vs. oriented box surface.
/// The box has the given center, rotation and full extents; returns the
/// distance along the ray to the nearest surface point, or None.
pub fn ray_obb(ray: &Ray, center: Vec3, rotation: Quat, extents: Vec3) -> Option<f32> {
    let inv = rotation.inverse();
    let local = Ray {
        origin: inv * (ray.origin - center),
        direction: inv * ray.direction,
    };
    let half = extents * 0.5;

    // Slab method in box-local space
    let inv_dir = Vec3::new(
        1.0 / local.direction.x,
        1.0 / local.direction.y,
        1.0 / local.direction.z,
    );

    let t1 = (-half.x - local.origin.x) * inv_dir.x;
    let t2 = (half.x - local.origin.x) * inv_dir.x;
    let t3 = (-half.y - local.origin.y) * inv_dir.y;
    let t4 = (half.y - local.origin.y) * inv_dir.y;
    let t5 = (-half.z - local.origin.z) * inv_dir.z;
    let t6 = (half.z - local.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Extract the six frustum planes (normals pointing inward) from a
/// view-projection matrix.
pub fn frustum_planes(view_proj: &Mat4) -> [Plane; 6] {
    let r0 = view_proj.row(0);
    let r1 = view_proj.row(1);
    let r2 = view_proj.row(2);
    let r3 = view_proj.row(3);

    let rows = [
        r3 + r0, // left
        r3 - r0, // right
        r3 + r1, // bottom
        r3 - r1, // top
        r3 + r2, // near
        r3 - r2, // far
    ];

    rows.map(|row| {
        let normal = Vec3::new(row.x, row.y, row.z);
        let len = normal.length().max(1e-12);
        Plane {
            normal: normal / len,
            d: row.w / len,
        }
    })
}

/// Conservative visibility test of an axis-aligned cube (center, half-extent)
/// against the frustum. Never rejects a cube that intersects the frustum.
pub fn cube_in_frustum(planes: &[Plane; 6], center: Vec3, half: f32) -> bool {
    for plane in planes {
        let n = plane.normal;
        // Support radius of the cube along the plane normal
        let radius = half * (n.x.abs() + n.y.abs() + n.z.abs());
        if plane.signed_distance(center) < -radius {
            return false;
        }
    }
    true
}

/// The 24 proper rotations mapping the world axes onto signed world axes.
fn canonical_frames() -> Vec<Mat3> {
    const AXES: [Vec3; 6] = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];

    let mut frames = Vec::with_capacity(24);
    for x in AXES {
        for y in AXES {
            if x.dot(y).abs() > 0.5 {
                continue;
            }
            frames.push(Mat3::from_cols(x, y, x.cross(y)));
        }
    }
    frames
}

/// Find the canonical orthogonal frame closest to `rotation`: the one that
/// maximizes the minimum absolute dot product across the three primary axes.
/// Prevents axis mislabeling of footprint handles after arbitrary rotations.
pub fn nearest_canonical_frame(rotation: Quat) -> Mat3 {
    let rx = rotation * Vec3::X;
    let ry = rotation * Vec3::Y;
    let rz = rotation * Vec3::Z;

    let mut best = Mat3::IDENTITY;
    let mut best_score = f32::MIN;

    for frame in canonical_frames() {
        let score = frame
            .x_axis
            .dot(rx)
            .abs()
            .min(frame.y_axis.dot(ry).abs())
            .min(frame.z_axis.dot(rz).abs());
        if score > best_score {
            best_score = score;
            best = frame;
        }
    }
    best
}

/// Minimum distance between a ray and a line segment.
pub fn ray_segment_distance(ray: &Ray, line_start: Vec3, line_end: Vec3) -> f32 {
    let u = ray.direction;
    let v = line_end - line_start;
    let w = ray.origin - line_start;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);

    let denom = a * c - b * b;

    let (sc, tc);

    if denom < 1e-7 {
        // Nearly parallel
        sc = 0.0;
        tc = if b > c { d / b } else { e / c };
    } else {
        sc = (b * e - c * d) / denom;
        tc = (a * e - b * d) / denom;
    }

    let tc = tc.clamp(0.0, 1.0);
    let sc = sc.max(0.0);

    let closest_ray = ray.origin + u * sc;
    let closest_line = line_start + v * tc;

    (closest_ray - closest_line).length()
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

    #[test]
    fn test_ray_plane_hit() {
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::Y);
        let t = ray_plane(&down_ray(1.0, 2.0), &plane).unwrap();
        assert!((t - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_plane_parallel_is_none() {
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::Y);
        let ray = Ray {
            origin: Vec3::new(0.0, 1.0, 0.0),
            direction: Vec3::X,
        };
        assert!(ray_plane(&ray, &plane).is_none());
    }

    #[test]
    fn test_ray_plane_behind_origin_is_none() {
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::Y);
        let ray = Ray {
            origin: Vec3::new(0.0, 1.0, 0.0),
            direction: Vec3::Y,
        };
        assert!(ray_plane(&ray, &plane).is_none());
    }

    #[test]
    fn test_snap_keeps_longest_projection() {
        let snapped = snap_to_plane_axes(Vec3::new(3.0, 0.0, 1.0), Vec3::X, Vec3::Z);
        assert_eq!(snapped, Vec3::new(3.0, 0.0, 0.0));

        let snapped = snap_to_plane_axes(Vec3::new(-0.5, 0.0, -2.0), Vec3::X, Vec3::Z);
        assert_eq!(snapped, Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_flatten_onto_plane() {
        let flat = flatten_onto_plane(Vec3::new(1.0, 5.0, 0.0), Vec3::Y).unwrap();
        assert!((flat - Vec3::X).length() < 1e-6);
        // A vector along the normal has no in-plane component
        assert!(flatten_onto_plane(Vec3::Y * 3.0, Vec3::Y).is_none());
    }

    #[test]
    fn test_look_rotation_axes() {
        let q = look_rotation(Vec3::Z, Vec3::Y).unwrap();
        assert!((q * Vec3::Z - Vec3::Z).length() < 1e-5);
        assert!((q * Vec3::Y - Vec3::Y).length() < 1e-5);

        let q = look_rotation(Vec3::X, Vec3::Y).unwrap();
        assert!((q * Vec3::Z - Vec3::X).length() < 1e-5);
        assert!((q * Vec3::Y - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_ray_obb_axis_aligned() {
        let t = ray_obb(
            &down_ray(0.0, 0.0),
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(2.0, 2.0, 2.0),
        )
        .unwrap();
        // Top face sits at y = 1
        assert!((t - 9.0).abs() < 1e-4);

        // Off to the side: miss
        assert!(ray_obb(
            &down_ray(2.0, 0.0),
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(2.0, 2.0, 2.0),
        )
        .is_none());
    }

    #[test]
    fn test_ray_obb_rotated() {
        // Box rotated 45° about Y still covers the origin column
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let t = ray_obb(&down_ray(0.0, 0.0), Vec3::ZERO, rot, Vec3::splat(2.0)).unwrap();
        assert!((t - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_frustum_accepts_center_rejects_behind() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(45f32.to_radians(), 1.0, 0.1, 100.0);
        let planes = frustum_planes(&(proj * view));

        assert!(cube_in_frustum(&planes, Vec3::ZERO, 0.5));
        // Behind the camera
        assert!(!cube_in_frustum(&planes, Vec3::new(0.0, 0.0, 20.0), 0.5));
        // Far off to the side
        assert!(!cube_in_frustum(&planes, Vec3::new(100.0, 0.0, 0.0), 0.5));
    }

    #[test]
    fn test_frustum_conservative_near_edge() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(45f32.to_radians(), 1.0, 0.1, 100.0);
        let planes = frustum_planes(&(proj * view));

        // A cube straddling the left plane must stay visible
        let edge_x = -(5.0 * (22.5f32.to_radians()).tan());
        assert!(cube_in_frustum(&planes, Vec3::new(edge_x, 0.0, 0.0), 0.5));
    }

    #[test]
    fn test_canonical_frames_count_and_identity() {
        assert_eq!(canonical_frames().len(), 24);

        // A small rotation snaps back to the identity frame
        let rot = Quat::from_rotation_y(0.1);
        let frame = nearest_canonical_frame(rot);
        assert!((frame.x_axis - Vec3::X).length() < 1e-6);
        assert!((frame.y_axis - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_canonical_frame_quarter_turn() {
        // 80° about Y is closest to the 90° frame: X → -Z
        let rot = Quat::from_rotation_y(80f32.to_radians());
        let frame = nearest_canonical_frame(rot);
        assert!((frame.x_axis.dot(rot * Vec3::X)).abs() > 0.9);
        assert!((frame.x_axis - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_ray_segment_distance() {
        let ray = Ray {
            origin: Vec3::new(0.0, 1.0, -5.0),
            direction: Vec3::Z,
        };
        let d = ray_segment_distance(&ray, Vec3::ZERO, Vec3::X * 2.0);
        assert!((d - 1.0).abs() < 1e-5);
    }
}
