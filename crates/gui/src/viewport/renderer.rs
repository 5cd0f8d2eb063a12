//! Painter-based viewport rendering: translucent volume fills, outlines,
//! construction gridlines and the placement axis gizmo.

use egui::{Color32, Painter, Rect, Stroke};
use glam::{Quat, Vec3};
use shared::Transform;

use crate::state::settings::GridSettings;

use super::camera::ArcBallCamera;
use super::volume;

// Corner layout: bit order (-,+) per axis, bottom face first
const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0), // bottom face
    (4, 5), (5, 6), (6, 7), (7, 4), // top face
    (0, 4), (1, 5), (2, 6), (3, 7), // verticals
];

const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // bottom (-y)
    [4, 5, 6, 7], // top (+y)
    [0, 1, 5, 4], // front (-z)
    [3, 2, 6, 7], // back (+z)
    [0, 3, 7, 4], // left (-x)
    [1, 2, 6, 5], // right (+x)
];

const BASE_FACE: [usize; 4] = [0, 1, 2, 3];

/// World-space corners of a volume's box
pub fn corners(t: &Transform) -> [Vec3; 8] {
    let rot = volume::rotation(t);
    let center = volume::position(t);
    let h = volume::scale(t) * 0.5;

    let local = [
        Vec3::new(-h.x, -h.y, -h.z),
        Vec3::new(h.x, -h.y, -h.z),
        Vec3::new(h.x, -h.y, h.z),
        Vec3::new(-h.x, -h.y, h.z),
        Vec3::new(-h.x, h.y, -h.z),
        Vec3::new(h.x, h.y, -h.z),
        Vec3::new(h.x, h.y, h.z),
        Vec3::new(-h.x, h.y, h.z),
    ];
    local.map(|p| center + rot * p)
}

fn project_quad(
    camera: &ArcBallCamera,
    rect: Rect,
    pts: &[Vec3; 8],
    face: &[usize; 4],
) -> Option<[egui::Pos2; 4]> {
    let mut out = [egui::Pos2::ZERO; 4];
    for (slot, &i) in out.iter_mut().zip(face.iter()) {
        *slot = camera.project(pts[i], rect)?;
    }
    Some(out)
}

/// Translucent fill: the base face only, or all six faces of the cuboid
/// painted back-to-front so nearer faces composite over farther ones.
pub fn draw_volume_fill(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    t: &Transform,
    color: Color32,
    full_volume: bool,
) {
    let pts = corners(t);

    if !full_volume {
        if let Some(quad) = project_quad(camera, rect, &pts, &BASE_FACE) {
            painter.add(egui::Shape::convex_polygon(
                quad.to_vec(),
                color,
                Stroke::NONE,
            ));
        }
        return;
    }

    let eye = camera.eye_position();
    let mut order: Vec<(usize, f32)> = FACES
        .iter()
        .enumerate()
        .map(|(i, face)| {
            let center = face.iter().map(|&c| pts[c]).sum::<Vec3>() * 0.25;
            (i, (center - eye).length_squared())
        })
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (i, _) in order {
        if let Some(quad) = project_quad(camera, rect, &pts, &FACES[i]) {
            painter.add(egui::Shape::convex_polygon(
                quad.to_vec(),
                color,
                Stroke::NONE,
            ));
        }
    }
}

/// Base-face outline (the volume's "surface" rectangle)
pub fn draw_base_outline(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    t: &Transform,
    stroke: Stroke,
) {
    let pts = corners(t);
    for i in 0..4 {
        let a = pts[BASE_FACE[i]];
        let b = pts[BASE_FACE[(i + 1) % 4]];
        if let (Some(pa), Some(pb)) = (camera.project(a, rect), camera.project(b, rect)) {
            painter.line_segment([pa, pb], stroke);
        }
    }
}

/// Full 12-edge wireframe
pub fn draw_full_outline(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    t: &Transform,
    stroke: Stroke,
) {
    let pts = corners(t);
    for (a, b) in EDGES {
        if let (Some(pa), Some(pb)) = (camera.project(pts[a], rect), camera.project(pts[b], rect))
        {
            painter.line_segment([pa, pb], stroke);
        }
    }
}

/// 4×4 alignment gridlines on the construction plane around `origin`.
/// Drawn twice per repaint with different tints (a dim pass under the
/// volume fills and a bright pass over them) to communicate occlusion
/// without z-fighting.
pub fn draw_alignment_grid(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    origin: Vec3,
    orientation: Quat,
    tint: Color32,
    width: f32,
) {
    const CELLS: i32 = 2;
    const CELL_SIZE: f32 = 0.5;

    let right = orientation * Vec3::X;
    let forward = orientation * Vec3::Z;
    let extent = CELLS as f32 * CELL_SIZE;
    let stroke = Stroke::new(width, tint);

    for i in -CELLS..=CELLS {
        let f = i as f32 * CELL_SIZE;

        let a = origin + right * f - forward * extent;
        let b = origin + right * f + forward * extent;
        if let (Some(pa), Some(pb)) = (camera.project(a, rect), camera.project(b, rect)) {
            painter.line_segment([pa, pb], stroke);
        }

        let a = origin + forward * f - right * extent;
        let b = origin + forward * f + right * extent;
        if let (Some(pa), Some(pb)) = (camera.project(a, rect), camera.project(b, rect)) {
            painter.line_segment([pa, pb], stroke);
        }
    }
}

/// Colored arrow gizmo for the three local axes at the placement point
pub fn draw_axis_gizmo(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    origin: Vec3,
    rotation: Quat,
    length: f32,
) {
    let axes = [
        (Vec3::X, Color32::from_rgb(220, 70, 70)),
        (Vec3::Y, Color32::from_rgb(70, 200, 70)),
        (Vec3::Z, Color32::from_rgb(70, 110, 220)),
    ];

    for (axis, color) in axes {
        let dir = rotation * axis;
        let tip = origin + dir * length;
        let stroke = Stroke::new(2.0, color);

        let (Some(po), Some(pt)) = (camera.project(origin, rect), camera.project(tip, rect))
        else {
            continue;
        };
        painter.line_segment([po, pt], stroke);

        // Screen-space arrowhead
        let shaft = pt - po;
        if shaft.length() < 4.0 {
            continue;
        }
        let n = shaft.normalized();
        let side = egui::vec2(-n.y, n.x);
        let back = pt - n * 7.0;
        painter.line_segment([pt, back + side * 4.0], stroke);
        painter.line_segment([pt, back - side * 4.0], stroke);
    }
}

/// World ground grid underlay
pub fn draw_world_grid(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    settings: &GridSettings,
) {
    let alpha = (settings.opacity * 255.0) as u8;
    let grid_color = Color32::from_rgba_premultiplied(60, 60, 60, alpha);
    let stroke = Stroke::new(0.5, grid_color);

    let range = settings.range;
    let step = settings.size;

    for i in -range..=range {
        let f = i as f32 * step;
        let extent = range as f32 * step;

        if let (Some(a), Some(b)) = (
            camera.project(Vec3::new(f, 0.0, -extent), rect),
            camera.project(Vec3::new(f, 0.0, extent), rect),
        ) {
            if rect.contains(a) || rect.contains(b) {
                painter.line_segment([a, b], stroke);
            }
        }
        if let (Some(a), Some(b)) = (
            camera.project(Vec3::new(-extent, 0.0, f), rect),
            camera.project(Vec3::new(extent, 0.0, f), rect),
        ) {
            if rect.contains(a) || rect.contains(b) {
                painter.line_segment([a, b], stroke);
            }
        }
    }
}

/// World axes indicator at the origin
pub fn draw_world_axes(painter: &Painter, rect: Rect, camera: &ArcBallCamera) {
    draw_axis_gizmo(painter, rect, camera, Vec3::ZERO, Quat::IDENTITY, 1.5);

    let labels = [
        (Vec3::new(1.6, 0.0, 0.0), "X", Color32::from_rgb(220, 70, 70)),
        (Vec3::new(0.0, 1.6, 0.0), "Y", Color32::from_rgb(70, 200, 70)),
        (Vec3::new(0.0, 0.0, 1.6), "Z", Color32::from_rgb(70, 110, 220)),
    ];
    for (pos, label, color) in labels {
        if let Some(screen) = camera.project(pos, rect) {
            if rect.contains(screen) {
                painter.text(
                    screen,
                    egui::Align2::LEFT_BOTTOM,
                    label,
                    egui::FontId::monospace(12.0),
                    color,
                );
            }
        }
    }
}

/// Rotation rings of the rotate handle: one circle per local axis
pub fn draw_rotation_rings(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    origin: Vec3,
    rotation: Quat,
    radius: f32,
) {
    const SEGMENTS: usize = 32;
    let axes = [
        (Vec3::Y, Vec3::Z, Color32::from_rgb(220, 70, 70)),   // X ring
        (Vec3::Z, Vec3::X, Color32::from_rgb(70, 200, 70)),   // Y ring
        (Vec3::X, Vec3::Y, Color32::from_rgb(70, 110, 220)),  // Z ring
    ];

    for (u, v, color) in axes {
        let stroke = Stroke::new(1.5, color);
        let mut prev: Option<egui::Pos2> = None;
        for i in 0..=SEGMENTS {
            let a = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            let p = origin + rotation * (u * a.cos() + v * a.sin()) * radius;
            let screen = camera.project(p, rect);
            if let (Some(pa), Some(pb)) = (prev, screen) {
                painter.line_segment([pa, pb], stroke);
            }
            prev = screen;
        }
    }
}

/// Small filled markers for grabbable sub-handles (footprint edges)
pub fn draw_handle_points(
    painter: &Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    points: impl IntoIterator<Item = Vec3>,
    color: Color32,
) {
    for p in points {
        if let Some(screen) = camera.project(p, rect) {
            painter.circle_filled(screen, 4.0, color);
        }
    }
}

/// Warning label painted near the cursor when a volume refuses to operate
pub fn draw_warning(painter: &Painter, pos: egui::Pos2, text: &str) {
    painter.text(
        pos + egui::vec2(14.0, -6.0),
        egui::Align2::LEFT_BOTTOM,
        text,
        egui::FontId::proportional(12.0),
        Color32::from_rgb(255, 180, 70),
    );
}
