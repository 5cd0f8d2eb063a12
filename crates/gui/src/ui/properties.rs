//! Properties panel: numeric readout/edit of the active volume

use egui::Ui;
use glam::{EulerRot, Quat, Vec3};

use crate::state::AppState;
use crate::viewport::volume;

pub fn show(ui: &mut Ui, state: &mut AppState, active: Option<String>) {
    ui.heading("Properties");
    ui.add_space(4.0);

    let Some(id) = active else {
        ui.weak("No active volume");
        return;
    };
    let pivot = state.settings.pivot;

    let Some(node) = state.scene.volume(&id) else {
        ui.weak("No active volume");
        return;
    };
    ui.label(&node.name);
    ui.small(format!("pivot: {}", pivot.label()));
    ui.add_space(4.0);

    let t = node.transform.clone();
    let mut pos = volume::pivot_position(&t, pivot);
    let (ry, rx, rz) = volume::rotation(&t).to_euler(EulerRot::YXZ);
    let mut euler_deg = Vec3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees());
    let mut scale = volume::scale(&t);

    let mut begin = false;
    let mut pos_changed = false;
    let mut rot_changed = false;
    let mut scale_changed = false;

    egui::Grid::new("volume_props").num_columns(4).show(ui, |ui| {
        ui.label("Position");
        for v in [&mut pos.x, &mut pos.y, &mut pos.z] {
            let resp = ui.add(egui::DragValue::new(v).speed(0.05).max_decimals(3));
            begin |= resp.drag_started();
            pos_changed |= resp.changed();
        }
        ui.end_row();

        ui.label("Rotation");
        for v in [&mut euler_deg.x, &mut euler_deg.y, &mut euler_deg.z] {
            let resp = ui.add(egui::DragValue::new(v).speed(1.0).suffix("°"));
            begin |= resp.drag_started();
            rot_changed |= resp.changed();
        }
        ui.end_row();

        ui.label("Scale");
        for v in [&mut scale.x, &mut scale.y, &mut scale.z] {
            let resp = ui.add(
                egui::DragValue::new(v)
                    .speed(0.05)
                    .range(volume::MIN_EXTENT..=f32::INFINITY),
            );
            begin |= resp.drag_started();
            scale_changed |= resp.changed();
        }
        ui.end_row();
    });

    if !(pos_changed || rot_changed || scale_changed) {
        return;
    }
    if begin {
        state.scene.begin_change();
    }
    let pivot_setting = pivot;
    let Some(node) = state.scene.volume_mut(&id) else {
        return;
    };
    let t = &mut node.transform;
    if rot_changed {
        let q = Quat::from_euler(
            EulerRot::YXZ,
            euler_deg.y.to_radians(),
            euler_deg.x.to_radians(),
            euler_deg.z.to_radians(),
        );
        volume::set_rotation(t, q);
    }
    if scale_changed {
        volume::set_scale(t, scale.max(Vec3::splat(volume::MIN_EXTENT)));
    }
    // Re-anchor after rotation/scale edits so the presented position holds
    volume::set_pivot_position(t, pivot_setting, pos);
    state.scene.notify_mutated();
}
