//! 3D viewport panel: per-frame input sampling, visibility culling, drawing
//! and mode-specific interaction, in that order.

pub use vbox_gui_lib::viewport::{camera, create, geometry, handles, volume};

mod delete;
mod edit;
mod renderer;

use std::collections::HashSet;

use egui::{Color32, Stroke, Ui};
use shared::ObjectId;

use crate::state::settings::{Mode, Pivot};
use crate::state::AppState;

use camera::ArcBallCamera;
use create::{CreateContext, CreateInput, CreateMachine, CreateStage};
use geometry::cube_in_frustum;
use handles::HandleTool;

const FILL: Color32 = Color32::from_rgba_premultiplied(32, 56, 90, 90);
const FILL_ACTIVE: Color32 = Color32::from_rgba_premultiplied(50, 86, 115, 115);
const FILL_DELETE_HOVER: Color32 = Color32::from_rgba_premultiplied(128, 40, 40, 128);
const FILL_CREATING: Color32 = Color32::from_rgba_premultiplied(38, 92, 59, 107);
const OUTLINE: Color32 = Color32::from_rgb(140, 170, 210);
const OUTLINE_ACTIVE: Color32 = Color32::from_rgb(120, 200, 255);
const GRID_DIM: Color32 = Color32::from_rgba_premultiplied(54, 54, 27, 77);
const GRID_BRIGHT: Color32 = Color32::from_rgba_premultiplied(138, 138, 66, 153);
const BACKGROUND: Color32 = Color32::from_rgb(30, 30, 35);

/// 3D viewport panel
pub struct ViewportPanel {
    camera: ArcBallCamera,
    create: CreateMachine,
    drag: Option<edit::EditDrag>,
    handles: volume::HandleMap,
    last_scene_version: u64,
    last_mode: Mode,
    delete_hover: Option<ObjectId>,
    warning: Option<(egui::Pos2, String)>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            create: CreateMachine::default(),
            drag: None,
            handles: volume::HandleMap::new(),
            last_scene_version: 0,
            last_mode: Mode::None,
            delete_hover: None,
            warning: None,
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::new();
    }

    pub fn toggle_top_down(&mut self) {
        self.camera.toggle_top_down();
    }

    /// Current create sub-stage (status bar)
    pub fn create_stage(&self) -> CreateStage {
        self.create.stage
    }

    /// Id of the active handle volume, if any
    pub fn active_volume(&self) -> Option<&ObjectId> {
        volume::active_id(&self.handles)
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(
            ui.available_size(),
            egui::Sense::click_and_drag(),
        );

        // Leaving a mode cancels any in-progress creation and drag
        if state.settings.mode != self.last_mode {
            self.create.reset();
            self.drag = None;
            self.last_mode = state.settings.mode;
        }

        // Rebuild handle bookkeeping when the volume set changed underneath
        // us (undo/redo, external edits)
        if state.scene.version() != self.last_scene_version {
            volume::sync_handles(&mut self.handles, &state.scene.scene.volumes);
            self.last_scene_version = state.scene.version();
        }

        // ── Input sampling ──────────────────────────────────────
        let pointer = response
            .interact_pointer_pos()
            .or_else(|| response.hover_pos());
        let pointer_ray = pointer.map(|p| self.camera.screen_ray(p, rect));
        let time = ui.input(|i| i.time);
        let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
        let modifiers = ui.input(|i| i.modifiers);

        self.handle_camera(&response, ui, &modifiers, state.settings.mode);

        // ── Visibility culling ──────────────────────────────────
        let planes = self.camera.frustum(rect);
        let visible: HashSet<ObjectId> = state
            .scene
            .scene
            .volumes
            .iter()
            .filter(|v| {
                cube_in_frustum(
                    &planes,
                    volume::position(&v.transform),
                    v.transform.max_extent(),
                )
            })
            .map(|v| v.id.clone())
            .collect();

        // Delete-mode hover highlight, computed before drawing
        self.delete_hover = if state.settings.mode == Mode::Delete {
            pointer_ray
                .as_ref()
                .and_then(|r| delete::hover_target(r, &state.scene, &visible, &self.handles))
        } else {
            None
        };

        // ── Visual draw ─────────────────────────────────────────
        if ui.is_rect_visible(rect) {
            self.draw(ui, rect, state, &visible);
        }

        // ── Mode-specific interaction ───────────────────────────
        match state.settings.mode {
            Mode::None => {}
            Mode::Create => {
                let input = CreateInput {
                    ray: pointer_ray,
                    primary_clicked: response.clicked(),
                    cancel: response.secondary_clicked() || escape,
                    plane_modifier: modifiers.shift,
                    symmetric: modifiers.alt,
                    axis_snap: modifiers.command,
                };
                let ctx = CreateContext {
                    alignment_up: state.settings.alignment.up(),
                    camera_forward: self.camera.forward(),
                    top_down: self.camera.is_top_down(),
                    volumes: &state.scene.scene.volumes,
                };
                let finalized = self.create.update(&input, &ctx);
                if let Some(node) = finalized {
                    let id = node.id.clone();
                    state.scene.add_volume(node);
                    volume::sync_handles(&mut self.handles, &state.scene.scene.volumes);
                    volume::mark_active(&mut self.handles, &id, time);
                    self.last_scene_version = state.scene.version();
                }
            }
            Mode::Edit => {
                // Escape aborts the gesture; the undo entry recorded at
                // pointer-down restores the pre-drag transforms
                if escape && self.drag.take().is_some() {
                    state.scene.undo();
                    volume::clear_snapshots(&mut self.handles);
                    self.last_scene_version = state.scene.version();
                }
                let params = edit::EditParams {
                    camera: &self.camera,
                    rect,
                    tool: state.tool,
                    pivot: state.settings.pivot,
                    grid_snap: state.settings.grid_snap,
                    grid_step: state.settings.grid_step,
                    time,
                };
                let warning = edit::run(
                    &response,
                    &params,
                    &mut state.scene,
                    &mut self.handles,
                    &visible,
                    &mut self.drag,
                );
                if let (Some(text), Some(pos)) = (warning, pointer) {
                    self.warning = Some((pos, text));
                }
                self.last_scene_version = state.scene.version();
            }
            Mode::Delete => {
                if response.clicked() {
                    if let Some(id) = self.delete_hover.take() {
                        delete::destroy(&id, &mut state.scene, &mut self.handles);
                        self.last_scene_version = state.scene.version();
                    }
                }
                // Hover highlighting depends on cursor movement alone
                ui.ctx().request_repaint();
            }
        }

        // Surfaced warnings paint over everything, near the cursor
        if let Some((pos, text)) = self.warning.take() {
            renderer::draw_warning(&ui.painter_at(rect), pos, &text);
        }
    }

    fn handle_camera(
        &mut self,
        response: &egui::Response,
        ui: &Ui,
        modifiers: &egui::Modifiers,
        mode: Mode,
    ) {
        if self.drag.is_some() {
            return;
        }

        // Alt is the symmetric-sizing modifier while creating; don't let it
        // orbit the camera mid-gesture
        let alt_orbit = modifiers.alt && !(mode == Mode::Create && self.create.session.is_some());

        if response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary) && alt_orbit)
        {
            let delta = response.drag_delta();
            self.camera.rotate(delta.x * 0.5, delta.y * 0.5);
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.pan(delta.x * 0.01, delta.y * 0.01);
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.1 {
            self.camera.zoom(scroll * 0.01);
        }
    }

    fn draw(&self, ui: &Ui, rect: egui::Rect, state: &AppState, visible: &HashSet<ObjectId>) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);

        if state.settings.grid.visible {
            renderer::draw_world_grid(&painter, rect, &self.camera, &state.settings.grid);
        }
        renderer::draw_world_axes(&painter, rect, &self.camera);

        let full = state.settings.draw_full_volume;
        let pivot = state.settings.pivot;
        let in_length_stage =
            state.settings.mode == Mode::Create && self.create.stage == CreateStage::SetLength;

        // Construction gridlines, dim pass under the volume fills
        if in_length_stage {
            if let Some(session) = &self.create.session {
                renderer::draw_alignment_grid(
                    &painter,
                    rect,
                    &self.camera,
                    session.clicked_point,
                    session.orientation,
                    GRID_DIM,
                    1.6,
                );
            }
        }

        // Surface outlines
        if !full || pivot == Pivot::Center {
            for v in &state.scene.scene.volumes {
                if !visible.contains(&v.id) {
                    continue;
                }
                let active = self.is_active(&v.id);
                let color = if active { OUTLINE_ACTIVE } else { OUTLINE };
                renderer::draw_base_outline(
                    &painter,
                    rect,
                    &self.camera,
                    &v.transform,
                    Stroke::new(if active { 2.0 } else { 1.0 }, color),
                );
            }
        }

        // Volume fills
        for v in &state.scene.scene.volumes {
            if !visible.contains(&v.id) {
                continue;
            }
            let fill = if self.delete_hover.as_ref() == Some(&v.id) {
                FILL_DELETE_HOVER
            } else if self.is_active(&v.id) {
                FILL_ACTIVE
            } else {
                FILL
            };
            renderer::draw_volume_fill(&painter, rect, &self.camera, &v.transform, fill, full);
            if full {
                let active = self.is_active(&v.id);
                renderer::draw_full_outline(
                    &painter,
                    rect,
                    &self.camera,
                    &v.transform,
                    Stroke::new(if active { 2.0 } else { 1.0 }, if active { OUTLINE_ACTIVE } else { OUTLINE }),
                );
            }
        }

        // In-progress volume, always drawn fully
        if let Some(session) = &self.create.session {
            let t = &session.volume.transform;
            renderer::draw_volume_fill(&painter, rect, &self.camera, t, FILL_CREATING, true);
            renderer::draw_full_outline(
                &painter,
                rect,
                &self.camera,
                t,
                Stroke::new(1.5, OUTLINE_ACTIVE),
            );
        }

        // Construction gridlines, bright pass over the fills
        if in_length_stage {
            if let Some(session) = &self.create.session {
                renderer::draw_alignment_grid(
                    &painter,
                    rect,
                    &self.camera,
                    session.clicked_point,
                    session.orientation,
                    GRID_BRIGHT,
                    0.7,
                );
            }
        }

        // Placement gizmo while waiting for the first click
        if state.settings.mode == Mode::Create && self.create.stage == CreateStage::PendingClick {
            if let Some(hover) = &self.create.hover {
                renderer::draw_axis_gizmo(
                    &painter,
                    rect,
                    &self.camera,
                    hover.point,
                    hover.rotation,
                    0.8,
                );
            }
        }

        // Edit-mode handle visuals on the active volume
        if state.settings.mode == Mode::Edit {
            self.draw_edit_handles(&painter, rect, state, visible);
        }
    }

    fn draw_edit_handles(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        state: &AppState,
        visible: &HashSet<ObjectId>,
    ) {
        let Some(active) = volume::active_id(&self.handles) else {
            return;
        };
        if !visible.contains(active) {
            return;
        }
        let Some(node) = state.scene.volume(active) else {
            return;
        };
        let t = &node.transform;
        let origin = volume::pivot_position(t, state.settings.pivot);
        let rot = volume::rotation(t);

        match state.tool {
            HandleTool::Move | HandleTool::Scale => {
                renderer::draw_axis_gizmo(painter, rect, &self.camera, origin, rot, handles::AXIS_LENGTH);
                if state.tool == HandleTool::Scale {
                    if let Some(screen) = self.camera.project(origin, rect) {
                        painter.circle_filled(screen, 5.0, Color32::from_rgb(220, 220, 220));
                    }
                }
            }
            HandleTool::Rotate => {
                renderer::draw_rotation_rings(
                    painter,
                    rect,
                    &self.camera,
                    origin,
                    rot,
                    handles::RING_RADIUS,
                );
            }
            HandleTool::Rect => {
                let base = volume::surface_point(t);
                let fh = handles::footprint_handles(base, rot, volume::scale(t));
                renderer::draw_handle_points(
                    painter,
                    rect,
                    &self.camera,
                    fh.iter().map(|h| h.point),
                    Color32::from_rgb(255, 210, 90),
                );
            }
        }
    }

    fn is_active(&self, id: &str) -> bool {
        self.handles.get(id).map(|h| h.is_active).unwrap_or(false)
    }
}

impl Default for ViewportPanel {
    fn default() -> Self {
        Self::new()
    }
}
