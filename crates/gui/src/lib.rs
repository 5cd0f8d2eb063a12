// Library crate: exposes the testable tool logic.
// GUI-specific modules (app, ui, viewport panel and rendering) remain in the
// binary crate.

pub mod state;

/// Subset of viewport modules with no per-frame UI glue: camera math, pure
/// geometry, the creation state machine, handle primitives, and the
/// pivot-aware volume accessors. The panel, renderer, and per-mode input
/// glue stay in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod create;
    pub mod geometry;
    pub mod handles;
    pub mod volume;
}
