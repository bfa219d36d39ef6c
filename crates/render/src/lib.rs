//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read `GridParams`; they never mutate them.
//! - Render output derives only from parameters and view.
//!
//! A software renderer evaluates the grid pipeline per pixel on the CPU,
//! which makes frames testable and previews possible without a GPU. The
//! wgpu backend lives in `gridview-render-wgpu`.

mod renderer;
pub mod scene;

pub use renderer::{AsciiRenderer, Frame, RenderView, Renderer, SoftwareRenderer};
pub use scene::{FrameThrottle, SAMPLE_MESH_COLOR, SampleMesh};

pub fn crate_info() -> &'static str {
    "gridview-render v0.1.0"
}
