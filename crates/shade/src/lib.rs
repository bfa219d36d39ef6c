//! Procedural grid shading, evaluated on the CPU.
//!
//! Computes, per fragment, a composited RGBA for a ground grid: base color,
//! minor lines, major lines and two colored world axes, anti-aliased with
//! screen-space derivatives. The WGSL shader in `gridview-render-wgpu`
//! performs the same arithmetic on the GPU; this crate is the reference
//! it is tested against.
//!
//! # Invariants
//! - Evaluation is pure: no state survives between fragments.
//! - Line masks are always evaluated with ascending smoothstep edges.
//! - Output alpha is in [0, 1].

pub mod math;
mod pipeline;

pub use pipeline::{
    Derivatives, FragmentInput, GridCoords, GridMasks, GridShader, ShadedFragment, axis_color,
    axis_masks, major_grid_mask, minor_grid_mask,
};
