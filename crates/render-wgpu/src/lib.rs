//! wgpu render backend for gridview.
//!
//! Draws the sample mesh, then the procedural grid plane blended over it.
//! Camera uses a fly-camera model with WASD + mouse look.
//!
//! # Invariants
//! - The renderer never mutates grid parameters; they are uploaded once per frame.
//! - Sample-mesh animation is advanced by the caller, not by rendering.

mod camera;
mod gpu;
mod shaders;

pub use camera::FlyCamera;
pub use gpu::{GridUniforms, WgpuRenderer};
pub use shaders::{GRID_SHADER, MESH_SHADER};
