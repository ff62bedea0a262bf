//! WebGPU rendering module
//!
//! The scene is projected on the CPU and drawn as one colored triangle list.

pub mod pipeline;
pub mod scene;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{Camera, build_scene};
pub use vertex::Vertex;
