//! Vertex types for the scene pass

use bytemuck::{Pod, Zeroable};

/// Clip-space vertex with color
///
/// Projection happens on the CPU so the shader is a pass-through and the GPU
/// only has to clip against w.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 4], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const SKY: u32 = 0x87CEEB;
    pub const FLOOR: u32 = 0x424242;
    pub const AVATAR: u32 = 0x000000;

    fn srgb_to_linear(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    /// 0xRRGGBB to linear RGBA (surfaces are sRGB)
    pub fn from_hex(hex: u32) -> [f32; 4] {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
        [channel(16), channel(8), channel(0), 1.0]
    }

    /// Darken a color for shading faces
    pub fn shade(color: [f32; 4], factor: f32) -> [f32; 4] {
        [color[0] * factor, color[1] * factor, color[2] * factor, color[3]]
    }

}
