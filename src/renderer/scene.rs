//! Scene geometry: camera, floor, obstacle cubes and the avatar
//!
//! Everything is projected to clip space on the CPU. There is no depth buffer,
//! so faces are drawn back to front.

use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;

use super::vertex::{Vertex, colors};
use crate::consts::{AVATAR_OFFSET_Z, AVATAR_Y, CAMERA_HEIGHT, FLOOR_SIZE, FLOOR_Y};
use crate::sim::{Aabb, GameState, Session};

/// Vertical field of view (degrees)
pub const FOV_Y: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

/// Avatar wedge in model space, pitched flat by the model transform
const AVATAR_VERTICES: [Vec3; 4] = [
    Vec3::new(-0.75, -1.0, 0.75),
    Vec3::new(0.0, 0.25, 1.0),
    Vec3::new(0.75, -1.0, 0.75),
    Vec3::new(0.0, -1.0, 1.0),
];
const AVATAR_INDICES: [usize; 6] = [2, 1, 3, 3, 1, 0];

/// Perspective camera riding with the avatar
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    /// Rotation about the view axis (radians)
    pub roll: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn follow(state: &GameState, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(state.avatar_x, CAMERA_HEIGHT, state.avatar_z),
            roll: state.avatar_roll,
            aspect,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(FOV_Y.to_radians(), self.aspect, NEAR, FAR);
        let camera_to_world = Mat4::from_translation(self.eye) * Mat4::from_rotation_z(self.roll);
        proj * camera_to_world.inverse()
    }
}

/// A quad queued for back-to-front drawing
struct Face {
    depth: f32,
    corners: [Vec3; 4],
    color: [f32; 4],
}

/// The six faces of a box with their outward normals and shading
fn box_faces(b: &Aabb) -> [([Vec3; 4], Vec3, f32); 6] {
    let (lo, hi) = (b.min, b.max);
    [
        // +x
        (
            [
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
                Vec3::new(hi.x, hi.y, hi.z),
            ],
            Vec3::X,
            0.8,
        ),
        // -x
        (
            [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(lo.x, lo.y, hi.z),
                Vec3::new(lo.x, hi.y, hi.z),
                Vec3::new(lo.x, hi.y, lo.z),
            ],
            Vec3::NEG_X,
            0.8,
        ),
        // +y (top)
        (
            [
                Vec3::new(lo.x, hi.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
                Vec3::new(hi.x, hi.y, lo.z),
                Vec3::new(lo.x, hi.y, lo.z),
            ],
            Vec3::Y,
            1.0,
        ),
        // -y
        (
            [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(lo.x, lo.y, hi.z),
            ],
            Vec3::NEG_Y,
            0.5,
        ),
        // +z (faces the camera)
        (
            [
                Vec3::new(lo.x, lo.y, hi.z),
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
                Vec3::new(lo.x, hi.y, hi.z),
            ],
            Vec3::Z,
            0.9,
        ),
        // -z
        (
            [
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(lo.x, hi.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
            ],
            Vec3::NEG_Z,
            0.9,
        ),
    ]
}

fn project(view_proj: &Mat4, p: Vec3) -> [f32; 4] {
    (*view_proj * Vec4::new(p.x, p.y, p.z, 1.0)).to_array()
}

fn push_quad(out: &mut Vec<Vertex>, view_proj: &Mat4, corners: &[Vec3; 4], color: [f32; 4]) {
    for i in [0, 1, 2, 0, 2, 3] {
        out.push(Vertex::new(project(view_proj, corners[i]), color));
    }
}

/// Build the frame's triangle list
pub fn build_scene(session: &Session, aspect: f32) -> Vec<Vertex> {
    let state = &session.state;
    let camera = Camera::follow(state, aspect);
    let view_proj = camera.view_proj();
    let mut vertices = Vec::with_capacity(12 + session.obstacles.len() * 18);

    // Floor follows the avatar so it never runs out
    let half = FLOOR_SIZE / 2.0;
    let (cx, cz) = (state.avatar_x, state.avatar_z);
    push_quad(
        &mut vertices,
        &view_proj,
        &[
            Vec3::new(cx - half, FLOOR_Y, cz + half),
            Vec3::new(cx + half, FLOOR_Y, cz + half),
            Vec3::new(cx + half, FLOOR_Y, cz - half),
            Vec3::new(cx - half, FLOOR_Y, cz - half),
        ],
        colors::from_hex(colors::FLOOR),
    );

    let mut faces = Vec::new();
    for obstacle in &session.obstacles {
        let b = &obstacle.bounds;
        // Entirely behind the camera or past the far plane
        if b.min.z > camera.eye.z || camera.eye.z - b.max.z > FAR {
            continue;
        }
        let base = colors::from_hex(obstacle.color);
        for (corners, normal, light) in box_faces(b) {
            let center = (corners[0] + corners[2]) * 0.5;
            if normal.dot(camera.eye - center) <= 0.0 {
                continue;
            }
            faces.push(Face {
                depth: camera.eye.distance_squared(center),
                corners,
                color: colors::shade(base, light),
            });
        }
    }
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    for face in &faces {
        push_quad(&mut vertices, &view_proj, &face.corners, face.color);
    }

    // Avatar disappears when the run ends
    if !state.game_over {
        let model = Mat4::from_translation(Vec3::new(
            state.avatar_x,
            AVATAR_Y,
            state.avatar_z - AVATAR_OFFSET_Z,
        )) * Mat4::from_rotation_x(-FRAC_PI_2)
            * Mat4::from_rotation_y(state.avatar_roll);
        let color = colors::from_hex(colors::AVATAR);
        for i in AVATAR_INDICES {
            let p = model.transform_point3(AVATAR_VERTICES[i]);
            vertices.push(Vertex::new(project(&view_proj, p), color));
        }
    }

    vertices
}
