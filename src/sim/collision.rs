//! Axis-aligned bounding boxes for avatar/obstacle overlap tests

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{AVATAR_HALF_WIDTH, AVATAR_OFFSET_Z, AVATAR_Y};

/// An axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Cube of edge `size` centred on `center`
    pub fn cube(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test; boxes that only touch count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// World-space bounds of the avatar body for a camera at (x, z).
///
/// The body sits AVATAR_OFFSET_Z ahead of the camera. Its mesh is pitched -90
/// degrees, which leaves it a thin wedge: 0.25 tall, 1.25 deep.
pub fn avatar_bounds(avatar_x: f32, avatar_z: f32) -> Aabb {
    let body_z = avatar_z - AVATAR_OFFSET_Z;
    Aabb {
        min: Vec3::new(avatar_x - AVATAR_HALF_WIDTH, AVATAR_Y + 0.75, body_z - 0.25),
        max: Vec3::new(avatar_x + AVATAR_HALF_WIDTH, AVATAR_Y + 1.0, body_z + 1.0),
    }
}
