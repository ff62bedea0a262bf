//! Demo steering
//!
//! Looks a short way down the track and steers away from the nearest cube
//! that would clip the avatar. Only ever writes the two steering flags.

use super::collision::avatar_bounds;
use super::state::{GameState, Obstacle};

/// How far ahead of the avatar body to look (world units)
const LOOKAHEAD: f32 = 25.0;
/// Lateral clearance the autopilot tries to keep
const MARGIN: f32 = 2.0;

/// Which way to steer this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Steer {
    pub left: bool,
    pub right: bool,
}

pub fn steer(state: &GameState, obstacles: &[Obstacle]) -> Steer {
    let body = avatar_bounds(state.avatar_x, state.avatar_z);
    let reach = body.min.z - LOOKAHEAD;

    let threat = obstacles
        .iter()
        .filter(|o| o.bounds.max.z >= reach && o.bounds.min.z <= body.max.z)
        .filter(|o| {
            o.bounds.max.x >= body.min.x - MARGIN && o.bounds.min.x <= body.max.x + MARGIN
        })
        // Nearest first: largest z is closest to the camera
        .max_by(|a, b| a.z.total_cmp(&b.z));

    match threat {
        Some(o) if o.x >= state.avatar_x => Steer {
            left: true,
            right: false,
        },
        Some(_) => Steer {
            left: false,
            right: true,
        },
        None => Steer::default(),
    }
}

pub fn apply(state: &mut GameState, obstacles: &[Obstacle]) {
    let s = steer(state, obstacles);
    state.steering_left = s.left;
    state.steering_right = s.right;
}
