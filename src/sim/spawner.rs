//! Procedural obstacle spawning
//!
//! Cubes appear in a band ahead of the avatar. The band narrows and the
//! cadence quickens as speed rises.

use rand::Rng;

use super::state::{GameState, Obstacle};
use crate::tuning::{Palette, Tuning};

const PRIMARIES: [u32; 3] = [0xFF0000, 0x00FF00, 0x0000FF];

/// Spawn every Nth score point; never zero
pub fn spawn_interval(speed: f32) -> u64 {
    let steps = (speed * 10.0).floor().max(0.0) as u64;
    6u64.saturating_sub(steps).max(1)
}

pub fn should_spawn(state: &GameState) -> bool {
    state.speed > 0.0 && state.score % spawn_interval(state.speed) == 0
}

/// Half the width of the spawn band at `speed`
pub fn spawn_half_width(speed: f32, tuning: &Tuning) -> f32 {
    ((tuning.spawn_base_width - speed * tuning.spawn_width_factor) / 2.0).max(0.0)
}

/// A chosen spawn position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub z: f32,
    /// False when the retry limit was hit and the last candidate was kept
    pub clear: bool,
}

/// True if (x, z) is outside the exclusion square of every live obstacle
pub fn position_is_clear(x: f32, z: f32, live: &[Obstacle], radius: f32) -> bool {
    !live
        .iter()
        .any(|o| (o.x - x).abs() < radius && (o.z - z).abs() < radius)
}

fn draw_candidate<R: Rng>(state: &GameState, tuning: &Tuning, rng: &mut R) -> (f32, f32) {
    let half_width = spawn_half_width(state.speed, tuning);
    let x = rng.random_range(state.avatar_x - half_width..=state.avatar_x + half_width);
    let z = state.avatar_z - tuning.spawn_distance + rng.random_range(0.0..tuning.spawn_depth);
    (x, z)
}

/// Pick a spawn position, honouring the exclusion radius when enabled
pub fn choose_position<R: Rng>(
    state: &GameState,
    live: &[Obstacle],
    tuning: &Tuning,
    rng: &mut R,
) -> Placement {
    let (mut x, mut z) = draw_candidate(state, tuning, rng);
    if !tuning.collision_aware_spawning {
        return Placement { x, z, clear: true };
    }

    for _ in 1..tuning.spawn_retry_limit {
        if position_is_clear(x, z, live, tuning.exclusion_radius) {
            return Placement { x, z, clear: true };
        }
        (x, z) = draw_candidate(state, tuning, rng);
    }

    let clear = position_is_clear(x, z, live, tuning.exclusion_radius);
    if !clear {
        log::debug!("Spawn retries exhausted, accepting crowded position ({x:.1}, {z:.1})");
    }
    Placement { x, z, clear }
}

pub fn choose_color<R: Rng>(palette: Palette, rng: &mut R) -> u32 {
    match palette {
        Palette::Random => rng.random_range(0..=0xFF_FFFF),
        Palette::Primaries => PRIMARIES[rng.random_range(0..PRIMARIES.len())],
    }
}

/// Produce this tick's obstacle, if the cadence allows one
pub fn maybe_spawn<R: Rng>(
    state: &GameState,
    live: &[Obstacle],
    rng: &mut R,
    tuning: &Tuning,
    id: u32,
    now: u64,
) -> Option<Obstacle> {
    if !should_spawn(state) {
        return None;
    }
    let placement = choose_position(state, live, tuning, rng);
    let color = choose_color(tuning.palette, rng);
    let mut obstacle = Obstacle::new(id, placement.x, placement.z, color, tuning.obstacle_size);
    obstacle.spawn_tick = now;
    Some(obstacle)
}
