//! Game state and core simulation types

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::expiry::ExpiryQueue;
use crate::consts::START_Z;
use crate::tuning::Tuning;

/// What the message overlay should say, derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageState {
    None,
    Debug,
    Paused,
    DebugPaused,
    Over,
    DebugOver,
}

impl MessageState {
    pub fn from_flags(paused: bool, debug_mode: bool, game_over: bool) -> Self {
        match (game_over, paused, debug_mode) {
            (true, _, false) => MessageState::Over,
            (true, _, true) => MessageState::DebugOver,
            (false, true, false) => MessageState::Paused,
            (false, true, true) => MessageState::DebugPaused,
            (false, false, true) => MessageState::Debug,
            (false, false, false) => MessageState::None,
        }
    }
}

/// Per-session gameplay variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    /// Forward distance per tick
    pub speed: f32,
    pub steering_left: bool,
    pub steering_right: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Collisions never end the game while set
    pub debug_mode: bool,
    pub avatar_x: f32,
    pub avatar_z: f32,
    /// Camera roll (radians, positive when steering right)
    pub avatar_roll: f32,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            speed: tuning.initial_speed,
            steering_left: false,
            steering_right: false,
            paused: false,
            game_over: false,
            debug_mode: false,
            avatar_x: 0.0,
            avatar_z: START_Z,
            avatar_roll: 0.0,
        }
    }

    pub fn message(&self) -> MessageState {
        MessageState::from_flags(self.paused, self.debug_mode, self.game_over)
    }

    /// Right pressed and left not
    pub fn steering_right_only(&self) -> bool {
        self.steering_right && !self.steering_left
    }

    /// Left pressed and right not
    pub fn steering_left_only(&self) -> bool {
        self.steering_left && !self.steering_right
    }
}

/// An obstacle cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub z: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub bounds: Aabb,
    pub spawn_tick: u64,
    pub expires_at: u64,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, z: f32, color: u32, size: f32) -> Self {
        Self {
            id,
            x,
            z,
            color,
            bounds: Aabb::cube(Vec3::new(x, 0.0, z), size),
            spawn_tick: 0,
            expires_at: 0,
        }
    }
}

/// Summary of one call to [`super::tick`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// False when the tick was skipped because the game is paused
    pub ran: bool,
    /// New message state, if it changed this tick
    pub message: Option<MessageState>,
    /// Id of the obstacle spawned this tick
    pub spawned: Option<u32>,
    /// Obstacles removed by expiry
    pub expired: usize,
    /// Obstacles removed to keep the live set bounded
    pub evicted: usize,
    /// Avatar overlapped at least one obstacle
    pub collided: bool,
}

/// One play session: state, obstacles, scheduled expiries and RNG
#[derive(Debug, Clone)]
pub struct Session {
    pub state: GameState,
    /// Live obstacles in spawn order (oldest first)
    pub obstacles: Vec<Obstacle>,
    pub expiry: ExpiryQueue,
    pub tuning: Tuning,
    /// Demo steering
    pub autopilot: bool,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Ticks elapsed, including paused ones
    clock: u64,
    next_id: u32,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(&tuning),
            obstacles: Vec::new(),
            expiry: ExpiryQueue::default(),
            tuning,
            autopilot: false,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock: 0,
            next_id: 1,
        }
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub(crate) fn advance_clock(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Allocate a new obstacle ID
    pub fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ticks an obstacle spawned at `speed` stays alive
    pub fn ttl_ticks(&self, speed: f32) -> u64 {
        (self.tuning.base_ttl / speed.max(0.01)).ceil() as u64
    }

    /// Add an obstacle to the live set and schedule its expiry.
    ///
    /// Returns how many old obstacles were evicted to stay within
    /// `max_live_obstacles`.
    pub fn insert_obstacle(&mut self, mut obstacle: Obstacle) -> usize {
        obstacle.spawn_tick = self.clock;
        obstacle.expires_at = self.clock + self.ttl_ticks(self.state.speed);
        self.expiry.schedule(obstacle.expires_at, obstacle.id);
        self.obstacles.push(obstacle);

        let overflow = self
            .obstacles
            .len()
            .saturating_sub(self.tuning.max_live_obstacles);
        if overflow > 0 {
            self.obstacles.drain(..overflow);
            log::warn!(
                "Live obstacle limit ({}) reached, evicted {} oldest",
                self.tuning.max_live_obstacles,
                overflow
            );
        }
        overflow
    }

    /// Place a cube at (x, z) with a fresh id (used by tooling and tests)
    pub fn place_obstacle(&mut self, x: f32, z: f32, color: u32) -> u32 {
        let id = self.next_obstacle_id();
        let obstacle = Obstacle::new(id, x, z, color, self.tuning.obstacle_size);
        self.insert_obstacle(obstacle);
        id
    }

    /// Remove an obstacle by id, returning it if it was live
    pub fn remove_obstacle(&mut self, id: u32) -> Option<Obstacle> {
        let idx = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_flags() {
        assert_eq!(MessageState::from_flags(false, false, false), MessageState::None);
        assert_eq!(MessageState::from_flags(false, true, false), MessageState::Debug);
        assert_eq!(MessageState::from_flags(true, false, false), MessageState::Paused);
        assert_eq!(MessageState::from_flags(true, true, false), MessageState::DebugPaused);
        assert_eq!(MessageState::from_flags(false, false, true), MessageState::Over);
        assert_eq!(MessageState::from_flags(false, true, true), MessageState::DebugOver);
        // Over wins over paused
        assert_eq!(MessageState::from_flags(true, false, true), MessageState::Over);
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new(7);
        assert_eq!(session.state.score, 0);
        assert_eq!(session.state.speed, crate::consts::INITIAL_SPEED);
        assert_eq!(session.state.avatar_z, START_Z);
        assert!(session.obstacles.is_empty());
        assert_eq!(session.clock(), 0);
    }

    #[test]
    fn test_obstacle_ids_are_monotonic() {
        let mut session = Session::new(1);
        let a = session.place_obstacle(0.0, 0.0, 0xFF0000);
        let b = session.place_obstacle(5.0, 0.0, 0x00FF00);
        assert!(b > a);
        assert_eq!(session.obstacles[0].id, a);
        assert_eq!(session.expiry.len(), 2);
    }

    #[test]
    fn test_ttl_is_inverse_to_speed() {
        let session = Session::new(1);
        assert_eq!(session.ttl_ticks(0.5), 240);
        assert!((800..=801).contains(&session.ttl_ticks(0.15)));
        // Stopped avatar does not divide by zero
        assert!(session.ttl_ticks(0.0) > 0);
    }

    #[test]
    fn test_insert_evicts_oldest_past_limit() {
        let tuning = Tuning {
            max_live_obstacles: 3,
            ..Default::default()
        };
        let mut session = Session::with_tuning(1, tuning);
        let first = session.place_obstacle(0.0, 0.0, 0);
        for i in 0..3 {
            session.place_obstacle(i as f32 * 5.0, 0.0, 0);
        }
        assert_eq!(session.obstacles.len(), 3);
        assert!(session.obstacles.iter().all(|o| o.id != first));
    }

    #[test]
    fn test_remove_obstacle() {
        let mut session = Session::new(1);
        let id = session.place_obstacle(1.0, 2.0, 0);
        assert_eq!(session.remove_obstacle(id).map(|o| o.id), Some(id));
        assert!(session.remove_obstacle(id).is_none());
    }
}
