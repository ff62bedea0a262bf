//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session by one frame.

use super::collision::avatar_bounds;
use super::expiry::fire_due;
use super::input::{self, Key};
use super::state::{FrameReport, GameState, MessageState, Session};
use super::{autopilot, spawner};
use crate::tuning::Tuning;

impl Session {
    /// Key press; returns the new message state when pause/debug changed
    pub fn key_down(&mut self, key: Key) -> Option<MessageState> {
        if key == Key::Autopilot {
            self.autopilot = !self.autopilot;
            if !self.autopilot {
                self.state.steering_left = false;
                self.state.steering_right = false;
            }
            log::info!("Autopilot: {}", self.autopilot);
            return None;
        }
        let message = input::key_down(&mut self.state, key);
        if let Some(m) = message {
            log::debug!("Message state -> {:?}", m);
        }
        message
    }

    pub fn key_up(&mut self, key: Key) {
        // Held keys are ignored while the autopilot drives
        if !self.autopilot {
            input::key_up(&mut self.state, key);
        }
    }

    pub fn request_pause(&mut self) -> Option<MessageState> {
        input::request_pause(&mut self.state)
    }
}

/// Steering roll: lean into the turn, otherwise settle back to level
fn update_roll(state: &mut GameState, tuning: &Tuning) {
    let step = tuning.roll_step;
    if state.steering_right_only() && !state.game_over {
        state.avatar_roll = (state.avatar_roll + step).min(tuning.roll_cap);
    } else if state.steering_left_only() && !state.game_over {
        state.avatar_roll = (state.avatar_roll - step).max(-tuning.roll_cap);
    } else if state.avatar_roll > 0.0 {
        state.avatar_roll = (state.avatar_roll - step).max(0.0);
    } else if state.avatar_roll < 0.0 {
        state.avatar_roll = (state.avatar_roll + step).min(0.0);
    }
}

fn update_strafe(state: &mut GameState, tuning: &Tuning) {
    if state.game_over {
        return;
    }
    let strafe = tuning.base_strafe + state.speed * tuning.strafe_factor;
    if state.steering_right_only() {
        state.avatar_x += strafe;
    } else if state.steering_left_only() {
        state.avatar_x -= strafe;
    }
}

/// Ramp toward the cap while alive, brake to a stop once over
fn update_speed(state: &mut GameState, tuning: &Tuning) {
    if state.game_over {
        state.speed = (state.speed - tuning.brake).max(0.0);
    } else if state.speed <= tuning.speed_cap {
        state.speed = (state.speed + tuning.speed_ramp).min(tuning.speed_cap);
    }
}

/// Advance the session by one frame
pub fn tick(session: &mut Session) -> FrameReport {
    let now = session.advance_clock();
    let mut report = FrameReport::default();

    // Don't tick if paused
    if session.state.paused {
        return report;
    }
    report.ran = true;

    report.expired = fire_due(session);

    if session.autopilot && !session.state.game_over {
        autopilot::apply(&mut session.state, &session.obstacles);
    }

    let tuning = &session.tuning;
    let state = &mut session.state;

    // Constant forward motion
    state.avatar_z -= state.speed;
    update_roll(state, tuning);
    update_strafe(state, tuning);

    let avatar = avatar_bounds(state.avatar_x, state.avatar_z);

    if let Some(mut obstacle) = spawner::maybe_spawn(
        &session.state,
        &session.obstacles,
        &mut session.rng,
        &session.tuning,
        0,
        now,
    ) {
        obstacle.id = session.next_obstacle_id();
        report.spawned = Some(obstacle.id);
        report.evicted = session.insert_obstacle(obstacle);
    }

    update_speed(&mut session.state, &session.tuning);

    report.collided = session
        .obstacles
        .iter()
        .any(|o| avatar.intersects(&o.bounds));

    let state = &mut session.state;
    if report.collided
        && state.score > session.tuning.grace_score
        && !state.debug_mode
        && !state.game_over
    {
        state.game_over = true;
        report.message = Some(state.message());
        log::info!("Game over at score {}", state.score);
    }

    if !state.game_over {
        state.score += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    /// Put a cube where the avatar body will be after the next tick
    fn block_next_frame(session: &mut Session) -> u32 {
        let x = session.state.avatar_x;
        let z = session.state.avatar_z - session.state.speed - AVATAR_OFFSET_Z;
        session.place_obstacle(x, z, 0xFFFFFF)
    }

    /// Session where nothing spawns on its own
    fn quiet_session() -> Session {
        let mut session = Session::new(12345);
        session.state.speed = 0.5;
        session.tuning.spawn_distance = 500.0;
        session
    }

    #[test]
    fn test_forward_motion_and_score() {
        let mut session = Session::new(1);
        let z0 = session.state.avatar_z;
        let report = tick(&mut session);
        assert!(report.ran);
        assert_eq!(session.state.score, 1);
        assert!((session.state.avatar_z - (z0 - INITIAL_SPEED)).abs() < 1e-5);
        // Score 0 is a spawn frame
        assert!(report.spawned.is_some());
        assert_eq!(session.obstacles.len(), 1);
    }

    #[test]
    fn test_collision_ends_game_after_grace() {
        let mut session = quiet_session();
        session.state.score = 201;
        block_next_frame(&mut session);

        let report = tick(&mut session);
        assert!(report.collided);
        assert!(session.state.game_over);
        assert_eq!(report.message, Some(MessageState::Over));
        assert_eq!(session.state.score, 201);

        // Overlap ends but the game stays over
        session.obstacles.clear();
        for _ in 0..10 {
            let report = tick(&mut session);
            assert!(!report.collided);
            assert_eq!(report.message, None);
        }
        assert!(session.state.game_over);
        assert_eq!(session.state.score, 201);
    }

    #[test]
    fn test_debug_mode_ignores_collision() {
        let mut session = quiet_session();
        session.state.score = 201;
        session.state.debug_mode = true;
        block_next_frame(&mut session);

        let report = tick(&mut session);
        assert!(report.collided);
        assert!(!session.state.game_over);
        assert_eq!(session.state.score, 202);
    }

    #[test]
    fn test_grace_period_ignores_collision() {
        let mut session = quiet_session();
        session.state.score = 50;
        block_next_frame(&mut session);

        let report = tick(&mut session);
        assert!(report.collided);
        assert!(!session.state.game_over);

        // Exactly at the threshold is still shielded
        let mut session = quiet_session();
        session.state.score = GRACE_SCORE;
        block_next_frame(&mut session);
        tick(&mut session);
        assert!(!session.state.game_over);
    }

    #[test]
    fn test_pause_key_ignored_when_over() {
        let mut session = quiet_session();
        session.state.game_over = true;
        assert_eq!(session.key_down(Key::Pause), None);
        assert!(!session.state.paused);
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let mut session = Session::new(4);
        for _ in 0..20 {
            tick(&mut session);
        }
        session.key_down(Key::Pause);
        let before = session.state.clone();
        let live = session.obstacles.len();

        for _ in 0..50 {
            let report = tick(&mut session);
            assert!(!report.ran);
        }
        assert_eq!(session.state, before);
        assert_eq!(session.obstacles.len(), live);
        assert_eq!(session.clock(), 70);
    }

    #[test]
    fn test_expiry_suspended_while_paused() {
        let mut session = quiet_session();
        let id = session.place_obstacle(100.0, 0.0, 0);
        let due = session.obstacles[0].expires_at;

        session.key_down(Key::Pause);
        while session.clock() < due + 10 {
            tick(&mut session);
        }
        assert!(session.obstacles.iter().any(|o| o.id == id));

        session.key_down(Key::Pause);
        let report = tick(&mut session);
        assert_eq!(report.expired, 1);
        assert!(session.obstacles.iter().all(|o| o.id != id));
    }

    #[test]
    fn test_obstacles_expire_after_ttl() {
        let mut session = quiet_session();
        let id = session.place_obstacle(100.0, 0.0, 0);
        let due = session.obstacles[0].expires_at;
        assert_eq!(due, session.ttl_ticks(0.5));

        while session.clock() + 1 < due {
            tick(&mut session);
        }
        assert!(session.obstacles.iter().any(|o| o.id == id));
        let report = tick(&mut session);
        assert_eq!(report.expired, 1);
        assert!(session.obstacles.iter().all(|o| o.id != id));
    }

    #[test]
    fn test_roll_leans_and_recovers() {
        let mut session = quiet_session();
        session.key_down(Key::Right);
        for _ in 0..100 {
            tick(&mut session);
        }
        assert_eq!(session.state.avatar_roll, ROLL_CAP);
        assert!(session.state.avatar_x > 0.0);

        session.key_up(Key::Right);
        for _ in 0..100 {
            tick(&mut session);
        }
        assert_eq!(session.state.avatar_roll, 0.0);
    }

    #[test]
    fn test_both_keys_cancel_out() {
        let mut session = quiet_session();
        session.key_down(Key::Left);
        session.key_down(Key::Right);
        for _ in 0..10 {
            tick(&mut session);
        }
        assert_eq!(session.state.avatar_x, 0.0);
        assert_eq!(session.state.avatar_roll, 0.0);
    }

    #[test]
    fn test_strafe_scales_with_speed() {
        let mut session = quiet_session();
        session.key_down(Key::Left);
        tick(&mut session);
        let expected = -(BASE_STRAFE + 0.5 * STRAFE_FACTOR);
        assert!((session.state.avatar_x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_no_steering_once_over() {
        let mut session = quiet_session();
        session.state.game_over = true;
        session.state.avatar_roll = 0.1;
        session.key_down(Key::Right);
        tick(&mut session);
        assert_eq!(session.state.avatar_x, 0.0);
        assert!(session.state.avatar_roll < 0.1);
    }

    #[test]
    fn test_speed_caps_exactly() {
        let mut session = quiet_session();
        session.state.speed = SPEED_CAP - SPEED_RAMP * 0.5;
        tick(&mut session);
        assert_eq!(session.state.speed, SPEED_CAP);
        tick(&mut session);
        assert_eq!(session.state.speed, SPEED_CAP);
    }

    #[test]
    fn test_brakes_to_exact_zero() {
        let mut session = quiet_session();
        session.state.game_over = true;
        let mut last = session.state.speed;
        for _ in 0..400 {
            tick(&mut session);
            assert!(session.state.speed <= last);
            assert!(session.state.speed >= 0.0);
            last = session.state.speed;
        }
        assert_eq!(session.state.speed, 0.0);
    }

    #[test]
    fn test_live_set_stays_bounded() {
        let mut session = Session::new(8);
        session.state.speed = SPEED_CAP;
        session.tuning.max_live_obstacles = 32;
        session.tuning.base_ttl = 1.0e6;
        let mut evicted = 0;
        for _ in 0..200 {
            evicted += tick(&mut session).evicted;
            assert!(session.obstacles.len() <= 32);
        }
        assert!(evicted > 0);
    }

    #[test]
    fn test_autopilot_toggle() {
        let mut session = quiet_session();
        assert_eq!(session.key_down(Key::Autopilot), None);
        assert!(session.autopilot);
        session.key_down(Key::Autopilot);
        assert!(!session.autopilot);
        assert!(!session.state.steering_left && !session.state.steering_right);
    }

    #[test]
    fn test_determinism() {
        let mut a = Session::new(99999);
        let mut b = Session::new(99999);
        for i in 0..300 {
            if i == 40 {
                a.key_down(Key::Left);
                b.key_down(Key::Left);
            }
            tick(&mut a);
            tick(&mut b);
        }
        assert_eq!(a.state, b.state);
        assert_eq!(a.obstacles, b.obstacles);
    }

    #[derive(Debug, Clone, Copy)]
    enum Event {
        Down(bool),
        Up(bool),
        Pause,
        Frame,
    }

    fn event() -> impl Strategy<Value = Event> {
        prop_oneof![
            any::<bool>().prop_map(Event::Down),
            any::<bool>().prop_map(Event::Up),
            Just(Event::Pause),
            Just(Event::Frame),
            Just(Event::Frame),
            Just(Event::Frame),
        ]
    }

    fn key(right: bool) -> Key {
        if right { Key::Right } else { Key::Left }
    }

    proptest! {
        #[test]
        fn prop_roll_stays_within_cap(seed in any::<u64>(), events in prop::collection::vec(event(), 1..400)) {
            let mut session = Session::new(seed);
            for e in events {
                match e {
                    Event::Down(r) => { session.key_down(key(r)); }
                    Event::Up(r) => session.key_up(key(r)),
                    Event::Pause => { session.key_down(Key::Pause); }
                    Event::Frame => { tick(&mut session); }
                }
                prop_assert!(session.state.avatar_roll.abs() <= ROLL_CAP);
            }
        }

        #[test]
        fn prop_speed_and_score_while_alive(
            seed in any::<u64>(),
            start in INITIAL_SPEED..SPEED_CAP,
            frames in 1usize..300,
        ) {
            let mut session = Session::new(seed);
            session.state.speed = start;
            session.state.debug_mode = true;
            for _ in 0..frames {
                let speed = session.state.speed;
                let score = session.state.score;
                tick(&mut session);
                prop_assert!(session.state.speed >= speed);
                prop_assert!(session.state.speed <= SPEED_CAP);
                prop_assert_eq!(session.state.score, score + 1);
            }
        }

        #[test]
        fn prop_paused_frames_freeze_state(seed in any::<u64>(), warmup in 0usize..100, paused in 1usize..100) {
            let mut session = Session::new(seed);
            for _ in 0..warmup {
                tick(&mut session);
            }
            session.key_down(Key::Pause);
            let before = session.state.clone();
            for _ in 0..paused {
                tick(&mut session);
            }
            prop_assert_eq!(&session.state, &before);
        }

        #[test]
        fn prop_score_frozen_and_speed_falls_once_over(seed in any::<u64>(), frames in 1usize..400) {
            let mut session = Session::new(seed);
            session.state.score = 500;
            session.state.game_over = true;
            for _ in 0..frames {
                let speed = session.state.speed;
                tick(&mut session);
                prop_assert!(session.state.speed <= speed);
                prop_assert!(session.state.speed >= 0.0);
                prop_assert_eq!(session.state.score, 500);
            }
        }
    }
}
