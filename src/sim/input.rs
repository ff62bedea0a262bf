//! Keyboard input tracking
//!
//! Key events arrive between ticks and flip flags on [`GameState`]. Toggles
//! return the new [`MessageState`] so the overlay can be refreshed.

use super::state::{GameState, MessageState};

/// Game actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Pause,
    Debug,
    Autopilot,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "a" | "ArrowLeft" => Some(Key::Left),
            "d" | "ArrowRight" => Some(Key::Right),
            "Escape" | "p" => Some(Key::Pause),
            "`" => Some(Key::Debug),
            "i" => Some(Key::Autopilot),
            _ => None,
        }
    }

    /// Keys that flip state on press rather than being held
    pub fn is_toggle(self) -> bool {
        matches!(self, Key::Pause | Key::Debug | Key::Autopilot)
    }
}

pub fn key_down(state: &mut GameState, key: Key) -> Option<MessageState> {
    match key {
        Key::Left => {
            state.steering_left = true;
            None
        }
        Key::Right => {
            state.steering_right = true;
            None
        }
        Key::Pause => {
            if state.paused {
                state.paused = false;
            } else if !state.game_over {
                state.paused = true;
            } else {
                return None;
            }
            Some(state.message())
        }
        Key::Debug => {
            state.debug_mode = !state.debug_mode;
            Some(state.message())
        }
        Key::Autopilot => None,
    }
}

pub fn key_up(state: &mut GameState, key: Key) {
    match key {
        Key::Left => state.steering_left = false,
        Key::Right => state.steering_right = false,
        _ => {}
    }
}

/// Pause without toggling (focus loss). No effect once paused or over.
pub fn request_pause(state: &mut GameState) -> Option<MessageState> {
    if state.paused || state.game_over {
        return None;
    }
    state.paused = true;
    Some(state.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn fresh() -> GameState {
        GameState::new(&Tuning::default())
    }

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(Key::from_dom("a"), Some(Key::Left));
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom("d"), Some(Key::Right));
        assert_eq!(Key::from_dom("ArrowRight"), Some(Key::Right));
        assert_eq!(Key::from_dom("Escape"), Some(Key::Pause));
        assert_eq!(Key::from_dom("p"), Some(Key::Pause));
        assert_eq!(Key::from_dom("`"), Some(Key::Debug));
        assert_eq!(Key::from_dom("w"), None);
        assert!(!Key::Left.is_toggle());
        assert!(Key::Pause.is_toggle());
    }

    #[test]
    fn test_steering_press_release() {
        let mut state = fresh();
        assert_eq!(key_down(&mut state, Key::Left), None);
        key_down(&mut state, Key::Right);
        assert!(state.steering_left && state.steering_right);
        assert!(!state.steering_left_only());

        key_up(&mut state, Key::Right);
        assert!(state.steering_left_only());
        key_up(&mut state, Key::Left);
        assert!(!state.steering_left);
    }

    #[test]
    fn test_pause_toggle_messages() {
        let mut state = fresh();
        assert_eq!(key_down(&mut state, Key::Pause), Some(MessageState::Paused));
        assert!(state.paused);
        assert_eq!(key_down(&mut state, Key::Pause), Some(MessageState::None));
        assert!(!state.paused);
    }

    #[test]
    fn test_pause_ignored_when_over() {
        let mut state = fresh();
        state.game_over = true;
        assert_eq!(key_down(&mut state, Key::Pause), None);
        assert!(!state.paused);
        assert_eq!(request_pause(&mut state), None);
        assert!(!state.paused);
    }

    #[test]
    fn test_debug_toggles_in_any_state() {
        let mut state = fresh();
        assert_eq!(key_down(&mut state, Key::Debug), Some(MessageState::Debug));
        key_down(&mut state, Key::Pause);
        assert_eq!(state.message(), MessageState::DebugPaused);
        assert_eq!(key_down(&mut state, Key::Debug), Some(MessageState::Paused));

        state.paused = false;
        state.game_over = true;
        assert_eq!(key_down(&mut state, Key::Debug), Some(MessageState::DebugOver));
        assert_eq!(key_down(&mut state, Key::Debug), Some(MessageState::Over));
    }

    #[test]
    fn test_request_pause_only_pauses() {
        let mut state = fresh();
        assert_eq!(request_pause(&mut state), Some(MessageState::Paused));
        assert_eq!(request_pause(&mut state), None);
        assert!(state.paused);
    }
}
