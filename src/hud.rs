//! HUD overlay text
//!
//! The simulation only reports a [`MessageState`]; this is the single place
//! that turns it into the strings shown on the page.

use crate::sim::MessageState;

pub const DEBUG_TEXT: &str = "DEBUG MODE ON";
pub const PAUSED_TEXT: &str = "Game Paused (Press 'esc' to Unpause)";
pub const GAME_OVER_TEXT: &str = "Game Over (Reload Page to Play Again)";

pub fn message_text(message: MessageState) -> &'static str {
    match message {
        MessageState::None => "",
        MessageState::Debug => DEBUG_TEXT,
        MessageState::Paused => PAUSED_TEXT,
        MessageState::DebugPaused => "DEBUG MODE ON\nGame Paused (Press 'esc' to Unpause)",
        MessageState::Over => GAME_OVER_TEXT,
        MessageState::DebugOver => "DEBUG MODE ON\nGame Over (Reload Page to Play Again)",
    }
}

pub fn score_text(score: u64) -> String {
    format!("Score: {}", score)
}
