//! Data-driven game balance
//!
//! Defaults come from [`crate::consts`]. A tuning file only needs to name the
//! values it overrides; everything else falls back to the default.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or validating tuning
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("tuning JSON error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// How obstacle colours are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Any 24-bit RGB value
    #[default]
    Random,
    /// Pure red, green or blue
    Primaries,
}

/// Which obstacle an expiry entry removes when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// The obstacle that scheduled the entry
    #[default]
    Targeted,
    /// Whichever obstacle is oldest, regardless of which entry fired
    Oldest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub initial_speed: f32,
    pub speed_cap: f32,
    pub speed_ramp: f32,
    pub brake: f32,

    pub roll_step: f32,
    pub roll_cap: f32,
    pub base_strafe: f32,
    pub strafe_factor: f32,

    pub spawn_base_width: f32,
    pub spawn_width_factor: f32,
    pub spawn_distance: f32,
    pub spawn_depth: f32,
    /// Reject spawn positions too close to a live obstacle
    pub collision_aware_spawning: bool,
    pub exclusion_radius: f32,
    pub spawn_retry_limit: u32,
    pub palette: Palette,

    pub obstacle_size: f32,
    pub base_ttl: f32,
    pub expiry_policy: ExpiryPolicy,
    pub max_live_obstacles: usize,

    pub grace_score: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_speed: INITIAL_SPEED,
            speed_cap: SPEED_CAP,
            speed_ramp: SPEED_RAMP,
            brake: BRAKE,

            roll_step: ROLL_STEP,
            roll_cap: ROLL_CAP,
            base_strafe: BASE_STRAFE,
            strafe_factor: STRAFE_FACTOR,

            spawn_base_width: SPAWN_BASE_WIDTH,
            spawn_width_factor: SPAWN_WIDTH_FACTOR,
            spawn_distance: SPAWN_DISTANCE,
            spawn_depth: SPAWN_DEPTH,
            collision_aware_spawning: true,
            exclusion_radius: EXCLUSION_RADIUS,
            spawn_retry_limit: SPAWN_RETRY_LIMIT,
            palette: Palette::Random,

            obstacle_size: OBSTACLE_SIZE,
            base_ttl: BASE_TTL,
            expiry_policy: ExpiryPolicy::Targeted,
            max_live_obstacles: MAX_LIVE_OBSTACLES,

            grace_score: GRACE_SCORE,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check ranges the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }
        fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be zero or positive",
                })
            }
        }

        positive("speed_cap", self.speed_cap)?;
        non_negative("initial_speed", self.initial_speed)?;
        if self.initial_speed > self.speed_cap {
            return Err(TuningError::Invalid {
                field: "initial_speed",
                reason: "must not exceed speed_cap",
            });
        }
        non_negative("speed_ramp", self.speed_ramp)?;
        positive("brake", self.brake)?;
        positive("roll_step", self.roll_step)?;
        non_negative("roll_cap", self.roll_cap)?;
        non_negative("base_strafe", self.base_strafe)?;
        non_negative("strafe_factor", self.strafe_factor)?;
        non_negative("spawn_base_width", self.spawn_base_width)?;
        non_negative("spawn_width_factor", self.spawn_width_factor)?;
        non_negative("spawn_distance", self.spawn_distance)?;
        positive("spawn_depth", self.spawn_depth)?;
        non_negative("exclusion_radius", self.exclusion_radius)?;
        if self.spawn_retry_limit == 0 {
            return Err(TuningError::Invalid {
                field: "spawn_retry_limit",
                reason: "must allow at least one attempt",
            });
        }
        positive("obstacle_size", self.obstacle_size)?;
        positive("base_ttl", self.base_ttl)?;
        if self.max_live_obstacles == 0 {
            return Err(TuningError::Invalid {
                field: "max_live_obstacles",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
