//! Floor-resident enemies.
//!
//! Enemies are spawned once per floor at generation time and persist for the
//! session, including their dead state.

mod ai;

pub use ai::{advance_enemies, EnemyTick};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::consts::{CHASE_COOLDOWN, ENEMY_ALERT_RANGE, ENEMY_CHASE_SPEED, PATROL_COOLDOWN};

/// Per-enemy AI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AiState {
    /// Wandering along a cached direction.
    Patrol,
    /// Closing on the party.
    Chase,
    /// Inert; excluded from occupancy.
    Dead,
}

/// A floor-resident enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub x: i32,
    pub y: i32,
    /// Opaque reference into external encounter data.
    pub encounter_key: String,
    pub state: AiState,
    /// Cached patrol direction (cardinal).
    pub dir: (i32, i32),
    /// Ticks until the next move is allowed.
    pub cooldown: u8,
    /// Manhattan distance at which patrol flips to chase.
    pub alert_range: i32,
    /// Tiles moved per chase step.
    pub chase_speed: u8,
}

impl Enemy {
    pub fn new(x: i32, y: i32, encounter_key: String, dir: (i32, i32)) -> Self {
        Self {
            x,
            y,
            encounter_key,
            state: AiState::Patrol,
            dir,
            cooldown: 0,
            alert_range: ENEMY_ALERT_RANGE,
            chase_speed: ENEMY_CHASE_SPEED,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state == AiState::Dead
    }

    pub fn kill(&mut self) {
        self.state = AiState::Dead;
    }

    /// Manhattan distance to a position.
    pub fn distance_to(&self, x: i32, y: i32) -> i32 {
        (self.x - x).abs() + (self.y - y).abs()
    }

    /// Cooldown applied after a move in the current state.
    pub fn move_cooldown(&self) -> u8 {
        match self.state {
            AiState::Chase => CHASE_COOLDOWN,
            _ => PATROL_COOLDOWN,
        }
    }
}
