//! delve-core: procedural dungeon generation and exploration engine
//!
//! This crate contains the floor generator (rooms, corridors, doors, traps,
//! secret rooms, interactables) and the turn-stepped runtime controller that
//! drives party movement, fog of war, detection rolls, and enemy AI.
//! It has no I/O dependencies and is designed to be pure and testable.
//!
//! Combat resolution, the overworld, dialogue, and rendering live elsewhere;
//! they are consumed through the [`content::DungeonContent`] seam.

pub mod content;
pub mod dungeon;
pub mod enemy;
pub mod party;
pub mod state;

mod consts;
mod rng;

pub use consts::*;
pub use rng::{floor_seed, GameRng};
