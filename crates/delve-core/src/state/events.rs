//! Events surfaced by a party step.

use serde::{Deserialize, Serialize};

use crate::content::Item;
use crate::dungeon::{InteractableKind, SaveOutcome};

/// The outward-facing result of one movement step (or an explicit floor
/// transition). Exactly one event is surfaced per step; enemy contact
/// outranks whatever the destination tile produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEvent {
    /// Nothing happened, or the move was blocked.
    None,
    /// The party stands on the down staircase.
    StairsDown,
    /// The party stands on an up staircase.
    StairsUp,
    /// The party stands on the dungeon entrance and may leave.
    ExitDungeon,
    /// A chest was opened.
    Treasure { gold: u32, items: Vec<Item> },
    /// A trap fired; one outcome per affected character.
    Trap {
        name: String,
        outcomes: Vec<SaveOutcome>,
    },
    /// A lore pickup was read.
    Journal { title: String, text: String },
    /// An interactable was used. `boon` is always true except for an altar
    /// that bit back.
    Interactable {
        kind: InteractableKind,
        magnitude: u32,
        boon: bool,
    },
    /// A placed encounter fired.
    FixedEncounter { encounter_key: String },
    /// The dungeon boss was engaged.
    BossEncounter { encounter_key: String },
    /// A wandering-monster roll came up.
    RandomEncounter { encounter_key: String },
    /// A patrolling or chasing enemy reached the party.
    EnemyContact { encounter_key: String },
}
