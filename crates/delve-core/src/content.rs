//! External collaborators.
//!
//! Encounter data, story flags, lore, and item generation belong to other
//! subsystems. The engine consumes them through one trait so tests and the
//! real campaign layer can both plug in.

use serde::{Deserialize, Serialize};

use crate::party::Party;
use crate::rng::GameRng;

/// An item produced by the external item forge. Opaque to this engine apart
/// from the cursed marker used by risk/reward placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub cursed: bool,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cursed: false,
        }
    }

    pub fn cursed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cursed: true,
        }
    }
}

/// A lore pickup supplied per (dungeon, floor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub title: String,
    pub text: String,
    /// Story flags raised when the journal is found.
    pub on_find: Vec<String>,
}

/// Everything the engine needs from the rest of the game.
///
/// Encounter keys are opaque references into external combat-setup data.
/// Boss keys are held separately from the per-floor table and only ever fire
/// from the dedicated boss tile.
pub trait DungeonContent {
    /// Per-floor encounter table for a dungeon. May be empty.
    fn encounter_keys(&self, dungeon_id: &str, floor: u32) -> Vec<String>;

    /// The dungeon's unique boss key, if it has one.
    fn boss_key(&self, dungeon_id: &str) -> Option<String>;

    /// Lore pickups for a floor. May be empty.
    fn journals(&self, dungeon_id: &str, floor: u32) -> Vec<JournalEntry>;

    /// Read a story flag.
    fn flag(&self, name: &str) -> bool;

    /// Raise a story flag (journal on-find actions).
    fn set_flag(&mut self, name: &str);

    /// Whether encounters with the given faction are currently suppressed
    /// (e.g. after a reconciliation story beat).
    fn encounters_suppressed(&self, faction: &str) -> bool {
        let _ = faction;
        false
    }

    /// Roll a treasure-chest bonus item.
    fn roll_item(&mut self, floor: u32, rng: &mut GameRng) -> Item;

    /// Roll a secret-tier reward item.
    fn roll_secret_item(&mut self, floor: u32, rng: &mut GameRng) -> Item;

    /// Roll a cursed item for guarded rewards.
    fn roll_cursed_item(&mut self, floor: u32, rng: &mut GameRng) -> Item;

    /// Per-step resource regeneration. Invoked exactly once per successful
    /// move, before tile-event dispatch. Best-effort: failures are the
    /// implementor's problem, the move itself never unwinds.
    fn regen_party(&mut self, party: &mut Party);

    /// Per-step status-effect tick. Invoked exactly once per successful
    /// move, immediately after regeneration.
    fn tick_status(&mut self, party: &mut Party);
}
