//! Tile terrain kinds, per-tile flags, and event payloads.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::content::Item;
use crate::party::{Ailment, SaveStat};

/// Terrain kind. Passability is fully determined by the kind (plus the
/// secret-found flag for secret doors).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Wall = 0,
    Floor = 1,
    Corridor = 2,
    Door = 3,
    SecretDoor = 4,
    Entrance = 5,
    StairsUp = 6,
    StairsDown = 7,
    Treasure = 8,
    Trap = 9,
    Interactable = 10,
}

impl TileKind {
    /// Check if this kind can be walked on. Secret doors are handled at the
    /// tile level since they open up once found.
    pub const fn is_passable(&self) -> bool {
        !matches!(self, TileKind::Wall | TileKind::SecretDoor)
    }

    /// Fog-of-war reveal radius when the party stands on this tile.
    /// Cramped corridors and doorways see less than open rooms.
    pub const fn sight_radius(&self) -> i32 {
        match self {
            TileKind::Wall => 0,
            TileKind::Corridor | TileKind::Door => 2,
            _ => 4,
        }
    }

    /// Display character for this terrain.
    pub const fn symbol(&self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Corridor => ',',
            TileKind::Door => '+',
            TileKind::SecretDoor => '#', // looks like wall until found
            // The way in reads as a descent on floor 1.
            TileKind::Entrance => '>',
            TileKind::StairsUp => '<',
            TileKind::StairsDown => '>',
            TileKind::Treasure => '$',
            TileKind::Trap => '^',
            TileKind::Interactable => '_',
        }
    }
}

bitflags! {
    /// Per-tile state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TileFlags: u8 {
        /// Revealed by fog of war.
        const DISCOVERED = 0x01;
        /// Carved as part of a hidden room.
        const SECRET_ROOM = 0x02;
        /// Secret door found by a detection roll.
        const SECRET_FOUND = 0x04;
    }
}

// Manual serde impl for TileFlags
impl Serialize for TileFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(TileFlags::from_bits_truncate(bits))
    }
}

/// Whether a trap hits one character or the whole party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TrapScope {
    Single,
    Area,
}

/// Interactable subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum InteractableKind {
    /// Restores a share of max HP.
    HealingPool,
    /// Restores a share of secondary resources.
    Shrine,
    /// Risk/reward: temporary HP boost or damage.
    Altar,
}

/// A placed trap. `detected`/`disarmed` are mutated in place and are the
/// single source of truth for this trap's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapEvent {
    pub name: String,
    /// Threat tier, always in 1..=5.
    pub tier: u8,
    /// Inclusive damage range.
    pub damage: (u32, u32),
    pub scope: TrapScope,
    pub save_stat: SaveStat,
    /// Base detection odds (percent) before party bonuses.
    pub detect_odds: i32,
    /// Base disarm odds (percent), informational for the disarm roll.
    pub disarm_odds: i32,
    pub detected: bool,
    pub disarmed: bool,
    /// Inflicted on a critically failed saving throw.
    pub status: Option<Ailment>,
}

/// Event payload carried by a tile. One tile carries at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Treasure {
        gold: u32,
        items: Vec<Item>,
        opened: bool,
    },
    Trap(TrapEvent),
    Journal {
        title: String,
        text: String,
        triggered: bool,
        on_find: Vec<String>,
    },
    Interactable {
        kind: InteractableKind,
        /// Percent of the relevant pool for pools/shrines, flat HP for altars.
        magnitude: u32,
        used: bool,
    },
    FixedEncounter {
        triggered: bool,
    },
    BossEncounter {
        triggered: bool,
    },
}

/// A single map tile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub flags: TileFlags,
    pub event: Option<Event>,
}

impl Tile {
    pub const fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
            flags: TileFlags::empty(),
            event: None,
        }
    }

    pub const fn of(kind: TileKind) -> Self {
        Self {
            kind,
            flags: TileFlags::empty(),
            event: None,
        }
    }

    /// Passability: determined by kind, except a found secret door opens up.
    pub fn is_passable(&self) -> bool {
        if self.kind == TileKind::SecretDoor {
            return self.flags.contains(TileFlags::SECRET_FOUND);
        }
        self.kind.is_passable()
    }

    pub fn is_discovered(&self) -> bool {
        self.flags.contains(TileFlags::DISCOVERED)
    }

    pub fn discover(&mut self) {
        self.flags.insert(TileFlags::DISCOVERED);
    }

    pub fn in_secret_room(&self) -> bool {
        self.flags.contains(TileFlags::SECRET_ROOM)
    }

    pub fn secret_found(&self) -> bool {
        self.flags.contains(TileFlags::SECRET_FOUND)
    }

    /// Display character, hiding unfound secret doors and undetected traps.
    pub fn symbol(&self) -> char {
        match self.kind {
            TileKind::SecretDoor if self.secret_found() => '+',
            TileKind::Trap => match &self.event {
                Some(Event::Trap(t)) if !t.detected => '.',
                _ => '^',
            },
            kind => kind.symbol(),
        }
    }
}
