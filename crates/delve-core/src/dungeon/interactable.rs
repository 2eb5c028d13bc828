//! Interactable construction.
//!
//! Healing pools, resource shrines, and risk altars, with floor-scaled
//! magnitudes. Every interactable is single-use per visit; the `used` flag
//! on its event is the only record.

use crate::rng::GameRng;

use super::tile::{Event, InteractableKind};

/// Chance (percent) a risk altar pays out instead of biting.
pub const ALTAR_BOON_PERCENT: u32 = 55;

/// Interactable pool for a dungeon theme tag. Crypts skew ominous, warrens
/// skew restorative; anything unrecognized gets the full pool.
pub fn theme_pool(theme: &str) -> &'static [InteractableKind] {
    match theme {
        "crypt" => &[
            InteractableKind::Altar,
            InteractableKind::Altar,
            InteractableKind::Shrine,
        ],
        "warren" | "den" => &[
            InteractableKind::HealingPool,
            InteractableKind::HealingPool,
            InteractableKind::Shrine,
        ],
        _ => &[
            InteractableKind::HealingPool,
            InteractableKind::Shrine,
            InteractableKind::Altar,
        ],
    }
}

/// Build one interactable event of the given kind.
///
/// Pool/shrine magnitudes are percentages of the relevant pool; altar
/// magnitude is a flat HP swing. All scale gently with floor number.
pub fn build(kind: InteractableKind, floor: u32, rng: &mut GameRng) -> Event {
    let magnitude = match kind {
        // 30-40% of max HP
        InteractableKind::HealingPool => 30 + rng.rn2(11) + floor.min(5),
        // 25-35% of secondary resources
        InteractableKind::Shrine => 25 + rng.rn2(11) + floor.min(5),
        // flat HP boost or damage
        InteractableKind::Altar => 5 + rng.rnd(5) + 2 * floor,
    };
    Event::Interactable {
        kind,
        magnitude,
        used: false,
    }
}

/// Roll a themed interactable.
pub fn roll(theme: &str, floor: u32, rng: &mut GameRng) -> Event {
    let pool = theme_pool(theme);
    let kind = pool[rng.rn2(pool.len() as u32) as usize];
    build(kind, floor, rng)
}
