//! Trap catalog and saving throws.
//!
//! Five threat tiers, each with a handful of named archetypes. Detection and
//! disarm odds fall with tier while damage climbs. The saving throw is the
//! banded roll a character makes when a trap actually fires; detection state
//! never enters into it.

use serde::{Deserialize, Serialize};

use crate::party::{Ailment, PartyMember, SaveStat};
use crate::rng::GameRng;

use super::tile::{TrapEvent, TrapScope};

/// A trap archetype in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct TrapSpec {
    pub name: &'static str,
    pub damage: (u32, u32),
    pub scope: TrapScope,
    pub save_stat: SaveStat,
    pub detect_odds: i32,
    pub disarm_odds: i32,
    pub status: Option<Ailment>,
}

const TIER_1: [TrapSpec; 3] = [
    TrapSpec {
        name: "Dart Trap",
        damage: (2, 5),
        scope: TrapScope::Single,
        save_stat: SaveStat::Dexterity,
        detect_odds: 75,
        disarm_odds: 70,
        status: None,
    },
    TrapSpec {
        name: "Tripwire",
        damage: (1, 4),
        scope: TrapScope::Single,
        save_stat: SaveStat::Dexterity,
        detect_odds: 70,
        disarm_odds: 70,
        status: None,
    },
    TrapSpec {
        name: "Loose Flagstone",
        damage: (2, 4),
        scope: TrapScope::Single,
        save_stat: SaveStat::Strength,
        detect_odds: 70,
        disarm_odds: 65,
        status: None,
    },
];

const TIER_2: [TrapSpec; 3] = [
    TrapSpec {
        name: "Arrow Volley",
        damage: (4, 9),
        scope: TrapScope::Area,
        save_stat: SaveStat::Dexterity,
        detect_odds: 65,
        disarm_odds: 60,
        status: None,
    },
    TrapSpec {
        name: "Spike Pit",
        damage: (5, 10),
        scope: TrapScope::Single,
        save_stat: SaveStat::Strength,
        detect_odds: 60,
        disarm_odds: 55,
        status: None,
    },
    TrapSpec {
        name: "Gas Vent",
        damage: (3, 8),
        scope: TrapScope::Area,
        save_stat: SaveStat::Constitution,
        detect_odds: 60,
        disarm_odds: 55,
        status: Some(Ailment::Poison),
    },
];

const TIER_3: [TrapSpec; 3] = [
    TrapSpec {
        name: "Poison Needle",
        damage: (6, 12),
        scope: TrapScope::Single,
        save_stat: SaveStat::Constitution,
        detect_odds: 55,
        disarm_odds: 50,
        status: Some(Ailment::Poison),
    },
    TrapSpec {
        name: "Swinging Blade",
        damage: (8, 16),
        scope: TrapScope::Single,
        save_stat: SaveStat::Dexterity,
        detect_odds: 50,
        disarm_odds: 45,
        status: None,
    },
    TrapSpec {
        name: "Flame Jet",
        damage: (7, 14),
        scope: TrapScope::Area,
        save_stat: SaveStat::Dexterity,
        detect_odds: 50,
        disarm_odds: 45,
        status: None,
    },
];

const TIER_4: [TrapSpec; 3] = [
    TrapSpec {
        name: "Crushing Ceiling",
        damage: (12, 22),
        scope: TrapScope::Area,
        save_stat: SaveStat::Strength,
        detect_odds: 45,
        disarm_odds: 40,
        status: None,
    },
    TrapSpec {
        name: "Venom Spray",
        damage: (10, 18),
        scope: TrapScope::Area,
        save_stat: SaveStat::Constitution,
        detect_odds: 40,
        disarm_odds: 35,
        status: Some(Ailment::Poison),
    },
    TrapSpec {
        name: "Cursed Glyph",
        damage: (11, 20),
        scope: TrapScope::Single,
        save_stat: SaveStat::Wisdom,
        detect_odds: 40,
        disarm_odds: 35,
        status: Some(Ailment::Curse),
    },
];

const TIER_5: [TrapSpec; 3] = [
    TrapSpec {
        name: "Annihilation Rune",
        damage: (18, 32),
        scope: TrapScope::Area,
        save_stat: SaveStat::Wisdom,
        detect_odds: 35,
        disarm_odds: 30,
        status: Some(Ailment::Curse),
    },
    TrapSpec {
        name: "Soul Drain",
        damage: (16, 30),
        scope: TrapScope::Single,
        save_stat: SaveStat::Wisdom,
        detect_odds: 30,
        disarm_odds: 25,
        status: Some(Ailment::Curse),
    },
    TrapSpec {
        name: "Widowmaker",
        damage: (20, 34),
        scope: TrapScope::Single,
        save_stat: SaveStat::Dexterity,
        detect_odds: 30,
        disarm_odds: 25,
        status: Some(Ailment::Poison),
    },
];

/// Archetypes for a tier. Tiers outside 1..=5 are clamped.
pub fn archetypes(tier: u8) -> &'static [TrapSpec] {
    match tier.clamp(1, 5) {
        1 => &TIER_1,
        2 => &TIER_2,
        3 => &TIER_3,
        4 => &TIER_4,
        _ => &TIER_5,
    }
}

/// Roll a trap of the given tier from the catalog.
pub fn roll_trap(tier: u8, rng: &mut GameRng) -> TrapEvent {
    let tier = tier.clamp(1, 5);
    let pool = archetypes(tier);
    let spec = pool[rng.rn2(pool.len() as u32) as usize];
    TrapEvent {
        name: spec.name.to_string(),
        tier,
        damage: spec.damage,
        scope: spec.scope,
        save_stat: spec.save_stat,
        detect_odds: spec.detect_odds,
        disarm_odds: spec.disarm_odds,
        detected: false,
        disarmed: false,
        status: spec.status,
    }
}

/// Outcome band of a trap saving throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveBand {
    /// No damage at all.
    Avoided,
    /// Half damage.
    Half,
    /// Full damage.
    Full,
    /// Full damage plus the trap's status effect.
    CriticalFailure,
}

/// Saving-throw threshold for a tier.
pub const fn save_threshold(tier: u8) -> i32 {
    30 + 10 * tier as i32
}

/// Saving-throw bonus for one character against one trap.
pub fn save_bonus(member: &PartyMember, save_stat: SaveStat) -> i32 {
    2 * member.stats.get(save_stat) + member.class.trap_save_modifier()
}

/// Band a total (roll + bonus) against a threshold. Exact at boundaries:
/// `threshold+20` avoids, `threshold` halves, `threshold-30` crit-fails.
pub const fn save_band(total: i32, threshold: i32) -> SaveBand {
    if total >= threshold + 20 {
        SaveBand::Avoided
    } else if total >= threshold {
        SaveBand::Half
    } else if total <= threshold - 30 {
        SaveBand::CriticalFailure
    } else {
        SaveBand::Full
    }
}

/// Result of one character's saving throw against a fired trap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub member: String,
    pub band: SaveBand,
    pub damage: u32,
    pub status: Option<Ailment>,
}

/// Roll one character's saving throw and compute the damage dealt.
pub fn resolve_save(trap: &TrapEvent, member: &PartyMember, rng: &mut GameRng) -> SaveOutcome {
    let threshold = save_threshold(trap.tier);
    let total = rng.rnd(100) as i32 + save_bonus(member, trap.save_stat);
    let band = save_band(total, threshold);

    let (lo, hi) = trap.damage;
    let rolled = rng.range(lo, hi);
    let (damage, status) = match band {
        SaveBand::Avoided => (0, None),
        SaveBand::Half => (rolled / 2, None),
        SaveBand::Full => (rolled, None),
        SaveBand::CriticalFailure => (rolled, trap.status),
    };

    SaveOutcome {
        member: member.name.clone(),
        band,
        damage,
        status,
    }
}
