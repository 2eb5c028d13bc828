//! Party and character inputs.
//!
//! Character stats, classes, and races are read-only inputs to this engine:
//! the exploration layer consults them for detection, disarm, and saving
//! throw bonuses, and applies trap/interactable outcomes to hit points.
//! Character progression itself is owned by an external system.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Stat governing a saving throw or bonus formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SaveStat {
    Strength,
    Dexterity,
    Constitution,
    Wisdom,
}

/// Raw ability scores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intellect: i32,
    pub wisdom: i32,
}

impl Stats {
    pub fn get(&self, stat: SaveStat) -> i32 {
        match stat {
            SaveStat::Strength => self.strength,
            SaveStat::Dexterity => self.dexterity,
            SaveStat::Constitution => self.constitution,
            SaveStat::Wisdom => self.wisdom,
        }
    }
}

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ClassKind {
    Warrior,
    Paladin,
    Rogue,
    Ranger,
    Mage,
    Cleric,
}

impl ClassKind {
    /// Saving-throw modifier against traps. Stealth-oriented classes are
    /// quick on their feet; heavy-armor classes are not.
    pub const fn trap_save_modifier(self) -> i32 {
        match self {
            ClassKind::Rogue => 15,
            ClassKind::Ranger => 10,
            ClassKind::Warrior | ClassKind::Paladin => -5,
            _ => 0,
        }
    }

    /// Contribution to the party-wide trap detection roll.
    pub const fn trap_detect_bonus(self) -> i32 {
        match self {
            ClassKind::Rogue => 20,
            ClassKind::Ranger => 12,
            _ => 2,
        }
    }

    /// Contribution to the party-wide secret-door detection roll.
    pub const fn secret_detect_bonus(self) -> i32 {
        match self {
            ClassKind::Rogue => 12,
            ClassKind::Ranger => 8,
            _ => 0,
        }
    }

    /// Bonus applied when disarming a detected trap.
    pub const fn disarm_bonus(self) -> i32 {
        match self {
            ClassKind::Rogue => 25,
            ClassKind::Ranger => 10,
            _ => 0,
        }
    }
}

/// Character race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RaceKind {
    Human,
    Elf,
    Dwarf,
    Halfling,
    HalfOrc,
}

impl RaceKind {
    /// Racial contribution to trap detection (dwarves know stonework).
    pub const fn trap_detect_bonus(self) -> i32 {
        match self {
            RaceKind::Dwarf => 10,
            RaceKind::Halfling => 5,
            _ => 0,
        }
    }

    /// Racial contribution to secret-door detection (keen elven eyes).
    pub const fn secret_detect_bonus(self) -> i32 {
        match self {
            RaceKind::Elf => 10,
            RaceKind::Halfling => 5,
            _ => 0,
        }
    }
}

/// Lingering ailment inflicted by a trap's severe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Ailment {
    Poison,
    Curse,
}

/// One party member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMember {
    pub name: String,
    pub class: ClassKind,
    pub race: RaceKind,
    pub level: u32,
    pub stats: Stats,
    pub hp: i32,
    pub hp_max: i32,
    /// Secondary resource pool (mana, focus, rage).
    pub resource: i32,
    pub resource_max: i32,
    pub ailments: Vec<Ailment>,
}

impl PartyMember {
    pub fn new(name: impl Into<String>, class: ClassKind, race: RaceKind) -> Self {
        Self {
            name: name.into(),
            class,
            race,
            level: 1,
            stats: Stats::default(),
            hp: 10,
            hp_max: 10,
            resource: 10,
            resource_max: 10,
            ailments: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn afflict(&mut self, ailment: Ailment) {
        if !self.ailments.contains(&ailment) {
            self.ailments.push(ailment);
        }
    }
}

/// The exploring party.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    pub members: Vec<PartyMember>,
}

impl Party {
    pub fn new(members: Vec<PartyMember>) -> Self {
        Self { members }
    }

    pub fn alive(&self) -> impl Iterator<Item = &PartyMember> {
        self.members.iter().filter(|m| m.is_alive())
    }

    /// Summed trap-detection contribution: class bonus, WIS, and DEX/2 for
    /// every living member, plus each member's racial bonus.
    pub fn trap_detect_contribution(&self) -> i32 {
        self.alive()
            .map(|m| {
                m.class.trap_detect_bonus()
                    + m.race.trap_detect_bonus()
                    + m.stats.wisdom
                    + m.stats.dexterity / 2
            })
            .sum()
    }

    /// Secret-door contribution: summed class/racial bonuses but only the
    /// single best WIS divided by 3.
    pub fn secret_detect_contribution(&self) -> i32 {
        let bonuses: i32 = self
            .alive()
            .map(|m| m.class.secret_detect_bonus() + m.race.secret_detect_bonus())
            .sum();
        let best_wis = self.alive().map(|m| m.stats.wisdom).max().unwrap_or(0);
        bonuses + best_wis / 3
    }

    /// Best disarm contribution across the party: class bonus plus DEX/2.
    pub fn disarm_contribution(&self) -> i32 {
        self.alive()
            .map(|m| m.class.disarm_bonus() + m.stats.dexterity / 2)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(class: ClassKind, race: RaceKind, wis: i32, dex: i32) -> PartyMember {
        let mut m = PartyMember::new("t", class, race);
        m.stats.wisdom = wis;
        m.stats.dexterity = dex;
        m
    }

    #[test]
    fn test_trap_detect_sums_whole_party() {
        let party = Party::new(vec![
            member(ClassKind::Rogue, RaceKind::Human, 4, 10),
            member(ClassKind::Cleric, RaceKind::Dwarf, 8, 2),
        ]);
        // rogue: 20 + 0 + 4 + 5; cleric: 2 + 10 + 8 + 1
        assert_eq!(party.trap_detect_contribution(), 29 + 21);
    }

    #[test]
    fn test_secret_detect_uses_best_wis_only() {
        let party = Party::new(vec![
            member(ClassKind::Mage, RaceKind::Elf, 12, 0),
            member(ClassKind::Mage, RaceKind::Human, 9, 0),
        ]);
        // bonuses 10 + 0, best wis 12/3
        assert_eq!(party.secret_detect_contribution(), 14);
    }

    #[test]
    fn test_dead_members_do_not_contribute() {
        let mut m = member(ClassKind::Rogue, RaceKind::Human, 10, 10);
        m.hp = 0;
        let party = Party::new(vec![m]);
        assert_eq!(party.trap_detect_contribution(), 0);
        assert_eq!(party.disarm_contribution(), 0);
    }
}
