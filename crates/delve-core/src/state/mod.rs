//! Runtime exploration state.
//!
//! [`DungeonState`] owns the floor cache, the party position, and the ambient
//! runtime RNG, and drives the per-step pipeline: commit the move, lift fog,
//! roll detection, let the content layer regenerate and tick status effects,
//! dispatch the destination tile, then advance enemies. Floor geometry is
//! regenerated deterministically from `(dungeon_id, floor)`, so only the
//! mutable state on each cached floor matters for persistence.

pub mod events;
pub mod viewport;

pub use events::MoveEvent;
pub use viewport::{visible_tiles, ViewportTile};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    CARDINALS, DISARM_BASE, DISARM_CAP, SECRET_DETECT_CAP, SPAWN_BUFFER, TRAP_DETECT_CAP,
};
use crate::content::DungeonContent;
use crate::dungeon::interactable::ALTAR_BOON_PERCENT;
use crate::dungeon::{
    generate_floor, resolve_save, Event, Floor, FloorParams, InteractableKind, SaveOutcome,
    TileFlags, TileKind, TrapEvent, TrapScope,
};
use crate::enemy::{advance_enemies, Enemy, EnemyTick};
use crate::party::Party;
use crate::rng::{floor_seed, GameRng};

/// Static definition of a dungeon, supplied by the campaign layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonDef {
    pub id: String,
    /// Number of floors; the boss (if any) sits on the last one.
    pub floors: u32,
    pub width: usize,
    pub height: usize,
    pub theme: String,
    /// Wandering-encounter chance (percent) per step on plain terrain.
    pub encounter_rate: u32,
    /// Shifts trap tiers up or down across the whole dungeon.
    pub difficulty: i32,
    /// Faction whose encounters can be story-suppressed.
    pub faction: Option<String>,
}

#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("party is not standing on the stairs")]
    NotOnStairs,
    #[error("floor {0} has not been generated")]
    MissingFloor(u32),
    #[error("no tile at ({0}, {1})")]
    OutOfBounds(i32, i32),
    #[error("tile at ({0}, {1}) holds no active trap")]
    NotATrap(i32, i32),
    #[error("trap has not been detected")]
    TrapNotDetected,
    #[error("trap is already disarmed")]
    TrapAlreadyDisarmed,
}

/// Live exploration state for one dungeon visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonState {
    pub def: DungeonDef,
    /// 1-based current floor.
    pub floor_num: u32,
    /// Party position on the current floor.
    pub pos: (i32, i32),
    /// Successful moves taken this visit.
    pub steps: u64,
    /// Visited floors, keyed by floor number. Mutable tile and enemy state
    /// persists here for the whole visit.
    floors: HashMap<u32, Floor>,
    /// Ambient runtime stream. Not part of determinism guarantees.
    rng: GameRng,
}

impl DungeonState {
    /// Enter a dungeon at floor 1.
    pub fn enter(def: DungeonDef, content: &mut dyn DungeonContent) -> Self {
        Self::enter_seeded(def, GameRng::from_entropy(), content)
    }

    /// Enter with an explicit runtime RNG; used by tests and replays.
    pub fn enter_seeded(def: DungeonDef, rng: GameRng, content: &mut dyn DungeonContent) -> Self {
        let mut state = Self {
            def,
            floor_num: 1,
            pos: (0, 0),
            steps: 0,
            floors: HashMap::new(),
            rng,
        };
        state.ensure_floor(1, content);
        if let Some(floor) = state.floors.get_mut(&1) {
            state.pos = floor.entrance;
            reveal_at(floor, state.pos);
        }
        state
    }

    /// The floor the party is on, if generated.
    pub fn current_floor(&self) -> Option<&Floor> {
        self.floors.get(&self.floor_num)
    }

    /// Generate and cache a floor if this visit has not seen it yet.
    ///
    /// Geometry and spawns come from a dedicated generation stream seeded by
    /// `(dungeon_id, floor)`, so a revisit within the same session hits the
    /// cache and a fresh session regenerates identical terrain.
    fn ensure_floor(&mut self, floor_num: u32, content: &mut dyn DungeonContent) {
        if self.floors.contains_key(&floor_num) {
            return;
        }
        let mut gen_rng = GameRng::new(floor_seed(&self.def.id, floor_num));
        let params = FloorParams {
            width: self.def.width,
            height: self.def.height,
            floor: floor_num,
            total_floors: self.def.floors,
            theme: &self.def.theme,
            dungeon_id: &self.def.id,
            difficulty: self.def.difficulty,
        };
        let mut floor = generate_floor(&params, &mut gen_rng, content);
        spawn_enemies(&mut floor, &self.def, floor_num, &*content, &mut gen_rng);
        self.floors.insert(floor_num, floor);
    }

    /// Step the party one tile. Returns the single event the step produced.
    ///
    /// A blocked move returns [`MoveEvent::None`] and consumes no turn:
    /// neither regeneration nor the enemies advance.
    pub fn move_party(
        &mut self,
        dx: i32,
        dy: i32,
        party: &mut Party,
        content: &mut dyn DungeonContent,
    ) -> MoveEvent {
        let (nx, ny) = (self.pos.0 + dx, self.pos.1 + dy);
        let Some(floor) = self.floors.get_mut(&self.floor_num) else {
            return MoveEvent::None;
        };
        if !floor.is_passable(nx, ny) {
            return MoveEvent::None;
        }
        self.pos = (nx, ny);
        self.steps += 1;

        reveal_at(floor, (nx, ny));
        run_detection(floor, nx, ny, party, &mut self.rng);
        content.regen_party(party);
        content.tick_status(party);

        let mut event = dispatch_tile(
            floor,
            &self.def,
            self.floor_num,
            nx,
            ny,
            party,
            content,
            &mut self.rng,
        );

        if let EnemyTick::Contact { encounter_key } =
            advance_enemies(floor, nx, ny, &mut self.rng)
        {
            if !faction_suppressed(&self.def, content) {
                event = MoveEvent::EnemyContact { encounter_key };
            }
        }
        event
    }

    /// Take the down staircase the party is standing on.
    pub fn descend(&mut self, content: &mut dyn DungeonContent) -> Result<MoveEvent, DungeonError> {
        let floor = self
            .floors
            .get(&self.floor_num)
            .ok_or(DungeonError::MissingFloor(self.floor_num))?;
        if floor.stairs_down != Some(self.pos) {
            return Err(DungeonError::NotOnStairs);
        }
        self.floor_num += 1;
        self.ensure_floor(self.floor_num, content);
        if let Some(next) = self.floors.get_mut(&self.floor_num) {
            self.pos = next.entrance;
            reveal_at(next, self.pos);
        }
        Ok(MoveEvent::StairsDown)
    }

    /// Take the up staircase (or the entrance, which exits the dungeon).
    pub fn ascend(&mut self, content: &mut dyn DungeonContent) -> Result<MoveEvent, DungeonError> {
        let floor = self
            .floors
            .get(&self.floor_num)
            .ok_or(DungeonError::MissingFloor(self.floor_num))?;
        if self.pos != floor.entrance {
            return Err(DungeonError::NotOnStairs);
        }
        if self.floor_num == 1 {
            return Ok(MoveEvent::ExitDungeon);
        }
        self.floor_num -= 1;
        self.ensure_floor(self.floor_num, content);
        if let Some(prev) = self.floors.get_mut(&self.floor_num) {
            self.pos = prev.stairs_down.unwrap_or(prev.entrance);
            reveal_at(prev, self.pos);
        }
        Ok(MoveEvent::StairsUp)
    }

    /// Attempt to disarm a detected trap. Returns whether the attempt
    /// succeeded; a failed attempt leaves the trap armed.
    pub fn disarm_trap(&mut self, x: i32, y: i32, party: &Party) -> Result<bool, DungeonError> {
        let floor = self
            .floors
            .get_mut(&self.floor_num)
            .ok_or(DungeonError::MissingFloor(self.floor_num))?;
        let tile = floor.tile_mut(x, y).ok_or(DungeonError::OutOfBounds(x, y))?;
        let Some(Event::Trap(trap)) = &mut tile.event else {
            return Err(DungeonError::NotATrap(x, y));
        };
        if trap.disarmed {
            return Err(DungeonError::TrapAlreadyDisarmed);
        }
        if !trap.detected {
            return Err(DungeonError::TrapNotDetected);
        }

        let chance = (DISARM_BASE + party.disarm_contribution()).clamp(0, DISARM_CAP);
        let success = self.rng.percent(chance as u32);
        if success {
            trap.disarmed = true;
        }
        Ok(success)
    }

    /// Sample a key from the current floor's encounter table. The boss key
    /// never comes out of here; it only fires from its own tile.
    pub fn encounter_key(&mut self, content: &dyn DungeonContent) -> Option<String> {
        roll_encounter_key(&self.def, self.floor_num, content, &mut self.rng)
    }

    /// Mark the living enemy at a position as dead (combat resolved
    /// externally). No-op when nothing lives there.
    pub fn kill_enemy_at(&mut self, x: i32, y: i32) {
        if let Some(floor) = self.floors.get_mut(&self.floor_num) {
            for enemy in floor.enemies.iter_mut() {
                if !enemy.is_dead() && enemy.x == x && enemy.y == y {
                    enemy.kill();
                    return;
                }
            }
        }
    }
}

fn faction_suppressed(def: &DungeonDef, content: &dyn DungeonContent) -> bool {
    def.faction
        .as_deref()
        .map(|f| content.encounters_suppressed(f))
        .unwrap_or(false)
}

/// Lift fog around a position using the tile's own sight radius.
fn reveal_at(floor: &mut Floor, pos: (i32, i32)) {
    let radius = floor
        .kind_at(pos.0, pos.1)
        .map(|k| k.sight_radius())
        .unwrap_or(0);
    floor.reveal_circle(pos.0, pos.1, radius);
}

/// Capped per-step chance of detecting a trap with the given base odds.
fn trap_detect_chance(odds: i32, party_bonus: i32) -> i32 {
    (odds + party_bonus).clamp(0, TRAP_DETECT_CAP)
}

/// Capped per-step chance of finding a secret door.
fn secret_detect_chance(party_bonus: i32) -> i32 {
    party_bonus.clamp(0, SECRET_DETECT_CAP)
}

/// Passive detection sweep around the party: traps in the 3x3 block, secret
/// doors out to the 5x5 block. One roll per object per step.
fn run_detection(floor: &mut Floor, px: i32, py: i32, party: &Party, rng: &mut GameRng) {
    let trap_bonus = party.trap_detect_contribution();
    let secret_chance = secret_detect_chance(party.secret_detect_contribution());

    for dy in -2..=2 {
        for dx in -2..=2 {
            let Some(tile) = floor.tile_mut(px + dx, py + dy) else {
                continue;
            };
            if tile.kind == TileKind::SecretDoor && !tile.secret_found() {
                if rng.percent(secret_chance as u32) {
                    tile.flags.insert(TileFlags::SECRET_FOUND);
                    tile.discover();
                }
                continue;
            }
            // Traps need the party right next to them.
            if dx.abs() > 1 || dy.abs() > 1 {
                continue;
            }
            if let Some(Event::Trap(trap)) = &mut tile.event {
                if !trap.detected && !trap.disarmed {
                    let chance = trap_detect_chance(trap.detect_odds, trap_bonus);
                    if rng.percent(chance as u32) {
                        trap.detected = true;
                    }
                }
            }
        }
    }
}

/// Dispatch the tile the party just stepped onto.
#[allow(clippy::too_many_arguments)]
fn dispatch_tile(
    floor: &mut Floor,
    def: &DungeonDef,
    floor_num: u32,
    x: i32,
    y: i32,
    party: &mut Party,
    content: &mut dyn DungeonContent,
    rng: &mut GameRng,
) -> MoveEvent {
    let Some(kind) = floor.kind_at(x, y) else {
        return MoveEvent::None;
    };
    match kind {
        TileKind::StairsDown => return MoveEvent::StairsDown,
        TileKind::StairsUp => return MoveEvent::StairsUp,
        TileKind::Entrance if floor_num == 1 => return MoveEvent::ExitDungeon,
        _ => {}
    }

    let Some(tile) = floor.tile_mut(x, y) else {
        return MoveEvent::None;
    };
    match &mut tile.event {
        Some(Event::Treasure { gold, items, opened }) if !*opened => {
            *opened = true;
            return MoveEvent::Treasure {
                gold: *gold,
                items: items.clone(),
            };
        }
        Some(Event::Trap(trap)) if !trap.disarmed => {
            // Firing reveals the trap but leaves it armed; only a disarm
            // roll neutralizes it.
            trap.detected = true;
            let fired = trap.clone();
            let outcomes = fire_trap(&fired, party, rng);
            return MoveEvent::Trap {
                name: fired.name,
                outcomes,
            };
        }
        Some(Event::Journal {
            title,
            text,
            triggered,
            on_find,
        }) if !*triggered => {
            *triggered = true;
            let title = title.clone();
            let text = text.clone();
            let flags = on_find.clone();
            for flag in &flags {
                content.set_flag(flag);
            }
            return MoveEvent::Journal { title, text };
        }
        Some(Event::Interactable {
            kind,
            magnitude,
            used,
        }) if !*used => {
            *used = true;
            let (kind, magnitude) = (*kind, *magnitude);
            let boon = apply_interactable(kind, magnitude, party, rng);
            return MoveEvent::Interactable {
                kind,
                magnitude,
                boon,
            };
        }
        Some(Event::FixedEncounter { triggered }) if !*triggered => {
            *triggered = true;
            if let Some(key) = roll_encounter_key(def, floor_num, content, rng) {
                return MoveEvent::FixedEncounter { encounter_key: key };
            }
            return MoveEvent::None;
        }
        Some(Event::BossEncounter { triggered }) if !*triggered => {
            if let Some(key) = content.boss_key(&def.id) {
                *triggered = true;
                return MoveEvent::BossEncounter { encounter_key: key };
            }
            return MoveEvent::None;
        }
        _ => {}
    }

    // Wandering-monster roll on otherwise uneventful open terrain.
    if matches!(kind, TileKind::Floor | TileKind::Corridor)
        && rng.percent(def.encounter_rate)
        && !faction_suppressed(def, content)
    {
        if let Some(key) = roll_encounter_key(def, floor_num, content, rng) {
            return MoveEvent::RandomEncounter { encounter_key: key };
        }
    }
    MoveEvent::None
}

/// Pick a key from the floor's encounter table, never the boss key.
fn roll_encounter_key(
    def: &DungeonDef,
    floor_num: u32,
    content: &dyn DungeonContent,
    rng: &mut GameRng,
) -> Option<String> {
    let boss = content.boss_key(&def.id);
    let keys: Vec<String> = content
        .encounter_keys(&def.id, floor_num)
        .into_iter()
        .filter(|k| Some(k) != boss.as_ref())
        .collect();
    rng.choose(&keys).cloned()
}

/// Resolve a fired trap against the party: one saving throw per affected
/// character, damage and status applied in place.
fn fire_trap(trap: &TrapEvent, party: &mut Party, rng: &mut GameRng) -> Vec<SaveOutcome> {
    let mut outcomes = Vec::new();
    match trap.scope {
        TrapScope::Area => {
            for member in party.members.iter_mut().filter(|m| m.is_alive()) {
                let outcome = resolve_save(trap, member, rng);
                member.hp = (member.hp - outcome.damage as i32).max(0);
                if let Some(ailment) = outcome.status {
                    member.afflict(ailment);
                }
                outcomes.push(outcome);
            }
        }
        TrapScope::Single => {
            let living: Vec<usize> = party
                .members
                .iter()
                .enumerate()
                .filter(|(_, m)| m.is_alive())
                .map(|(i, _)| i)
                .collect();
            if let Some(&idx) = rng.choose(&living) {
                let member = &mut party.members[idx];
                let outcome = resolve_save(trap, member, rng);
                member.hp = (member.hp - outcome.damage as i32).max(0);
                if let Some(ailment) = outcome.status {
                    member.afflict(ailment);
                }
                outcomes.push(outcome);
            }
        }
    }
    outcomes
}

/// Apply an interactable's effect. Returns false only for an altar bite.
fn apply_interactable(
    kind: InteractableKind,
    magnitude: u32,
    party: &mut Party,
    rng: &mut GameRng,
) -> bool {
    match kind {
        InteractableKind::HealingPool => {
            for member in party.members.iter_mut().filter(|m| m.is_alive()) {
                let heal = member.hp_max * magnitude as i32 / 100;
                member.hp = (member.hp + heal).min(member.hp_max);
            }
            true
        }
        InteractableKind::Shrine => {
            for member in party.members.iter_mut().filter(|m| m.is_alive()) {
                let restore = member.resource_max * magnitude as i32 / 100;
                member.resource = (member.resource + restore).min(member.resource_max);
            }
            true
        }
        InteractableKind::Altar => {
            let boon = rng.percent(ALTAR_BOON_PERCENT);
            // The altar touches whoever leads the party.
            if let Some(member) = party.members.iter_mut().find(|m| m.is_alive()) {
                if boon {
                    member.hp = (member.hp + magnitude as i32).min(member.hp_max);
                } else {
                    member.hp = (member.hp - magnitude as i32).max(0);
                }
            }
            boon
        }
    }
}

/// Populate a freshly generated floor with patrolling enemies.
///
/// Count scales with depth but is capped by floor size; a buffer around the
/// entrance and stairs stays clear so arrivals are never ambushed.
fn spawn_enemies(
    floor: &mut Floor,
    def: &DungeonDef,
    floor_num: u32,
    content: &dyn DungeonContent,
    rng: &mut GameRng,
) {
    let boss = content.boss_key(&def.id);
    let keys: Vec<String> = content
        .encounter_keys(&def.id, floor_num)
        .into_iter()
        .filter(|k| Some(k) != boss.as_ref())
        .collect();
    if keys.is_empty() {
        return;
    }

    let walkable = floor.walkable_positions();
    let count = ((3 + 2 * floor_num) as usize).min(walkable.len() / 8);

    let mut anchors = vec![floor.entrance];
    if let Some(stairs) = floor.stairs_down {
        anchors.push(stairs);
    }
    let mut spots: Vec<(i32, i32)> = walkable
        .into_iter()
        .filter(|&(x, y)| {
            anchors
                .iter()
                .all(|&(ax, ay)| (x - ax).abs() + (y - ay).abs() > SPAWN_BUFFER)
        })
        .collect();
    rng.shuffle(&mut spots);

    for &(x, y) in spots.iter().take(count) {
        let key = keys[rng.rn2(keys.len() as u32) as usize].clone();
        let dir = CARDINALS[rng.rn2(4) as usize];
        floor.enemies.push(Enemy::new(x, y, key, dir));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::content::{Item, JournalEntry};

    /// Scriptable content double shared by the state tests.
    pub(crate) struct StubContent {
        pub keys: Vec<String>,
        pub boss: Option<String>,
        pub journals: Vec<JournalEntry>,
        pub suppressed: bool,
        pub flags: Vec<String>,
        /// Chronological record of regen/status/flag calls.
        pub log: Vec<String>,
    }

    impl StubContent {
        pub(crate) fn new() -> Self {
            Self {
                keys: vec!["goblin_pack".into()],
                boss: Some("warren_king".into()),
                journals: Vec::new(),
                suppressed: false,
                flags: Vec::new(),
                log: Vec::new(),
            }
        }
    }

    impl DungeonContent for StubContent {
        fn encounter_keys(&self, _dungeon_id: &str, _floor: u32) -> Vec<String> {
            self.keys.clone()
        }
        fn boss_key(&self, _dungeon_id: &str) -> Option<String> {
            self.boss.clone()
        }
        fn journals(&self, _dungeon_id: &str, _floor: u32) -> Vec<JournalEntry> {
            self.journals.clone()
        }
        fn flag(&self, name: &str) -> bool {
            self.flags.iter().any(|f| f == name)
        }
        fn set_flag(&mut self, name: &str) {
            self.log.push(format!("flag:{name}"));
            self.flags.push(name.to_string());
        }
        fn encounters_suppressed(&self, _faction: &str) -> bool {
            self.suppressed
        }
        fn roll_item(&mut self, _floor: u32, _rng: &mut GameRng) -> Item {
            Item::new("trinket")
        }
        fn roll_secret_item(&mut self, _floor: u32, _rng: &mut GameRng) -> Item {
            Item::new("relic")
        }
        fn roll_cursed_item(&mut self, _floor: u32, _rng: &mut GameRng) -> Item {
            Item::cursed("cursed relic")
        }
        fn regen_party(&mut self, _party: &mut Party) {
            self.log.push("regen".into());
        }
        fn tick_status(&mut self, _party: &mut Party) {
            self.log.push("status".into());
        }
    }

    pub(crate) fn warren_def() -> DungeonDef {
        DungeonDef {
            id: "goblin_warren".into(),
            floors: 3,
            width: 50,
            height: 40,
            theme: "warren".into(),
            encounter_rate: 0,
            difficulty: 0,
            faction: Some("goblins".into()),
        }
    }

    /// A state whose first floor is replaced by an empty 20x20 open room
    /// with no enemies, for tests that script tiles by hand.
    pub(crate) fn open_state(content: &mut dyn DungeonContent) -> DungeonState {
        let mut state = DungeonState::enter_seeded(warren_def(), GameRng::new(99), content);
        let mut floor = Floor::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                floor.set_kind(x, y, TileKind::Floor);
            }
        }
        floor.entrance = (1, 1);
        state.floors.insert(1, floor);
        state.pos = (1, 1);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{open_state, warren_def, StubContent};
    use super::*;
    use crate::dungeon::trap::roll_trap;
    use crate::party::{ClassKind, PartyMember, RaceKind};

    fn test_party() -> Party {
        let mut rogue = PartyMember::new("Shadow", ClassKind::Rogue, RaceKind::Halfling);
        rogue.stats.dexterity = 8;
        rogue.stats.wisdom = 4;
        rogue.hp = 40;
        rogue.hp_max = 40;
        let mut cleric = PartyMember::new("Vow", ClassKind::Cleric, RaceKind::Dwarf);
        cleric.stats.wisdom = 10;
        cleric.hp = 35;
        cleric.hp_max = 35;
        cleric.resource = 5;
        cleric.resource_max = 30;
        Party::new(vec![rogue, cleric])
    }

    #[test]
    fn test_enter_starts_at_discovered_entrance() {
        let mut content = StubContent::new();
        let state = DungeonState::enter_seeded(warren_def(), GameRng::new(7), &mut content);
        let floor = state.current_floor().expect("floor 1 generated");
        assert_eq!(state.floor_num, 1);
        assert_eq!(state.pos, floor.entrance);
        let (ex, ey) = floor.entrance;
        assert!(floor.tile(ex, ey).unwrap().is_discovered());
    }

    #[test]
    fn test_blocked_move_costs_nothing() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        state.pos = (0, 1);
        content.log.clear();

        // Walls are index 0's western neighbor: off-grid.
        let event = state.move_party(-1, 0, &mut party, &mut content);
        assert_eq!(event, MoveEvent::None);
        assert_eq!(state.pos, (0, 1));
        assert!(content.log.is_empty(), "blocked move must not tick content");
    }

    #[test]
    fn test_move_reveals_fog_and_ticks_content() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        content.log.clear();

        state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(state.pos, (2, 1));
        let floor = state.current_floor().unwrap();
        // Open-room sight radius is 4.
        assert!(floor.tile(6, 1).unwrap().is_discovered());
        assert_eq!(content.log, vec!["regen".to_string(), "status".to_string()]);
    }

    #[test]
    fn test_treasure_opens_exactly_once() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.kind = TileKind::Treasure;
            tile.event = Some(Event::Treasure {
                gold: 25,
                items: vec![],
                opened: false,
            });
        }

        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            event,
            MoveEvent::Treasure {
                gold: 25,
                items: vec![]
            }
        );

        // Step off and back on: the chest stays opened.
        state.move_party(1, 0, &mut party, &mut content);
        let event = state.move_party(-1, 0, &mut party, &mut content);
        assert_eq!(event, MoveEvent::None);
    }

    #[test]
    fn test_trap_stays_armed_until_disarmed() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let mut rng = GameRng::new(3);
            let trap = roll_trap(5, &mut rng);
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.kind = TileKind::Trap;
            tile.event = Some(Event::Trap(trap));
        }
        let hp_before: i32 = party.members.iter().map(|m| m.hp).sum();

        let event = state.move_party(1, 0, &mut party, &mut content);
        let MoveEvent::Trap { outcomes, .. } = event else {
            panic!("expected trap event, got {event:?}");
        };
        assert!(!outcomes.is_empty());
        let hp_after: i32 = party.members.iter().map(|m| m.hp).sum();
        assert!(hp_after <= hp_before);
        // Firing reveals it.
        if let Some(Event::Trap(t)) = &state.current_floor().unwrap().tile(2, 1).unwrap().event {
            assert!(t.detected);
            assert!(!t.disarmed);
        }

        // Still armed: walking back over it fires again.
        state.move_party(1, 0, &mut party, &mut content);
        let event = state.move_party(-1, 0, &mut party, &mut content);
        assert!(matches!(event, MoveEvent::Trap { .. }));

        // Disarming it ends the firing for good.
        if let Some(Event::Trap(t)) = &mut state
            .floors
            .get_mut(&1)
            .unwrap()
            .tile_mut(2, 1)
            .unwrap()
            .event
        {
            t.disarmed = true;
        }
        state.move_party(1, 0, &mut party, &mut content);
        let event = state.move_party(-1, 0, &mut party, &mut content);
        assert_eq!(event, MoveEvent::None);
    }

    #[test]
    fn test_steps_count_only_committed_moves() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        state.pos = (0, 1);
        assert_eq!(state.steps, 0);
        state.move_party(-1, 0, &mut party, &mut content);
        assert_eq!(state.steps, 0);
        state.move_party(1, 0, &mut party, &mut content);
        state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(state.steps, 2);
    }

    #[test]
    fn test_journal_raises_flags_after_regen() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.event = Some(Event::Journal {
                title: "A torn page".into(),
                text: "Beware the warren king.".into(),
                triggered: false,
                on_find: vec!["warren_lore".into()],
            });
        }
        content.log.clear();

        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            event,
            MoveEvent::Journal {
                title: "A torn page".into(),
                text: "Beware the warren king.".into()
            }
        );
        assert!(content.flag("warren_lore"));
        // Regeneration and status tick precede tile dispatch.
        assert_eq!(
            content.log,
            vec![
                "regen".to_string(),
                "status".to_string(),
                "flag:warren_lore".to_string()
            ]
        );
    }

    #[test]
    fn test_healing_pool_heals_whole_party() {
        let mut content = StubContent::new();
        let mut party = test_party();
        party.members[0].hp = 10;
        party.members[1].hp = 10;
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.kind = TileKind::Interactable;
            tile.event = Some(Event::Interactable {
                kind: InteractableKind::HealingPool,
                magnitude: 30,
                used: false,
            });
        }

        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            event,
            MoveEvent::Interactable {
                kind: InteractableKind::HealingPool,
                magnitude: 30,
                boon: true
            }
        );
        assert_eq!(party.members[0].hp, 22); // 10 + 30% of 40
        assert_eq!(party.members[1].hp, 20); // 10 + 30% of 35 (rounded down)

        // Single use.
        state.move_party(1, 0, &mut party, &mut content);
        let event = state.move_party(-1, 0, &mut party, &mut content);
        assert_eq!(event, MoveEvent::None);
    }

    #[test]
    fn test_shrine_restores_resources() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.kind = TileKind::Interactable;
            tile.event = Some(Event::Interactable {
                kind: InteractableKind::Shrine,
                magnitude: 50,
                used: false,
            });
        }
        state.move_party(1, 0, &mut party, &mut content);
        // Cleric: 5 + 50% of 30, clamped to max.
        assert_eq!(party.members[1].resource, 20);
    }

    #[test]
    fn test_fixed_encounter_triggers_once() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.event = Some(Event::FixedEncounter { triggered: false });
        }

        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            event,
            MoveEvent::FixedEncounter {
                encounter_key: "goblin_pack".into()
            }
        );
        state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            state.move_party(-1, 0, &mut party, &mut content),
            MoveEvent::None
        );
    }

    #[test]
    fn test_boss_tile_uses_boss_key() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(2, 1).unwrap();
            tile.event = Some(Event::BossEncounter { triggered: false });
        }
        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            event,
            MoveEvent::BossEncounter {
                encounter_key: "warren_king".into()
            }
        );
    }

    #[test]
    fn test_random_encounters_follow_rate() {
        let mut content = StubContent::new();
        let mut party = test_party();

        let mut state = open_state(&mut content);
        state.def.encounter_rate = 0;
        for _ in 0..10 {
            assert_eq!(
                state.move_party(1, 0, &mut party, &mut content),
                MoveEvent::None
            );
            assert_eq!(
                state.move_party(-1, 0, &mut party, &mut content),
                MoveEvent::None
            );
        }

        let mut state = open_state(&mut content);
        state.def.encounter_rate = 100;
        assert_eq!(
            state.move_party(1, 0, &mut party, &mut content),
            MoveEvent::RandomEncounter {
                encounter_key: "goblin_pack".into()
            }
        );
    }

    #[test]
    fn test_suppressed_faction_silences_random_encounters() {
        let mut content = StubContent::new();
        content.suppressed = true;
        let mut party = test_party();
        let mut state = open_state(&mut content);
        state.def.encounter_rate = 100;
        assert_eq!(
            state.move_party(1, 0, &mut party, &mut content),
            MoveEvent::None
        );
    }

    #[test]
    fn test_enemy_contact_overrides_tile_event() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let floor = state.floors.get_mut(&1).unwrap();
            let tile = floor.tile_mut(2, 1).unwrap();
            tile.kind = TileKind::Treasure;
            tile.event = Some(Event::Treasure {
                gold: 10,
                items: vec![],
                opened: false,
            });
            floor.enemies.push(Enemy::new(3, 1, "warg".into(), (0, 1)));
        }

        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(
            event,
            MoveEvent::EnemyContact {
                encounter_key: "warg".into()
            }
        );
        // The chest opened anyway; it just lost the headline.
        let floor = state.current_floor().unwrap();
        assert!(matches!(
            floor.tile(2, 1).unwrap().event,
            Some(Event::Treasure { opened: true, .. })
        ));
    }

    #[test]
    fn test_suppressed_faction_ignores_contact() {
        let mut content = StubContent::new();
        content.suppressed = true;
        let mut party = test_party();
        let mut state = open_state(&mut content);
        state
            .floors
            .get_mut(&1)
            .unwrap()
            .enemies
            .push(Enemy::new(3, 1, "warg".into(), (0, 1)));
        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(event, MoveEvent::None);
    }

    #[test]
    fn test_adjacent_trap_detected_while_walking() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let mut rng = GameRng::new(3);
            let trap = roll_trap(1, &mut rng);
            // Tier 1 detect odds plus this party's bonuses pin the chance at
            // the cap.
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(5, 2).unwrap();
            tile.kind = TileKind::Trap;
            tile.event = Some(Event::Trap(trap));
        }

        // Pace beside the trap until the sweep finds it.
        let mut detected = false;
        for _ in 0..50 {
            state.pos = (4, 1);
            state.move_party(1, 0, &mut party, &mut content);
            let floor = state.current_floor().unwrap();
            if let Some(Event::Trap(t)) = &floor.tile(5, 2).unwrap().event {
                if t.detected {
                    detected = true;
                    break;
                }
            }
        }
        assert!(detected, "trap never detected in 50 sweeps at capped odds");
    }

    #[test]
    fn test_secret_door_found_by_sweep() {
        let mut content = StubContent::new();
        let mut party = test_party();
        // Elf ranger party with strong secret senses.
        party.members[0] = {
            let mut m = PartyMember::new("Fletch", ClassKind::Ranger, RaceKind::Elf);
            m.stats.wisdom = 12;
            m.hp = 30;
            m.hp_max = 30;
            m
        };
        let mut state = open_state(&mut content);
        {
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(5, 2).unwrap();
            tile.kind = TileKind::SecretDoor;
        }

        let mut found = false;
        for _ in 0..300 {
            state.pos = (4, 1);
            state.move_party(1, 0, &mut party, &mut content);
            if state
                .current_floor()
                .unwrap()
                .tile(5, 2)
                .unwrap()
                .secret_found()
            {
                found = true;
                break;
            }
        }
        assert!(found, "secret door never found");
        assert!(state.current_floor().unwrap().is_passable(5, 2));
    }

    #[test]
    fn test_disarm_requires_detection() {
        let mut content = StubContent::new();
        let party = test_party();
        let mut state = open_state(&mut content);
        {
            let mut rng = GameRng::new(3);
            let trap = roll_trap(2, &mut rng);
            let tile = state.floors.get_mut(&1).unwrap().tile_mut(5, 5).unwrap();
            tile.kind = TileKind::Trap;
            tile.event = Some(Event::Trap(trap));
        }

        assert!(matches!(
            state.disarm_trap(5, 5, &party),
            Err(DungeonError::TrapNotDetected)
        ));
        assert!(matches!(
            state.disarm_trap(6, 6, &party),
            Err(DungeonError::NotATrap(6, 6))
        ));
        assert!(matches!(
            state.disarm_trap(-1, 0, &party),
            Err(DungeonError::OutOfBounds(-1, 0))
        ));

        if let Some(Event::Trap(t)) = &mut state
            .floors
            .get_mut(&1)
            .unwrap()
            .tile_mut(5, 5)
            .unwrap()
            .event
        {
            t.detected = true;
        }
        let result = state.disarm_trap(5, 5, &party).expect("valid attempt");
        let floor = state.current_floor().unwrap();
        if let Some(Event::Trap(t)) = &floor.tile(5, 5).unwrap().event {
            assert_eq!(t.disarmed, result);
        }
        if result {
            assert!(matches!(
                state.disarm_trap(5, 5, &party),
                Err(DungeonError::TrapAlreadyDisarmed)
            ));
        }
    }

    #[test]
    fn test_stairs_notify_then_descend() {
        let mut content = StubContent::new();
        let mut party = test_party();
        let mut state = open_state(&mut content);
        {
            let floor = state.floors.get_mut(&1).unwrap();
            floor.set_kind(2, 1, TileKind::StairsDown);
            floor.stairs_down = Some((2, 1));
        }

        // Not on stairs yet.
        assert!(matches!(
            state.descend(&mut content),
            Err(DungeonError::NotOnStairs)
        ));

        // Stepping onto the stairs notifies without descending.
        let event = state.move_party(1, 0, &mut party, &mut content);
        assert_eq!(event, MoveEvent::StairsDown);
        assert_eq!(state.floor_num, 1);

        assert_eq!(
            state.descend(&mut content).expect("descend"),
            MoveEvent::StairsDown
        );
        assert_eq!(state.floor_num, 2);
        let floor2 = state.current_floor().unwrap();
        assert_eq!(state.pos, floor2.entrance);
        assert_eq!(
            floor2.kind_at(state.pos.0, state.pos.1),
            Some(TileKind::StairsUp)
        );
    }

    #[test]
    fn test_ascend_returns_to_stairs_or_exits() {
        let mut content = StubContent::new();
        let mut state = DungeonState::enter_seeded(warren_def(), GameRng::new(7), &mut content);

        // On the entrance of floor 1: ascending means leaving.
        assert_eq!(
            state.ascend(&mut content).expect("at entrance"),
            MoveEvent::ExitDungeon
        );
        assert_eq!(state.floor_num, 1);

        let stairs = state.current_floor().unwrap().stairs_down.expect("stairs");
        state.pos = stairs;
        state.descend(&mut content).expect("descend");
        assert_eq!(
            state.ascend(&mut content).expect("ascend"),
            MoveEvent::StairsUp
        );
        assert_eq!(state.floor_num, 1);
        assert_eq!(state.pos, stairs);
    }

    #[test]
    fn test_revisited_floor_comes_from_cache() {
        let mut content = StubContent::new();
        let mut state = DungeonState::enter_seeded(warren_def(), GameRng::new(7), &mut content);

        // Scar floor 1, go down, come back.
        let mark = state.current_floor().unwrap().entrance;
        state
            .floors
            .get_mut(&1)
            .unwrap()
            .tile_mut(mark.0, mark.1)
            .unwrap()
            .discover();
        let stairs = state.current_floor().unwrap().stairs_down.unwrap();
        state.pos = stairs;
        state.descend(&mut content).unwrap();
        state.ascend(&mut content).unwrap();

        assert_eq!(state.floor_num, 1);
        assert!(state
            .current_floor()
            .unwrap()
            .tile(mark.0, mark.1)
            .unwrap()
            .is_discovered());
    }

    #[test]
    fn test_spawned_enemies_respect_buffer_and_table() {
        let mut content = StubContent::new();
        for seed in [7, 19, 4242] {
            let state = DungeonState::enter_seeded(warren_def(), GameRng::new(seed), &mut content);
            let floor = state.current_floor().unwrap();
            assert!(!floor.enemies.is_empty(), "no enemies spawned");
            for enemy in &floor.enemies {
                assert_eq!(enemy.encounter_key, "goblin_pack");
                let d = enemy.distance_to(floor.entrance.0, floor.entrance.1);
                assert!(d > SPAWN_BUFFER, "enemy spawned {d} from the entrance");
                if let Some((sx, sy)) = floor.stairs_down {
                    assert!(enemy.distance_to(sx, sy) > SPAWN_BUFFER);
                }
                assert!(floor.is_passable(enemy.x, enemy.y));
            }
        }
    }

    #[test]
    fn test_no_keys_no_spawns() {
        let mut content = StubContent::new();
        content.keys.clear();
        let state = DungeonState::enter_seeded(warren_def(), GameRng::new(7), &mut content);
        assert!(state.current_floor().unwrap().enemies.is_empty());
    }

    #[test]
    fn test_encounter_key_skips_boss() {
        let mut content = StubContent::new();
        content.keys = vec!["goblin_pack".into(), "warren_king".into()];
        let mut state = open_state(&mut content);
        for _ in 0..50 {
            let key = state.encounter_key(&content).expect("table not empty");
            assert_eq!(key, "goblin_pack");
        }
        content.keys = vec!["warren_king".into()];
        assert_eq!(state.encounter_key(&content), None);
    }

    #[test]
    fn test_kill_enemy_at() {
        let mut content = StubContent::new();
        let mut state = open_state(&mut content);
        state
            .floors
            .get_mut(&1)
            .unwrap()
            .enemies
            .push(Enemy::new(7, 7, "warg".into(), (0, 1)));
        state.kill_enemy_at(7, 7);
        let floor = state.current_floor().unwrap();
        assert!(floor.enemies[0].is_dead());
        assert!(floor.enemy_at(7, 7).is_none());
    }

    mod props {
        use super::super::{secret_detect_chance, trap_detect_chance};
        use crate::consts::{SECRET_DETECT_CAP, TRAP_DETECT_CAP};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_trap_detection_stays_capped(odds in -50i32..200, bonus in -50i32..500) {
                let chance = trap_detect_chance(odds, bonus);
                prop_assert!((0..=TRAP_DETECT_CAP).contains(&chance));
            }

            #[test]
            fn prop_secret_detection_stays_capped(bonus in -50i32..500) {
                let chance = secret_detect_chance(bonus);
                prop_assert!((0..=SECRET_DETECT_CAP).contains(&chance));
            }
        }
    }
}
