//! Enemy AI tick.
//!
//! One tick advances every living enemy once: patrol along a cached
//! direction, chase when the party comes inside alert range, contact when
//! the Manhattan distance drops to 1 or less. The first enemy to make
//! contact short-circuits the rest of the tick.

use hashbrown::HashSet;

use crate::consts::{CARDINALS, PATROL_TURN_PERCENT};
use crate::dungeon::Floor;
use crate::rng::GameRng;

use super::{AiState, Enemy};

/// Result of one enemy tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnemyTick {
    /// An enemy reached the party; its encounter key wins the tick.
    Contact { encounter_key: String },
    /// Everyone moved (or waited) without reaching the party.
    NoContact,
}

/// Advance all enemies on a floor by one tick.
///
/// Enemies share one occupied-position set so they never stack. Passability
/// reuses the tile rule, so unfound secret doors block enemies too.
pub fn advance_enemies(floor: &mut Floor, px: i32, py: i32, rng: &mut GameRng) -> EnemyTick {
    let mut enemies = std::mem::take(&mut floor.enemies);
    let mut occupied: HashSet<(i32, i32)> = enemies
        .iter()
        .filter(|e| !e.is_dead())
        .map(|e| (e.x, e.y))
        .collect();

    let mut result = EnemyTick::NoContact;

    for enemy in enemies.iter_mut() {
        if enemy.is_dead() {
            continue;
        }

        // Contact is checked before movement; the first hit ends the tick.
        if enemy.distance_to(px, py) <= 1 {
            result = EnemyTick::Contact {
                encounter_key: enemy.encounter_key.clone(),
            };
            break;
        }

        if enemy.state == AiState::Patrol && enemy.distance_to(px, py) <= enemy.alert_range {
            enemy.state = AiState::Chase;
        }

        if enemy.cooldown > 0 {
            enemy.cooldown -= 1;
            continue;
        }

        match enemy.state {
            AiState::Patrol => patrol_step(enemy, floor, &mut occupied, rng),
            AiState::Chase => chase_step(enemy, floor, &mut occupied, px, py),
            AiState::Dead => {}
        }
    }

    floor.enemies = enemies;
    result
}

fn try_move(
    enemy: &mut Enemy,
    floor: &Floor,
    occupied: &mut HashSet<(i32, i32)>,
    dx: i32,
    dy: i32,
) -> bool {
    let nx = enemy.x + dx;
    let ny = enemy.y + dy;
    if !floor.is_passable(nx, ny) || occupied.contains(&(nx, ny)) {
        return false;
    }
    occupied.remove(&(enemy.x, enemy.y));
    enemy.x = nx;
    enemy.y = ny;
    occupied.insert((nx, ny));
    true
}

fn patrol_step(
    enemy: &mut Enemy,
    floor: &Floor,
    occupied: &mut HashSet<(i32, i32)>,
    rng: &mut GameRng,
) {
    if rng.percent(PATROL_TURN_PERCENT) {
        enemy.dir = CARDINALS[rng.rn2(4) as usize];
    }
    let (dx, dy) = enemy.dir;
    if try_move(enemy, floor, occupied, dx, dy) {
        enemy.cooldown = enemy.move_cooldown();
    } else {
        // Blocked: turn around, move next tick.
        enemy.dir = (-dx, -dy);
    }
}

fn chase_step(
    enemy: &mut Enemy,
    floor: &Floor,
    occupied: &mut HashSet<(i32, i32)>,
    px: i32,
    py: i32,
) {
    for _ in 0..enemy.chase_speed {
        let dx = px - enemy.x;
        let dy = py - enemy.y;
        if dx.abs() + dy.abs() <= 1 {
            break;
        }

        // Prefer the axis with the larger gap, then the other axis, then a
        // sidestep along the other axis.
        let candidates = if dx.abs() >= dy.abs() {
            let side = if dy != 0 { dy.signum() } else { 1 };
            [(dx.signum(), 0), (0, side), (0, -side)]
        } else {
            let side = if dx != 0 { dx.signum() } else { 1 };
            [(0, dy.signum()), (side, 0), (-side, 0)]
        };

        let moved = candidates
            .iter()
            .any(|&(cdx, cdy)| try_move(enemy, floor, occupied, cdx, cdy));
        if moved {
            enemy.cooldown = enemy.move_cooldown();
        } else {
            break;
        }
    }
}
