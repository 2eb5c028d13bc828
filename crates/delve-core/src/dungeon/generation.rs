//! Floor generation.
//!
//! Builds one complete floor from a generation-scoped RNG: room packing,
//! L-shaped corridor routing, door placement, entrance/stairs/boss anchors,
//! then the content passes (treasure, traps, fixed encounters, journals,
//! interactables, secret room). Degenerate layouts fall back to a single
//! safe entrance tile instead of producing an invalid floor.

use crate::consts::{
    FIXED_ENCOUNTER_PERCENT, ROOM_ATTEMPT_FACTOR, ROOM_MAX_H, ROOM_MAX_W, ROOM_MIN_H, ROOM_MIN_W,
};
use crate::content::DungeonContent;
use crate::rng::GameRng;

use super::door::place_doors;
use super::floor::Floor;
use super::interactable;
use super::room::Room;
use super::secret::place_secret_room;
use super::tile::{Event, TileKind};
use super::trap::roll_trap;

/// Static inputs for one floor generation call.
#[derive(Debug, Clone)]
pub struct FloorParams<'a> {
    pub width: usize,
    pub height: usize,
    /// 1-based floor number.
    pub floor: u32,
    pub total_floors: u32,
    /// Cosmetic theme tag, also picks the interactable pool.
    pub theme: &'a str,
    pub dungeon_id: &'a str,
    /// Fixed per-dungeon difficulty shift applied to trap tiers.
    pub difficulty: i32,
}

impl FloorParams<'_> {
    /// Trap tier for this floor, clamped into the catalog range.
    pub fn trap_tier(&self) -> u8 {
        (self.floor as i32 + self.difficulty).clamp(1, 5) as u8
    }
}

/// Generate one complete floor.
pub fn generate_floor(
    params: &FloorParams<'_>,
    rng: &mut GameRng,
    content: &mut dyn DungeonContent,
) -> Floor {
    let mut floor = Floor::new(params.width, params.height);

    place_rooms(&mut floor, params, rng);
    if floor.rooms.is_empty() {
        // Degenerate grid: a single safe entrance tile at the center.
        let cx = (params.width / 2) as i32;
        let cy = (params.height / 2) as i32;
        floor.set_kind(cx, cy, TileKind::Entrance);
        floor.entrance = (cx, cy);
        return floor;
    }

    carve_corridors(&mut floor, rng);
    place_doors(&mut floor, rng);
    place_anchors(&mut floor, params, content);
    place_treasure(&mut floor, params, content, rng);
    place_traps(&mut floor, params, rng);
    place_fixed_encounters(&mut floor, rng);
    place_journals(&mut floor, params, content, rng);
    place_interactables(&mut floor, params, rng);

    let secret_chance = 0.35 + 0.08 * params.floor as f64;
    if floor.rooms.len() >= 3 && rng.chance(secret_chance) {
        place_secret_room(&mut floor, params.floor, content, rng);
    }

    floor
}

/// Room cap for a floor; deeper floors pack more rooms.
fn max_rooms(floor: u32) -> usize {
    (6 + 2 * floor as usize).min(12)
}

fn place_rooms(floor: &mut Floor, params: &FloorParams<'_>, rng: &mut GameRng) {
    let cap = max_rooms(params.floor);
    let attempts = cap * ROOM_ATTEMPT_FACTOR;

    for _ in 0..attempts {
        if floor.rooms.len() >= cap {
            break;
        }

        let w = rng.range(ROOM_MIN_W as u32, ROOM_MAX_W as u32) as usize;
        let h = rng.range(ROOM_MIN_H as u32, ROOM_MAX_H as u32) as usize;

        // Keep a two-tile border so every room has a wall strip and a
        // corridor side inside the grid.
        if params.width < w + 5 || params.height < h + 5 {
            continue;
        }
        let x = 2 + rng.rn2((params.width - w - 4) as u32 + 1) as usize;
        let y = 2 + rng.rn2((params.height - h - 4) as u32 + 1) as usize;

        let room = Room::new(x, y, w, h);
        if floor.rooms.iter().any(|r| room.overlaps(r, 1)) {
            continue;
        }

        for ty in room.y..room.y + room.height {
            for tx in room.x..room.x + room.width {
                floor.set_kind(tx as i32, ty as i32, TileKind::Floor);
            }
        }
        floor.rooms.push(room);
    }
}

/// Connect rooms in placement order with L-shaped corridors; the bend
/// direction is a coin flip per connection.
fn carve_corridors(floor: &mut Floor, rng: &mut GameRng) {
    for i in 1..floor.rooms.len() {
        let (ax, ay) = floor.rooms[i - 1].center();
        let (bx, by) = floor.rooms[i].center();
        let (ax, ay, bx, by) = (ax as i32, ay as i32, bx as i32, by as i32);

        if rng.one_in(2) {
            carve_h(floor, ax, bx, ay);
            carve_v(floor, ay, by, bx);
        } else {
            carve_v(floor, ay, by, ax);
            carve_h(floor, ax, bx, by);
        }
    }
}

fn carve_h(floor: &mut Floor, x0: i32, x1: i32, y: i32) {
    for x in x0.min(x1)..=x0.max(x1) {
        if floor.kind_at(x, y) == Some(TileKind::Wall) {
            floor.set_kind(x, y, TileKind::Corridor);
        }
    }
}

fn carve_v(floor: &mut Floor, y0: i32, y1: i32, x: i32) {
    for y in y0.min(y1)..=y0.max(y1) {
        if floor.kind_at(x, y) == Some(TileKind::Wall) {
            floor.set_kind(x, y, TileKind::Corridor);
        }
    }
}

/// Entrance in the first room; stairs-down or boss in the last room.
fn place_anchors(floor: &mut Floor, params: &FloorParams<'_>, content: &mut dyn DungeonContent) {
    let (ex, ey) = floor.rooms[0].center();
    let (ex, ey) = (ex as i32, ey as i32);
    // Down-stairs visual on floor 1, up-stairs otherwise.
    let entrance_kind = if params.floor == 1 {
        TileKind::Entrance
    } else {
        TileKind::StairsUp
    };
    floor.set_kind(ex, ey, entrance_kind);
    floor.entrance = (ex, ey);

    if floor.rooms.len() <= 1 {
        return;
    }

    let last = floor.rooms[floor.rooms.len() - 1];
    let (lx, ly) = last.center();
    let (lx, ly) = (lx as i32, ly as i32);

    if params.floor < params.total_floors {
        floor.set_kind(lx, ly, TileKind::StairsDown);
        floor.stairs_down = Some((lx, ly));
    } else if content.boss_key(params.dungeon_id).is_some() {
        if let Some(tile) = floor.tile_mut(lx, ly) {
            tile.event = Some(Event::BossEncounter { triggered: false });
        }
    }
}

/// Random plain floor tile inside a room, free of events.
fn free_room_tile(floor: &Floor, room_idx: usize, rng: &mut GameRng) -> Option<(i32, i32)> {
    let room = floor.rooms[room_idx];
    for _ in 0..40 {
        let (x, y) = room.random_point(rng);
        let (x, y) = (x as i32, y as i32);
        if let Some(tile) = floor.tile(x, y) {
            if tile.kind == TileKind::Floor && tile.event.is_none() {
                return Some((x, y));
            }
        }
    }
    None
}

fn place_treasure(
    floor: &mut Floor,
    params: &FloorParams<'_>,
    content: &mut dyn DungeonContent,
    rng: &mut GameRng,
) {
    if floor.rooms.len() <= 1 {
        return;
    }
    let count = params.floor.max(1);
    for _ in 0..count {
        let room_idx = 1 + rng.rn2(floor.rooms.len() as u32 - 1) as usize;
        if let Some((x, y)) = free_room_tile(floor, room_idx, rng) {
            let gold = 15 * params.floor + rng.rnd(25 * params.floor);
            let mut items = Vec::new();
            // Bonus item odds climb with depth.
            if rng.percent(15 + 5 * params.floor) {
                items.push(content.roll_item(params.floor, rng));
            }
            if let Some(tile) = floor.tile_mut(x, y) {
                tile.kind = TileKind::Treasure;
                tile.event = Some(Event::Treasure {
                    gold,
                    items,
                    opened: false,
                });
            }
        }
    }
}

fn place_traps(floor: &mut Floor, params: &FloorParams<'_>, rng: &mut GameRng) {
    let count = 2 + 2 * params.floor;
    let tier = params.trap_tier();
    let mut placed = 0;
    let mut attempts = 0;
    let attempt_cap = count * 60;

    while placed < count && attempts < attempt_cap {
        attempts += 1;
        let x = rng.rn2(floor.width as u32) as i32;
        let y = rng.rn2(floor.height as u32) as i32;
        let eligible = matches!(
            floor.kind_at(x, y),
            Some(TileKind::Floor) | Some(TileKind::Corridor)
        ) && floor.tile(x, y).map(|t| t.event.is_none()).unwrap_or(false);
        if !eligible {
            continue;
        }
        let trap = roll_trap(tier, rng);
        if let Some(tile) = floor.tile_mut(x, y) {
            tile.kind = TileKind::Trap;
            tile.event = Some(Event::Trap(trap));
        }
        placed += 1;
    }
}

fn place_fixed_encounters(floor: &mut Floor, rng: &mut GameRng) {
    for room_idx in 1..floor.rooms.len() {
        if !rng.percent(FIXED_ENCOUNTER_PERCENT) {
            continue;
        }
        if let Some((x, y)) = free_room_tile(floor, room_idx, rng) {
            if let Some(tile) = floor.tile_mut(x, y) {
                tile.event = Some(Event::FixedEncounter { triggered: false });
            }
        }
    }
}

/// Does any tile of this room carry an event?
fn room_has_event(floor: &Floor, room_idx: usize) -> bool {
    let room = floor.rooms[room_idx];
    for y in room.y..room.y + room.height {
        for x in room.x..room.x + room.width {
            if let Some(tile) = floor.tile(x as i32, y as i32) {
                if tile.event.is_some() {
                    return true;
                }
            }
        }
    }
    false
}

fn place_journals(
    floor: &mut Floor,
    params: &FloorParams<'_>,
    content: &mut dyn DungeonContent,
    rng: &mut GameRng,
) {
    let journals = content.journals(params.dungeon_id, params.floor);
    if journals.is_empty() {
        return;
    }

    // Distinct rooms that do not already carry an event.
    let mut rooms: Vec<usize> = (1..floor.rooms.len())
        .filter(|&idx| !room_has_event(floor, idx))
        .collect();
    rng.shuffle(&mut rooms);

    for (journal, room_idx) in journals.into_iter().zip(rooms) {
        if let Some((x, y)) = free_room_tile(floor, room_idx, rng) {
            if let Some(tile) = floor.tile_mut(x, y) {
                tile.event = Some(Event::Journal {
                    title: journal.title,
                    text: journal.text,
                    triggered: false,
                    on_find: journal.on_find,
                });
            }
        }
    }
}

fn place_interactables(floor: &mut Floor, params: &FloorParams<'_>, rng: &mut GameRng) {
    let count = (1 + params.floor / 2).min(3);
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < count * 60 {
        attempts += 1;
        let x = rng.rn2(floor.width as u32) as i32;
        let y = rng.rn2(floor.height as u32) as i32;
        let eligible = floor.kind_at(x, y) == Some(TileKind::Floor)
            && floor.tile(x, y).map(|t| t.event.is_none()).unwrap_or(false);
        if !eligible {
            continue;
        }
        let event = interactable::roll(params.theme, params.floor, rng);
        if let Some(tile) = floor.tile_mut(x, y) {
            tile.kind = TileKind::Interactable;
            tile.event = Some(event);
        }
        placed += 1;
    }
}
