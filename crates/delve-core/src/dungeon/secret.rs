//! Secret room placement.
//!
//! Tries to carve a small hidden room off an existing one and seed it with a
//! guarded reward. At most one secret room is attempted per generation call;
//! the first viable candidate/direction wins.

use crate::consts::{CARDINALS, CURSED_CHEST_PERCENT};
use crate::content::DungeonContent;
use crate::rng::GameRng;

use super::floor::Floor;
use super::room::Room;
use super::tile::{Event, TileFlags, TileKind};

/// Attempt to attach one secret room. Returns true when a room was carved.
pub fn place_secret_room(
    floor: &mut Floor,
    floor_num: u32,
    content: &mut dyn DungeonContent,
    rng: &mut GameRng,
) -> bool {
    if floor.rooms.len() < 3 {
        return false;
    }

    // Candidates exclude the entrance room and the stairs/boss room.
    let mut candidates: Vec<usize> = (1..floor.rooms.len() - 1).collect();
    rng.shuffle(&mut candidates);

    for idx in candidates {
        let host = floor.rooms[idx];
        let mut dirs = CARDINALS;
        rng.shuffle(&mut dirs);
        for dir in dirs {
            if try_attach(floor, &host, dir, floor_num, content, rng) {
                return true;
            }
        }
    }
    false
}

/// Try one footprint against one wall of the host room.
fn try_attach(
    floor: &mut Floor,
    host: &Room,
    dir: (i32, i32),
    floor_num: u32,
    content: &mut dyn DungeonContent,
    rng: &mut GameRng,
) -> bool {
    // Random 3x4 footprint orientation.
    let (w, h) = if rng.one_in(2) { (3i32, 4i32) } else { (4i32, 3i32) };

    let hx0 = host.x as i32;
    let hy0 = host.y as i32;
    let hx1 = hx0 + host.width as i32 - 1;
    let hy1 = hy0 + host.height as i32 - 1;
    let (hcx, hcy) = host.center();
    let (hcx, hcy) = (hcx as i32, hcy as i32);

    // Footprint origin, centered on the host along the shared axis and
    // separated from the host interior by the shared wall strip.
    let (x0, y0, door) = match dir {
        (1, 0) => (hx1 + 2, hcy - h / 2, (hx1 + 1, hcy)),
        (-1, 0) => (hx0 - 1 - w, hcy - h / 2, (hx0 - 1, hcy)),
        (0, 1) => (hcx - w / 2, hy1 + 2, (hcx, hy1 + 1)),
        _ => (hcx - w / 2, hy0 - 1 - h, (hcx, hy0 - 1)),
    };

    // Footprint plus a one-tile margin must be in bounds and unshaped wall.
    for y in (y0 - 1)..=(y0 + h) {
        for x in (x0 - 1)..=(x0 + w) {
            // The door position is part of the margin; it must still be the
            // host's untouched wall.
            if floor.kind_at(x, y) != Some(TileKind::Wall) {
                return false;
            }
        }
    }

    // Carve.
    for y in y0..(y0 + h) {
        for x in x0..(x0 + w) {
            if let Some(tile) = floor.tile_mut(x, y) {
                tile.kind = TileKind::Floor;
                tile.flags.insert(TileFlags::SECRET_ROOM);
            }
        }
    }

    // Secret door at the connecting wall midpoint: undiscovered, impassable
    // until found.
    if let Some(tile) = floor.tile_mut(door.0, door.1) {
        tile.kind = TileKind::SecretDoor;
        tile.flags.insert(TileFlags::SECRET_ROOM);
    }

    // Guarded reward chest at the center.
    let item = if rng.percent(CURSED_CHEST_PERCENT) {
        content.roll_cursed_item(floor_num, rng)
    } else {
        content.roll_secret_item(floor_num, rng)
    };
    let gold = 40 * floor_num + rng.rnd(60 * floor_num);
    let (cx, cy) = (x0 + w / 2, y0 + h / 2);
    if let Some(tile) = floor.tile_mut(cx, cy) {
        tile.kind = TileKind::Treasure;
        tile.event = Some(Event::Treasure {
            gold,
            items: vec![item],
            opened: false,
        });
    }

    floor
        .rooms
        .push(Room::new(x0 as usize, y0 as usize, w as usize, h as usize));
    true
}
