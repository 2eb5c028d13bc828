//! Door placement.
//!
//! For each room wall we scan the wall strip together with the parallel
//! strip one tile further out (the corridor side). Contiguous runs where the
//! outer tile is corridor form candidate segments; each segment gets at most
//! one door, preferably in the middle, and corner-like positions (3+ wall
//! neighbors) are never used.

use crate::consts::{CARDINALS, DOOR_SKIP_PERCENT};
use crate::rng::GameRng;

use super::floor::Floor;
use super::tile::TileKind;

/// Place doors on every room wall of the floor.
pub fn place_doors(floor: &mut Floor, rng: &mut GameRng) {
    for idx in 0..floor.rooms.len() {
        let room = floor.rooms[idx];
        let x0 = room.x as i32;
        let y0 = room.y as i32;
        let x1 = x0 + room.width as i32 - 1;
        let y1 = y0 + room.height as i32 - 1;

        // Top and bottom walls: wall strip at y0-1 / y1+1, corridor side one
        // tile further out.
        let top: Vec<_> = (x0..=x1).map(|x| ((x, y0 - 1), (x, y0 - 2))).collect();
        let bottom: Vec<_> = (x0..=x1).map(|x| ((x, y1 + 1), (x, y1 + 2))).collect();
        // Left and right walls.
        let left: Vec<_> = (y0..=y1).map(|y| ((x0 - 1, y), (x0 - 2, y))).collect();
        let right: Vec<_> = (y0..=y1).map(|y| ((x1 + 1, y), (x1 + 2, y))).collect();

        for strip in [top, bottom, left, right] {
            place_on_strip(floor, &strip, rng);
        }
    }
}

/// Split a wall strip into contiguous corridor-backed segments and place at
/// most one door per segment.
fn place_on_strip(floor: &mut Floor, strip: &[((i32, i32), (i32, i32))], rng: &mut GameRng) {
    let mut segment: Vec<(i32, i32)> = Vec::new();
    for &(wall, outer) in strip {
        if floor.kind_at(outer.0, outer.1) == Some(TileKind::Corridor) {
            segment.push(wall);
        } else if !segment.is_empty() {
            place_door_in_segment(floor, &segment, rng);
            segment.clear();
        }
    }
    if !segment.is_empty() {
        place_door_in_segment(floor, &segment, rng);
    }
}

fn place_door_in_segment(floor: &mut Floor, segment: &[(i32, i32)], rng: &mut GameRng) {
    // An already-open wall tile means the corridor breached here; the
    // segment is connected and needs no door.
    let already_open = segment.iter().any(|&(x, y)| {
        matches!(
            floor.kind_at(x, y),
            Some(TileKind::Floor) | Some(TileKind::Corridor) | Some(TileKind::Door)
        )
    });
    if already_open {
        return;
    }

    // Doorless gaps happen on purpose.
    if rng.percent(DOOR_SKIP_PERCENT) {
        return;
    }

    let candidates: Vec<(i32, i32)> = segment
        .iter()
        .copied()
        .filter(|&(x, y)| {
            floor.kind_at(x, y) == Some(TileKind::Wall) && wall_neighbors(floor, x, y) < 3
        })
        .collect();
    if candidates.is_empty() {
        return;
    }

    let (dx, dy) = candidates[candidates.len() / 2];
    floor.set_kind(dx, dy, TileKind::Door);
}

/// Count wall-like cardinal neighbors. Out of bounds counts as wall.
fn wall_neighbors(floor: &Floor, x: i32, y: i32) -> usize {
    CARDINALS
        .iter()
        .filter(|&&(dx, dy)| {
            matches!(
                floor.kind_at(x + dx, y + dy),
                None | Some(TileKind::Wall) | Some(TileKind::SecretDoor)
            )
        })
        .count()
}
