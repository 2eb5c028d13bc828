//! Room rectangles.
//!
//! Rooms are plain value structs referenced by index into the floor's room
//! list; they carry no identity of their own.

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;

/// Rectangle describing a room interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Left edge of the interior.
    pub x: usize,
    /// Top edge of the interior.
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Room {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Check overlap against another room, with `buffer` tiles of padding
    /// counted as overlapping.
    pub fn overlaps(&self, other: &Room, buffer: usize) -> bool {
        let a_x0 = self.x.saturating_sub(buffer);
        let a_y0 = self.y.saturating_sub(buffer);
        let a_x1 = self.x + self.width + buffer;
        let a_y1 = self.y + self.height + buffer;

        a_x0 < other.x + other.width
            && other.x < a_x1
            && a_y0 < other.y + other.height
            && other.y < a_y1
    }

    /// Random interior point.
    pub fn random_point(&self, rng: &mut GameRng) -> (usize, usize) {
        (
            self.x + rng.rn2(self.width as u32) as usize,
            self.y + rng.rn2(self.height as u32) as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_overlap() {
        let room1 = Room::new(5, 5, 5, 5);
        let room2 = Room::new(8, 8, 5, 5);
        let room3 = Room::new(15, 15, 5, 5);

        assert!(room1.overlaps(&room2, 0));
        assert!(!room1.overlaps(&room3, 0));
        assert!(room1.overlaps(&room3, 15));
    }

    #[test]
    fn test_adjacent_rooms_overlap_with_buffer() {
        let room1 = Room::new(5, 5, 4, 4);
        let room2 = Room::new(9, 5, 4, 4);
        assert!(!room1.overlaps(&room2, 0));
        assert!(room1.overlaps(&room2, 1));
    }

    #[test]
    fn test_center_and_contains() {
        let room = Room::new(2, 3, 4, 5);
        let (cx, cy) = room.center();
        assert!(room.contains(cx, cy));
        assert!(!room.contains(1, 3));
        assert!(!room.contains(6, 3));
    }
}
