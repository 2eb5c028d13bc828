//! Floor structure.
//!
//! A floor owns its tile grid as a flat row-major array, its room list, and
//! its resident enemies. Everything mutable at runtime (event payloads,
//! discovery flags, enemy state) lives here and persists for the session.

use serde::{Deserialize, Serialize};

use crate::enemy::Enemy;

use super::room::Room;
use super::tile::{Tile, TileKind};

/// A complete generated floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub width: usize,
    pub height: usize,
    /// Row-major tile grid, `width * height` entries.
    tiles: Vec<Tile>,
    pub rooms: Vec<Room>,
    pub entrance: (i32, i32),
    pub stairs_down: Option<(i32, i32)>,
    pub enemies: Vec<Enemy>,
}

impl Floor {
    /// Create a floor of solid wall.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); width * height],
            rooms: Vec::new(),
            entrance: (0, 0),
            stairs_down: None,
            enemies: Vec::new(),
        }
    }

    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at position; absent when out of bounds.
    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&self.tiles[y as usize * self.width + x as usize])
    }

    /// Mutable tile at position; absent when out of bounds.
    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&mut self.tiles[y as usize * self.width + x as usize])
    }

    pub fn kind_at(&self, x: i32, y: i32) -> Option<TileKind> {
        self.tile(x, y).map(|t| t.kind)
    }

    /// Overwrite a tile's terrain kind, keeping flags and event.
    pub fn set_kind(&mut self, x: i32, y: i32, kind: TileKind) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.kind = kind;
        }
    }

    /// Passability of a position. Out of bounds is impassable.
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map(|t| t.is_passable()).unwrap_or(false)
    }

    /// Reveal a circular patch of fog around a position.
    pub fn reveal_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                if let Some(tile) = self.tile_mut(cx + dx, cy + dy) {
                    tile.discover();
                }
            }
        }
    }

    /// Count tiles of a kind.
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// All passable positions, row-major order.
    pub fn walkable_positions(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.is_passable(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Room index containing a position, if any.
    pub fn room_at(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rooms
            .iter()
            .position(|r| r.contains(x as usize, y as usize))
    }

    /// Living enemies.
    pub fn living_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| !e.is_dead())
    }

    /// Living enemy at a position.
    pub fn enemy_at(&self, x: i32, y: i32) -> Option<&Enemy> {
        self.living_enemies().find(|e| e.x == x && e.y == y)
    }
}
