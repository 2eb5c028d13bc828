//! Party-centered viewport extraction.
//!
//! Renders nothing itself; produces a window of display cells a frontend can
//! draw directly. Cells outside the grid are `None` so edges render as void
//! rather than wall.

use super::DungeonState;

/// One display cell of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportTile {
    pub symbol: char,
    pub discovered: bool,
}

/// Extract a `width` x `height` window centered on the party.
///
/// Rows are top to bottom. The party renders as `@`, living enemies on
/// discovered tiles as `e`, undiscovered tiles as blank.
pub fn visible_tiles(
    state: &DungeonState,
    width: usize,
    height: usize,
) -> Vec<Vec<Option<ViewportTile>>> {
    let Some(floor) = state.current_floor() else {
        return vec![vec![None; width]; height];
    };
    let (px, py) = state.pos;
    let x0 = px - width as i32 / 2;
    let y0 = py - height as i32 / 2;

    let mut rows = Vec::with_capacity(height);
    for row in 0..height as i32 {
        let mut cells = Vec::with_capacity(width);
        for col in 0..width as i32 {
            let (x, y) = (x0 + col, y0 + row);
            let Some(tile) = floor.tile(x, y) else {
                cells.push(None);
                continue;
            };
            let discovered = tile.is_discovered();
            let symbol = if (x, y) == (px, py) {
                '@'
            } else if !discovered {
                ' '
            } else if floor.enemy_at(x, y).is_some() {
                'e'
            } else {
                tile.symbol()
            };
            cells.push(Some(ViewportTile { symbol, discovered }));
        }
        rows.push(cells);
    }
    rows
}
