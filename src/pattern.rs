//! The "42" glyph stamped, fully walled, into the middle of the maze.

use std::collections::HashSet;

use crate::grid::{Grid, Pos};

const DIGIT_W: usize = 3;
const DIGIT_H: usize = 5;
pub const PATTERN_W: usize = DIGIT_W + 1 + DIGIT_W;
pub const PATTERN_H: usize = DIGIT_H;

const FOUR: [[u8; DIGIT_W]; DIGIT_H] = [
    [1, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 0, 1],
    [0, 0, 1],
];

const TWO: [[u8; DIGIT_W]; DIGIT_H] = [
    [1, 1, 1],
    [0, 0, 1],
    [1, 1, 1],
    [1, 0, 0],
    [1, 1, 1],
];

const DIGITS: [(&[[u8; DIGIT_W]; DIGIT_H], usize); 2] = [(&FOUR, 0), (&TWO, DIGIT_W + 1)];

/// True when the glyph fits with at least one free cell on every side.
pub fn fits(width: usize, height: usize) -> bool {
    width >= PATTERN_W + 2 && height >= PATTERN_H + 2
}

/// Cells covered by the glyph in a `width` x `height` maze, or `None` if it does not fit.
pub fn cells(width: usize, height: usize) -> Option<HashSet<Pos>> {
    if !fits(width, height) {
        return None;
    }
    let x0 = (width - PATTERN_W) / 2;
    let y0 = (height - PATTERN_H) / 2;
    let mut out = HashSet::new();
    for (bitmap, offset) in DIGITS {
        for (dy, row) in bitmap.iter().enumerate() {
            for (dx, &on) in row.iter().enumerate() {
                if on == 1 {
                    out.insert(Pos::new(x0 + offset + dx, y0 + dy));
                }
            }
        }
    }
    Some(out)
}

/// Closes and marks visited every glyph cell. Returns the stamped set.
pub fn stamp(grid: &mut Grid) -> Option<HashSet<Pos>> {
    let set = cells(grid.width(), grid.height())?;
    for &pos in &set {
        let cell = grid.cell_mut(pos);
        cell.close_all();
        cell.visited = true;
    }
    Some(set)
}
