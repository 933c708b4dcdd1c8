use std::collections::HashSet;
use std::fmt;

use crate::error::MazeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    East,
    South,
    West,
}

impl Dir {
    /// Neighbor check order. Solving relies on it being fixed.
    pub const ALL: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::East => Dir::West,
            Dir::South => Dir::North,
            Dir::West => Dir::East,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Dir::North => 'N',
            Dir::East => 'E',
            Dir::South => 'S',
            Dir::West => 'W',
        }
    }

    pub fn from_letter(ch: char) -> Option<Dir> {
        match ch {
            'N' => Some(Dir::North),
            'E' => Some(Dir::East),
            'S' => Some(Dir::South),
            'W' => Some(Dir::West),
            _ => None,
        }
    }

    /// Bit used for this wall in the hex file format.
    pub fn bit(self) -> u8 {
        match self {
            Dir::North => 1,
            Dir::East => 2,
            Dir::South => 4,
            Dir::West => 8,
        }
    }
}

/// Wall state of one grid location. `true` means the wall is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
    pub visited: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            north: true,
            east: true,
            south: true,
            west: true,
            visited: false,
        }
    }
}

impl Cell {
    pub fn wall(&self, dir: Dir) -> bool {
        match dir {
            Dir::North => self.north,
            Dir::East => self.east,
            Dir::South => self.south,
            Dir::West => self.west,
        }
    }

    pub(crate) fn set_wall(&mut self, dir: Dir, present: bool) {
        match dir {
            Dir::North => self.north = present,
            Dir::East => self.east = present,
            Dir::South => self.south = present,
            Dir::West => self.west = present,
        }
    }

    pub(crate) fn close_all(&mut self) {
        for dir in Dir::ALL {
            self.set_wall(dir, true);
        }
    }

    /// north*1 + east*2 + south*4 + west*8
    pub fn mask(&self) -> u8 {
        Dir::ALL
            .iter()
            .filter(|dir| self.wall(**dir))
            .map(|dir| dir.bit())
            .sum()
    }

    pub fn from_mask(mask: u8) -> Self {
        let mut cell = Cell::default();
        for dir in Dir::ALL {
            cell.set_wall(dir, mask & dir.bit() != 0);
        }
        cell
    }
}

/// Dense row-major grid of cells, indexed by `y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid with every wall closed and nothing visited.
    pub fn new(width: usize, height: usize) -> Result<Self, MazeError> {
        if width == 0 || height == 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        })
    }

    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn check(&self, pos: Pos) -> Result<(), MazeError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn idx(&self, pos: Pos) -> usize {
        pos.y * self.width + pos.x
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[self.idx(pos)]
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        let idx = self.idx(pos);
        &mut self.cells[idx]
    }

    /// The in-bounds neighbor of `pos` in `dir`, if any.
    pub fn step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x.checked_add_signed(dx)?;
        let ny = pos.y.checked_add_signed(dy)?;
        let next = Pos::new(nx, ny);
        self.contains(next).then_some(next)
    }

    /// True when movement from `pos` towards `dir` is not blocked.
    pub fn is_open(&self, pos: Pos, dir: Dir) -> bool {
        self.step(pos, dir).is_some() && !self.cell(pos).wall(dir)
    }

    /// Removes the wall between `pos` and its neighbor in `dir` on both sides.
    pub(crate) fn carve_between(&mut self, pos: Pos, dir: Dir) -> Option<Pos> {
        let next = self.step(pos, dir)?;
        self.cell_mut(pos).set_wall(dir, false);
        self.cell_mut(next).set_wall(dir.opposite(), false);
        Some(next)
    }

    /// Clears every visited flag except on the `keep` cells. Walls are untouched.
    pub fn reset_visited(&mut self, keep: &HashSet<Pos>) {
        let width = self.width;
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            if !keep.contains(&Pos::new(idx % width, idx / width)) {
                cell.visited = false;
            }
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
