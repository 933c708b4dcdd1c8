//! The maze engine: backtracking carve, wall breaking and breadth-first solving.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::MazeError;
use crate::grid::{Dir, Grid, Pos};
use crate::hexfile;
use crate::path::Path;
use crate::pattern;
use crate::render::Frame;

/// Probability used for imperfect mazes when nothing else is configured.
pub const DEFAULT_BREAK_CHANCE: f64 = 0.1;

/// One maze generation cycle. Regenerating means building a new `Maze`.
pub struct Maze<R = StdRng> {
    grid: Grid,
    pattern: HashSet<Pos>,
    rng: R,
}

impl Maze<StdRng> {
    /// A fully walled maze. `seed` makes carving and wall breaking reproducible.
    pub fn new(width: usize, height: usize, seed: Option<u64>) -> Result<Self, MazeError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(width, height, rng)
    }
}

impl<R: Rng> Maze<R> {
    pub fn with_rng(width: usize, height: usize, rng: R) -> Result<Self, MazeError> {
        Ok(Self {
            grid: Grid::new(width, height)?,
            pattern: HashSet::new(),
            rng,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pattern(&self) -> &HashSet<Pos> {
        &self.pattern
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Stamps the "42" glyph. Returns false, leaving the grid alone, when it does not fit.
    pub fn stamp_pattern(&mut self) -> bool {
        match pattern::stamp(&mut self.grid) {
            Some(cells) => {
                debug!(cells = cells.len(), "pattern stamped");
                self.pattern = cells;
                true
            }
            None => {
                warn!(
                    width = self.width(),
                    height = self.height(),
                    "maze too small for the 42 pattern, continuing without it"
                );
                false
            }
        }
    }

    pub fn carve(&mut self, entry: Pos) -> Result<(), MazeError> {
        self.carve_with(entry, |_| Ok(()))
    }

    /// Carves like [`Maze::carve`], calling `draw` and sleeping `delay` after every wall removal.
    pub fn carve_animated<F>(
        &mut self,
        entry: Pos,
        delay: Duration,
        mut draw: F,
    ) -> Result<(), MazeError>
    where
        F: FnMut(&Frame<'_>) -> io::Result<()>,
    {
        self.carve_with(entry, |frame| {
            draw(frame)?;
            thread::sleep(delay);
            Ok(())
        })
    }

    fn carve_with<F>(&mut self, entry: Pos, mut on_step: F) -> Result<(), MazeError>
    where
        F: FnMut(&Frame<'_>) -> io::Result<()>,
    {
        self.grid.check(entry)?;
        if self.pattern.contains(&entry) {
            return Err(MazeError::PatternCell(entry));
        }

        let Self { grid, pattern, rng } = self;
        grid.cell_mut(entry).visited = true;
        let mut stack = vec![entry];
        let mut opened = 0usize;

        while let Some(&pos) = stack.last() {
            let candidates: Vec<Dir> = Dir::ALL
                .into_iter()
                .filter(|&dir| {
                    grid.step(pos, dir)
                        .is_some_and(|next| !grid.cell(next).visited && !pattern.contains(&next))
                })
                .collect();

            let Some(&dir) = candidates.choose(rng) else {
                stack.pop();
                continue;
            };
            let Some(next) = grid.carve_between(pos, dir) else {
                continue;
            };
            grid.cell_mut(next).visited = true;
            stack.push(next);
            opened += 1;

            let mut frame = Frame::new(grid, entry, pattern);
            frame.highlight = Some(next);
            frame.show_generation = true;
            on_step(&frame)?;
        }

        debug!(opened, "carve finished");
        grid.reset_visited(pattern);
        Ok(())
    }

    /// Clears visited flags on every non-pattern cell.
    pub fn reset_visited(&mut self) {
        self.grid.reset_visited(&self.pattern);
    }

    /// Gives every non-pattern cell a `chance` to open one wall in a random direction.
    ///
    /// A direction that leaves the grid or leads into the pattern skips the cell;
    /// no other direction is tried. This biases breaks away from edges and the
    /// pattern and is kept on purpose. A non-finite `chance` breaks nothing.
    pub fn break_walls(&mut self, chance: f64) {
        let chance = if chance.is_finite() {
            chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut broken = 0usize;
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = Pos::new(x, y);
                if self.pattern.contains(&pos) {
                    continue;
                }
                if self.rng.gen::<f64>() >= chance {
                    continue;
                }
                let dir = Dir::ALL[self.rng.gen_range(0..Dir::ALL.len())];
                match self.grid.step(pos, dir) {
                    Some(next) if !self.pattern.contains(&next) => {
                        self.grid.carve_between(pos, dir);
                        broken += 1;
                    }
                    _ => {}
                }
            }
        }
        debug!(broken, chance, "walls broken");
    }

    /// Shortest path from `entry` to `exit`, or `None` if the exit cannot be reached.
    pub fn solve(&self, entry: Pos, exit: Pos) -> Result<Option<Path>, MazeError> {
        self.solve_with(entry, exit, |_| Ok(()))
    }

    /// Solves like [`Maze::solve`], drawing every dequeued cell before expanding it.
    pub fn solve_animated<F>(
        &self,
        entry: Pos,
        exit: Pos,
        delay: Duration,
        mut draw: F,
    ) -> Result<Option<Path>, MazeError>
    where
        F: FnMut(&Frame<'_>) -> io::Result<()>,
    {
        self.solve_with(entry, exit, |frame| {
            draw(frame)?;
            thread::sleep(delay);
            Ok(())
        })
    }

    fn solve_with<F>(
        &self,
        entry: Pos,
        exit: Pos,
        mut on_step: F,
    ) -> Result<Option<Path>, MazeError>
    where
        F: FnMut(&Frame<'_>) -> io::Result<()>,
    {
        self.grid.check(entry)?;
        self.grid.check(exit)?;

        let mut visited = HashSet::from([entry]);
        let mut queue = VecDeque::from([entry]);
        let mut parent: HashMap<Pos, (Pos, Dir)> = HashMap::new();

        while let Some(pos) = queue.pop_front() {
            let mut frame = Frame::new(&self.grid, entry, &self.pattern);
            frame.exit = Some(exit);
            frame.highlight = Some(pos);
            frame.visited = Some(&visited);
            on_step(&frame)?;

            if pos == exit {
                break;
            }
            for dir in Dir::ALL {
                if !self.grid.is_open(pos, dir) {
                    continue;
                }
                let Some(next) = self.grid.step(pos, dir) else {
                    continue;
                };
                if visited.insert(next) {
                    queue.push_back(next);
                    parent.insert(next, (pos, dir));
                }
            }
        }

        let path = reconstruct(&parent, entry, exit);
        match &path {
            Some(path) => debug!(len = path.len(), "solved"),
            None => debug!(%entry, %exit, "exit unreachable"),
        }
        Ok(path)
    }

    /// Writes the maze in the hex wall format. `None` writes an empty path line.
    pub fn write_hex(
        &self,
        file: impl AsRef<std::path::Path>,
        entry: Pos,
        exit: Pos,
        path: Option<&Path>,
    ) -> Result<(), MazeError> {
        hexfile::write(file, &self.grid, entry, exit, path)?;
        Ok(())
    }
}

fn reconstruct(parent: &HashMap<Pos, (Pos, Dir)>, entry: Pos, exit: Pos) -> Option<Path> {
    let mut dirs = Vec::new();
    let mut current = exit;
    while current != entry {
        let &(prev, dir) = parent.get(&current)?;
        dirs.push(dir);
        current = prev;
    }
    dirs.reverse();
    Some(Path::new(dirs))
}
