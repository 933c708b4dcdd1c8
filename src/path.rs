use std::fmt;
use std::str::FromStr;

use crate::grid::{Dir, Grid, Pos};

/// Moves from the entry to the exit, written as `N`/`E`/`S`/`W` tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(Vec<Dir>);

impl Path {
    pub fn new(dirs: Vec<Dir>) -> Self {
        Self(dirs)
    }

    pub fn dirs(&self) -> &[Dir] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every cell walked through on `grid`, entry and end included.
    ///
    /// Stops at the first move that would leave the grid, whichever edge.
    /// Walls are not checked.
    pub fn cells(&self, grid: &Grid, entry: Pos) -> Vec<Pos> {
        let mut pos = entry;
        let mut out = vec![pos];
        for &dir in &self.0 {
            match grid.step(pos, dir) {
                Some(next) => pos = next,
                None => break,
            }
            out.push(pos);
        }
        out
    }

    /// Where the path ends on `grid` when started at `entry`.
    pub fn end(&self, grid: &Grid, entry: Pos) -> Pos {
        self.cells(grid, entry).last().copied().unwrap_or(entry)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dir in &self.0 {
            write!(f, "{}", dir.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    /// The first character that is not a direction letter.
    type Err = char;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|ch| Dir::from_letter(ch).ok_or(ch))
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_letters() {
        let path = Path::new(vec![Dir::East, Dir::East, Dir::North, Dir::South]);
        assert_eq!(path.to_string(), "EENS");
        assert_eq!("EENS".parse::<Path>(), Ok(path));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!("NEX".parse::<Path>(), Err('X'));
        assert_eq!("".parse::<Path>(), Ok(Path::default()));
    }

    #[test]
    fn replays_cells() {
        let grid = Grid::new(3, 3).unwrap();
        let path: Path = "SSE".parse().unwrap();
        let cells = path.cells(&grid, Pos::new(1, 0));
        assert_eq!(
            cells,
            vec![Pos::new(1, 0), Pos::new(1, 1), Pos::new(1, 2), Pos::new(2, 2)]
        );
        assert_eq!(path.end(&grid, Pos::new(1, 0)), Pos::new(2, 2));
    }

    #[test]
    fn replay_stops_at_every_edge() {
        let grid = Grid::new(3, 3).unwrap();
        let corner = Pos::new(2, 2);
        let east: Path = "EN".parse().unwrap();
        assert_eq!(east.cells(&grid, corner), vec![corner]);
        let south: Path = "SW".parse().unwrap();
        assert_eq!(south.end(&grid, corner), corner);

        let origin = Pos::new(0, 0);
        let north: Path = "NE".parse().unwrap();
        assert_eq!(north.cells(&grid, origin), vec![origin]);
        let west: Path = "WS".parse().unwrap();
        assert_eq!(west.end(&grid, origin), origin);

        let partial: Path = "EEEE".parse().unwrap();
        assert_eq!(partial.end(&grid, origin), Pos::new(2, 0));
    }
}
