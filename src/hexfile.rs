//! The on-disk maze format: one hex digit of wall bits per cell, a blank
//! line, then the entry, the exit and the solution path.

use std::fmt::Write as _;
use std::fs;
use std::io;

use crate::error::FormatError;
use crate::grid::{Cell, Grid, Pos};
use crate::path::Path;

/// A decoded maze file.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeFile {
    pub grid: Grid,
    pub entry: Pos,
    pub exit: Pos,
    pub path: Path,
}

pub fn encode(grid: &Grid, entry: Pos, exit: Pos, path: Option<&Path>) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height() + 32);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let _ = write!(out, "{:X}", grid.cell(Pos::new(x, y)).mask());
        }
        out.push('\n');
    }
    let _ = write!(out, "\n{},{}\n", entry.x, entry.y);
    let _ = writeln!(out, "{},{}", exit.x, exit.y);
    if let Some(path) = path {
        let _ = write!(out, "{path}");
    }
    out.push('\n');
    out
}

/// Writes the whole file in one go, replacing anything already there.
pub fn write(
    file: impl AsRef<std::path::Path>,
    grid: &Grid,
    entry: Pos,
    exit: Pos,
    path: Option<&Path>,
) -> io::Result<()> {
    fs::write(file, encode(grid, entry, exit, path))
}

pub fn parse(text: &str) -> Result<MazeFile, FormatError> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut cells = Vec::new();
    let mut width = 0;
    let mut height = 0;

    loop {
        let Some((line_no, line)) = lines.next() else {
            return Err(if height == 0 {
                FormatError::Empty
            } else {
                FormatError::MissingSeparator
            });
        };
        if line.is_empty() {
            break;
        }
        let row = line
            .chars()
            .map(|ch| {
                ch.to_digit(16)
                    .map(|d| Cell::from_mask(d as u8))
                    .ok_or(FormatError::BadDigit { line: line_no, ch })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if height == 0 {
            width = row.len();
        } else if row.len() != width {
            return Err(FormatError::RaggedRow {
                line: line_no,
                expected: width,
                found: row.len(),
            });
        }
        cells.extend(row);
        height += 1;
    }
    if height == 0 {
        return Err(FormatError::Empty);
    }

    let (line_no, line) = lines.next().ok_or(FormatError::MissingLine("entry"))?;
    let entry = parse_coord(line_no, line)?;
    let (line_no, line) = lines.next().ok_or(FormatError::MissingLine("exit"))?;
    let exit = parse_coord(line_no, line)?;
    let path = match lines.next() {
        Some((line_no, line)) => line
            .parse::<Path>()
            .map_err(|ch| FormatError::BadDirection { line: line_no, ch })?,
        None => Path::default(),
    };

    Ok(MazeFile {
        grid: Grid::from_cells(width, height, cells),
        entry,
        exit,
        path,
    })
}

pub fn read(file: impl AsRef<std::path::Path>) -> io::Result<MazeFile> {
    let text = fs::read_to_string(file)?;
    parse(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn parse_coord(line: usize, text: &str) -> Result<Pos, FormatError> {
    let bad = || FormatError::BadCoordinate {
        line,
        text: text.to_string(),
    };
    let (x, y) = text.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(Pos::new(x, y))
}
