//! Text frames of the maze, optionally colored with ANSI sequences.

use std::collections::HashSet;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::QueueableCommand;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use crate::grid::{Grid, Pos};
use crate::path::Path;

const CELL_W: usize = 3;

/// Logical things the palette assigns a color to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Entry,
    Exit,
    Highlight,
    Pattern,
    Path,
    Wall,
    Unvisited,
    Search,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Entry,
        Role::Exit,
        Role::Highlight,
        Role::Pattern,
        Role::Path,
        Role::Wall,
        Role::Unvisited,
        Role::Search,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Entry => "entry",
            Role::Exit => "exit",
            Role::Highlight => "highlight",
            Role::Pattern => "pattern",
            Role::Path => "path",
            Role::Wall => "wall",
            Role::Unvisited => "unvisited",
            Role::Search => "search",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.name() == lower)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// Names accepted by [`Palette::set_named`], in menu order.
pub const COLOR_NAMES: [&str; 9] = [
    "red", "green", "yellow", "blue", "magenta", "cyan", "white", "black", "gray",
];

pub fn color_by_name(name: &str) -> Option<Color> {
    match name.trim().to_ascii_lowercase().as_str() {
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        "gray" | "grey" => Some(Color::DarkGrey),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: [Color; Role::ALL.len()],
}

impl Default for Palette {
    fn default() -> Self {
        let mut palette = Self {
            colors: [Color::Reset; Role::ALL.len()],
        };
        palette.set(Role::Entry, Color::Green);
        palette.set(Role::Exit, Color::Red);
        palette.set(Role::Highlight, Color::Magenta);
        palette.set(Role::Pattern, Color::Yellow);
        palette.set(Role::Path, Color::Yellow);
        palette.set(Role::Wall, Color::Cyan);
        palette.set(Role::Unvisited, Color::DarkGrey);
        palette.set(Role::Search, Color::Cyan);
        palette
    }
}

impl Palette {
    /// `Role::ALL` lists the roles in declaration order.
    fn slot(role: Role) -> usize {
        role as usize
    }

    pub fn get(&self, role: Role) -> Color {
        self.colors[Self::slot(role)]
    }

    pub fn set(&mut self, role: Role, color: Color) {
        self.colors[Self::slot(role)] = color;
    }

    /// Sets `role` from a color name. Unknown names leave the color unchanged.
    pub fn set_named(&mut self, role: Role, name: &str) -> bool {
        match color_by_name(name) {
            Some(color) => {
                self.set(role, color);
                true
            }
            None => {
                warn!(%role, name, "unknown color, keeping previous");
                false
            }
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub grid: &'a Grid,
    pub entry: Pos,
    pub exit: Option<Pos>,
    pub pattern: &'a HashSet<Pos>,
    /// Cell being worked on by an animation step.
    pub highlight: Option<Pos>,
    /// Draw not-yet-visited cells as solid blocks.
    pub show_generation: bool,
    /// Cells discovered so far by the solver.
    pub visited: Option<&'a HashSet<Pos>>,
    pub path: Option<&'a Path>,
}

impl<'a> Frame<'a> {
    pub fn new(grid: &'a Grid, entry: Pos, pattern: &'a HashSet<Pos>) -> Self {
        Self {
            grid,
            entry,
            exit: None,
            pattern,
            highlight: None,
            show_generation: false,
            visited: None,
            path: None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Glyph {
    Entry,
    Exit,
    Highlight,
    Pattern,
    Unvisited,
    Search,
    Path,
    Blank,
}

impl Glyph {
    /// Text, role and whether the role colors the background.
    ///
    /// Background glyphs have no text when colored; plain frames fill them
    /// instead so they stay distinguishable.
    fn style(self, plain: bool) -> (&'static str, Option<Role>, bool) {
        match self {
            Glyph::Entry => ("S", Some(Role::Entry), false),
            Glyph::Exit => ("E", Some(Role::Exit), false),
            Glyph::Highlight => (if plain { "@" } else { "" }, Some(Role::Highlight), true),
            Glyph::Pattern => (if plain { "▓▓▓" } else { "" }, Some(Role::Pattern), true),
            Glyph::Unvisited => (if plain { "░░░" } else { "" }, Some(Role::Unvisited), true),
            Glyph::Search => ("·", Some(Role::Search), false),
            Glyph::Path => ("#", Some(Role::Path), false),
            Glyph::Blank => ("", None, false),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Renderer {
    pub palette: Palette,
    /// Skip ANSI sequences entirely.
    pub plain: bool,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            plain: false,
        }
    }

    pub fn plain() -> Self {
        Self {
            palette: Palette::default(),
            plain: true,
        }
    }

    pub fn render(&self, frame: &Frame<'_>) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render_to(&mut buf, frame);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn render_to(&self, out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
        let grid = frame.grid;
        let path_cells: HashSet<Pos> = frame
            .path
            .map(|p| p.cells(frame.grid, frame.entry).into_iter().collect())
            .unwrap_or_default();

        for _ in 0..grid.width() {
            self.draw(out, "+---", Some(Role::Wall), false)?;
        }
        self.draw(out, "+", Some(Role::Wall), false)?;
        out.queue(Print('\n'))?;

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let pos = Pos::new(x, y);
                if grid.cell(pos).west {
                    self.draw(out, "|", Some(Role::Wall), false)?;
                } else {
                    out.queue(Print(' '))?;
                }
                let (text, role, background) = glyph_for(frame, pos, &path_cells).style(self.plain);
                self.draw_cell(out, text, role, background)?;
            }
            self.draw(out, "|", Some(Role::Wall), false)?;
            out.queue(Print('\n'))?;

            for x in 0..grid.width() {
                if grid.cell(Pos::new(x, y)).south {
                    self.draw(out, "+---", Some(Role::Wall), false)?;
                } else {
                    self.draw(out, "+", Some(Role::Wall), false)?;
                    out.queue(Print("   "))?;
                }
            }
            self.draw(out, "+", Some(Role::Wall), false)?;
            out.queue(Print('\n'))?;
        }
        out.flush()
    }

    /// Centers `text` in a `CELL_W` column cell, padding inside the color.
    fn draw_cell(
        &self,
        out: &mut impl Write,
        text: &str,
        role: Option<Role>,
        background: bool,
    ) -> io::Result<()> {
        let pad = CELL_W.saturating_sub(UnicodeWidthStr::width(text));
        let left = pad / 2;
        let cell = format!("{:left$}{text}{:right$}", "", "", right = pad - left);
        self.draw(out, &cell, role, background)
    }

    fn draw(
        &self,
        out: &mut impl Write,
        text: &str,
        role: Option<Role>,
        background: bool,
    ) -> io::Result<()> {
        let color = match role {
            Some(role) if !self.plain => self.palette.get(role),
            _ => {
                out.queue(Print(text))?;
                return Ok(());
            }
        };
        if background {
            out.queue(SetBackgroundColor(color))?;
        } else {
            out.queue(SetForegroundColor(color))?;
        }
        out.queue(Print(text))?;
        out.queue(ResetColor)?;
        Ok(())
    }
}

fn glyph_for(frame: &Frame<'_>, pos: Pos, path_cells: &HashSet<Pos>) -> Glyph {
    if pos == frame.entry {
        return Glyph::Entry;
    }
    if frame.exit == Some(pos) {
        return Glyph::Exit;
    }
    if frame.highlight == Some(pos) {
        return Glyph::Highlight;
    }
    if frame.pattern.contains(&pos) {
        return Glyph::Pattern;
    }
    if frame.show_generation && !frame.grid.cell(pos).visited {
        return Glyph::Unvisited;
    }
    if frame.visited.is_some_and(|v| v.contains(&pos)) {
        return Glyph::Search;
    }
    if path_cells.contains(&pos) {
        return Glyph::Path;
    }
    Glyph::Blank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dir;

    fn open_row() -> Grid {
        let mut grid = Grid::new(3, 1).unwrap();
        grid.carve_between(Pos::new(0, 0), Dir::East);
        grid.carve_between(Pos::new(1, 0), Dir::East);
        grid
    }

    #[test]
    fn plain_frame_layout() {
        let grid = open_row();
        let pattern = HashSet::new();
        let mut frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        frame.exit = Some(Pos::new(2, 0));
        let text = Renderer::plain().render(&frame);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["+---+---+---+", "| S       E |", "+---+---+---+"]);
    }

    #[test]
    fn open_south_wall_leaves_gap() {
        let mut grid = Grid::new(1, 2).unwrap();
        grid.carve_between(Pos::new(0, 0), Dir::South);
        let pattern = HashSet::new();
        let frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        let text = Renderer::plain().render(&frame);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "+   +");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn solution_path_is_marked() {
        let grid = open_row();
        let pattern = HashSet::new();
        let path: Path = "EE".parse().unwrap();
        let mut frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        frame.exit = Some(Pos::new(2, 0));
        frame.path = Some(&path);
        let text = Renderer::plain().render(&frame);
        assert_eq!(text.lines().nth(1), Some("| S   #   E |"));
    }

    #[test]
    fn entry_outranks_everything() {
        let grid = Grid::new(2, 1).unwrap();
        let pattern: HashSet<Pos> = [Pos::new(0, 0), Pos::new(1, 0)].into_iter().collect();
        let mut frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        frame.highlight = Some(Pos::new(0, 0));
        frame.show_generation = true;
        let empty = HashSet::new();
        assert_eq!(glyph_for(&frame, Pos::new(0, 0), &empty), Glyph::Entry);
        assert_eq!(glyph_for(&frame, Pos::new(1, 0), &empty), Glyph::Pattern);
    }

    #[test]
    fn unvisited_outranks_search() {
        let grid = Grid::new(2, 1).unwrap();
        let pattern = HashSet::new();
        let visited: HashSet<Pos> = [Pos::new(1, 0)].into_iter().collect();
        let mut frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        frame.visited = Some(&visited);
        let empty = HashSet::new();
        assert_eq!(glyph_for(&frame, Pos::new(1, 0), &empty), Glyph::Search);
        frame.show_generation = true;
        assert_eq!(glyph_for(&frame, Pos::new(1, 0), &empty), Glyph::Unvisited);
    }

    #[test]
    fn unknown_color_keeps_previous() {
        let mut palette = Palette::default();
        assert!(!palette.set_named(Role::Wall, "chartreuse"));
        assert_eq!(palette.get(Role::Wall), Color::Cyan);
        assert!(palette.set_named(Role::Wall, "Blue"));
        assert_eq!(palette.get(Role::Wall), Color::Blue);
    }

    #[test]
    fn colored_frame_contains_escape_codes() {
        let grid = Grid::new(1, 1).unwrap();
        let pattern = HashSet::new();
        let frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        let text = Renderer::default().render(&frame);
        assert!(text.contains("\u{1b}["));
        assert!(text.contains(" S "));
    }

    #[test]
    fn plain_background_glyphs_fill_the_cell() {
        let grid = Grid::new(3, 1).unwrap();
        let pattern: HashSet<Pos> = [Pos::new(1, 0)].into_iter().collect();
        let mut frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        frame.highlight = Some(Pos::new(2, 0));
        let text = Renderer::plain().render(&frame);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "| S |▓▓▓| @ |");
        assert_eq!(UnicodeWidthStr::width(row), 3 * 4 + 1);

        frame.highlight = None;
        frame.show_generation = true;
        let text = Renderer::plain().render(&frame);
        assert_eq!(text.lines().nth(1), Some("| S |▓▓▓|░░░|"));
    }

    #[test]
    fn colored_background_spans_the_cell() {
        let grid = Grid::new(2, 1).unwrap();
        let pattern: HashSet<Pos> = [Pos::new(1, 0)].into_iter().collect();
        let frame = Frame::new(&grid, Pos::new(0, 0), &pattern);
        let text = Renderer::default().render(&frame);
        let mut expected = Vec::new();
        expected.queue(SetBackgroundColor(Color::Yellow)).unwrap();
        expected.queue(Print("   ")).unwrap();
        expected.queue(ResetColor).unwrap();
        assert!(text.contains(&*String::from_utf8(expected).unwrap()));
        assert!(!text.contains('▓'));
    }

    #[test]
    fn every_role_has_its_own_color() {
        let mut palette = Palette::default();
        let colors = [
            Color::Red,
            Color::Green,
            Color::Yellow,
            Color::Blue,
            Color::Magenta,
            Color::Cyan,
            Color::White,
            Color::Black,
        ];
        for (role, color) in Role::ALL.into_iter().zip(colors) {
            palette.set(role, color);
        }
        for (role, color) in Role::ALL.into_iter().zip(colors) {
            assert_eq!(palette.get(role), color, "{role}");
        }
    }

    #[test]
    fn roles_parse_by_name() {
        assert_eq!("Pattern".parse::<Role>(), Ok(Role::Pattern));
        assert!("floor".parse::<Role>().is_err());
    }
}
