use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

use amazeing::render::COLOR_NAMES;
use amazeing::{Config, Frame, Grid, Maze, Path, Renderer, Role, Tuning};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const HUD_ROWS: usize = 3;
const POLL_MS: u64 = 50;
const NO_PATTERN: &str = " (too small for the 42 pattern)";
const MENU: &str = "[r] regenerate  [p] show/hide path  [w] wall color  [c] pattern color  [q] quit";

/// Generate, animate, solve and save a maze.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file with WIDTH, HEIGHT, ENTRY, EXIT, OUTPUT_FILE and PERFECT
    config: PathBuf,

    /// Random seed, overrides SEED from the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the carving and solving animations
    #[arg(long)]
    no_animate: bool,

    /// Generate, solve and save without the interactive screen
    #[arg(long)]
    headless: bool,
}

struct Session {
    config: Config,
    tuning: Tuning,
    renderer: Renderer,
    maze: Maze,
    path: Option<Path>,
    show_path: bool,
    wall_color: usize,
    pattern_color: usize,
    generation: u64,
}

impl Session {
    fn seed(&self) -> Option<u64> {
        self.config.seed.map(|s| s.wrapping_add(self.generation))
    }

    fn save(&self) -> Result<()> {
        self.maze
            .write_hex(
                &self.config.output_file,
                self.config.entry,
                self.config.exit,
                self.path.as_ref(),
            )
            .with_context(|| format!("cannot write {}", self.config.output_file.display()))
    }

    fn regenerate(&mut self, screen: Option<&mut Stdout>) -> Result<()> {
        self.generation += 1;
        let (maze, path) = build(&self.config, &self.tuning, self.seed(), screen, &self.renderer)?;
        self.maze = maze;
        self.path = path;
        self.save()
    }

    fn cycle_color(&mut self, role: Role) {
        let slot = match role {
            Role::Pattern => &mut self.pattern_color,
            Role::Wall => &mut self.wall_color,
            _ => return,
        };
        *slot = (*slot + 1) % COLOR_NAMES.len();
        self.renderer.palette.set_named(role, COLOR_NAMES[*slot]);
    }

    fn status(&self) -> String {
        let mut status = match (&self.path, self.show_path) {
            (None, _) => "No solution found: the exit cannot be reached.".to_string(),
            (Some(path), true) => format!("Solution ({} moves): {}", path.len(), path),
            (Some(path), false) => format!("Solved in {} moves. Path hidden.", path.len()),
        };
        if self.maze.pattern().is_empty() {
            status.push_str(NO_PATTERN);
        }
        status
    }

    fn frame(&self) -> Frame<'_> {
        let mut frame = Frame::new(self.maze.grid(), self.config.entry, self.maze.pattern());
        frame.exit = Some(self.config.exit);
        if self.show_path {
            frame.path = self.path.as_ref();
        }
        frame
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stderr shares the terminal with the alternate screen, so the
    // interactive session drops log output and reports through the status line.
    let writer = if args.headless {
        BoxMakeWriter::new(io::stderr)
    } else {
        BoxMakeWriter::new(io::sink)
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(writer)
        .init();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("invalid configuration in {}", args.config.display()))?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let tuning = Tuning::from_env();

    if args.headless {
        return run_headless(config, tuning);
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, config, tuning, !args.no_animate);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    if let Ok(file) = &result {
        println!("Maze saved to {}", file.display());
    }
    result.map(|_| ())
}

fn run_headless(config: Config, tuning: Tuning) -> Result<()> {
    let renderer = Renderer::default();
    let (maze, path) = build(&config, &tuning, config.seed, None, &renderer)?;
    maze.write_hex(&config.output_file, config.entry, config.exit, path.as_ref())
        .with_context(|| format!("cannot write {}", config.output_file.display()))?;

    let mut frame = Frame::new(maze.grid(), config.entry, maze.pattern());
    frame.exit = Some(config.exit);
    frame.path = path.as_ref();
    let mut stdout = io::stdout();
    renderer.render_to(&mut stdout, &frame)?;
    match &path {
        Some(path) => writeln!(stdout, "Solution ({} moves): {}", path.len(), path)?,
        None => writeln!(stdout, "No solution found: the exit cannot be reached.")?,
    }
    writeln!(stdout, "Maze saved to {}", config.output_file.display())?;
    Ok(())
}

fn run(stdout: &mut Stdout, config: Config, tuning: Tuning, animate: bool) -> Result<PathBuf> {
    let renderer = Renderer::default();
    let wall_color = COLOR_NAMES.iter().position(|c| *c == "cyan").unwrap_or(0);
    let pattern_color = COLOR_NAMES.iter().position(|c| *c == "yellow").unwrap_or(0);

    stdout.execute(Clear(ClearType::All))?;
    let screen = animate.then_some(&mut *stdout);
    let (maze, path) = build(&config, &tuning, config.seed, screen, &renderer)?;
    let mut session = Session {
        config,
        tuning,
        renderer,
        maze,
        path,
        show_path: true,
        wall_color,
        pattern_color,
        generation: 0,
    };
    session.save()?;
    info!(file = %session.config.output_file.display(), "maze written");

    stdout.execute(Clear(ClearType::All))?;
    draw_screen(stdout, &session.renderer, &session.frame(), &session.status())?;

    loop {
        if !event::poll(Duration::from_millis(POLL_MS))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => {
                    session.save()?;
                    return Ok(session.config.output_file);
                }
                KeyCode::Char('r') => {
                    stdout.execute(Clear(ClearType::All))?;
                    let screen = animate.then_some(&mut *stdout);
                    session.regenerate(screen)?;
                }
                KeyCode::Char('p') => session.show_path = !session.show_path,
                KeyCode::Char('w') => session.cycle_color(Role::Wall),
                KeyCode::Char('c') => session.cycle_color(Role::Pattern),
                _ => continue,
            },
            Event::Resize(_, _) => {}
            _ => continue,
        }
        stdout.execute(Clear(ClearType::All))?;
        draw_screen(stdout, &session.renderer, &session.frame(), &session.status())?;
    }
}

/// Builds a fresh maze: pattern, carve, optional wall breaking, solve.
/// Animates both phases on `screen` when given.
fn build(
    config: &Config,
    tuning: &Tuning,
    seed: Option<u64>,
    screen: Option<&mut Stdout>,
    renderer: &Renderer,
) -> Result<(Maze, Option<Path>)> {
    let mut maze = Maze::new(config.width, config.height, seed)?;
    maze.stamp_pattern();

    let path = match screen {
        Some(out) => {
            maze.carve_animated(config.entry, tuning.delay, |frame| {
                draw_screen(out, renderer, frame, "Carving the maze...")
            })?;
            if !config.perfect {
                maze.break_walls(tuning.break_chance);
            }
            maze.solve_animated(config.entry, config.exit, tuning.delay, |frame| {
                draw_screen(out, renderer, frame, "Searching for the exit...")
            })?
        }
        None => {
            maze.carve(config.entry)?;
            if !config.perfect {
                maze.break_walls(tuning.break_chance);
            }
            maze.solve(config.entry, config.exit)?
        }
    };
    if path.is_none() {
        warn!(entry = %config.entry, exit = %config.exit, "no path between entry and exit");
    }
    Ok((maze, path))
}

/// Columns and rows the screen needs for `grid`, saturating at `u16::MAX`.
fn needed_size(grid: &Grid) -> (u16, u16) {
    let cols = grid
        .width()
        .saturating_mul(4)
        .saturating_add(1)
        .max(MENU.len());
    let rows = grid.height().saturating_mul(2).saturating_add(1 + HUD_ROWS);
    (
        u16::try_from(cols).unwrap_or(u16::MAX),
        u16::try_from(rows).unwrap_or(u16::MAX),
    )
}

fn draw_screen(
    stdout: &mut Stdout,
    renderer: &Renderer,
    frame: &Frame<'_>,
    status: &str,
) -> io::Result<()> {
    let (needed_w, needed_h) = needed_size(frame.grid);
    stdout.queue(MoveTo(0, 0))?;
    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        return Ok(());
    }

    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(SetForegroundColor(Color::White))?;
    stdout.queue(Print(status))?;
    stdout.queue(ResetColor)?;

    let text = renderer.render(frame);
    let mut row = 1u16;
    for line in text.lines() {
        stdout.queue(MoveTo(0, row))?;
        stdout.queue(Print(line))?;
        row += 1;
    }
    stdout.queue(MoveTo(0, row + 1))?;
    stdout.queue(Print(MENU))?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amazeing::Pos;

    fn session(width: usize, height: usize) -> Session {
        let config = Config {
            width,
            height,
            entry: Pos::new(0, 0),
            exit: Pos::new(width - 1, height - 1),
            output_file: PathBuf::from("unused.txt"),
            perfect: true,
            seed: Some(1),
        };
        let tuning = Tuning {
            delay: Duration::ZERO,
            break_chance: 0.0,
        };
        let renderer = Renderer::plain();
        let (maze, path) = build(&config, &tuning, config.seed, None, &renderer).unwrap();
        Session {
            config,
            tuning,
            renderer,
            maze,
            path,
            show_path: true,
            wall_color: 5,
            pattern_color: 2,
            generation: 0,
        }
    }

    #[test]
    fn cycling_only_touches_wall_and_pattern() {
        let mut session = session(3, 3);
        let before = session.renderer.palette.clone();

        session.cycle_color(Role::Entry);
        session.cycle_color(Role::Path);
        assert_eq!(session.renderer.palette, before);
        assert_eq!((session.wall_color, session.pattern_color), (5, 2));

        session.cycle_color(Role::Wall);
        assert_eq!(session.wall_color, 6);
        assert_eq!(session.renderer.palette.get(Role::Wall), Color::White);
        assert_eq!(session.renderer.palette.get(Role::Entry), before.get(Role::Entry));

        session.cycle_color(Role::Pattern);
        assert_eq!(session.pattern_color, 3);
        assert_eq!(session.renderer.palette.get(Role::Pattern), Color::Blue);
    }

    #[test]
    fn status_reports_missing_pattern() {
        let small = session(3, 3);
        assert!(small.maze.pattern().is_empty());
        assert!(small.status().ends_with(NO_PATTERN));
        assert!(small.status().starts_with("Solution ("));

        let large = session(9, 7);
        assert!(!large.maze.pattern().is_empty());
        assert!(!large.status().contains(NO_PATTERN));
    }

    #[test]
    fn needed_size_saturates() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(needed_size(&grid), (MENU.len() as u16, 2 * 2 + 1 + HUD_ROWS as u16));

        let wide = Grid::new(20_000, 1).unwrap();
        assert_eq!(needed_size(&wide).0, u16::MAX);
        let tall = Grid::new(1, 40_000).unwrap();
        assert_eq!(needed_size(&tall).1, u16::MAX);
    }
}
