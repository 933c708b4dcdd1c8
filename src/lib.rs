//! Maze generation by recursive backtracking, with an optional "42" glyph
//! walled into the middle, breadth-first solving, ANSI terminal frames and a
//! hex wall-bitmask file format.

pub mod config;
pub mod error;
pub mod grid;
pub mod hexfile;
pub mod maze;
pub mod path;
pub mod pattern;
pub mod render;

pub use config::{Config, Tuning};
pub use error::{ConfigError, FormatError, MazeError};
pub use grid::{Cell, Dir, Grid, Pos};
pub use maze::Maze;
pub use path::Path;
pub use render::{Frame, Palette, Renderer, Role};
