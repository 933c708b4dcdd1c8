use std::io;

use thiserror::Error;

use crate::grid::Pos;

/// Errors raised by the maze engine for malformed inputs.
#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("{pos} is outside the {width}x{height} maze")]
    OutOfBounds { pos: Pos, width: usize, height: usize },

    #[error("{0} is part of the pattern and cannot be used")]
    PatternCell(Pos),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while decoding a hex wall file.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("file contains no maze rows")]
    Empty,

    #[error("line {line}: '{ch}' is not a hex digit")]
    BadDigit { line: usize, ch: char },

    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow { line: usize, expected: usize, found: usize },

    #[error("missing blank line between rows and coordinates")]
    MissingSeparator,

    #[error("line {line}: expected 'x,y', found '{text}'")]
    BadCoordinate { line: usize, text: String },

    #[error("line {line}: '{ch}' is not a direction (N, E, S, W)")]
    BadDirection { line: usize, ch: char },

    #[error("missing {0} line")]
    MissingLine(&'static str),
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected KEY=VALUE, found '{text}'")]
    Syntax { line: usize, text: String },

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("missing required key '{0}'")]
    Missing(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    BadValue { key: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}
