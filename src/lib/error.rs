//! Errors raised while parsing fonts, stroke programs, SVG paths and programs.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A font table line could not be split into a character and a program, or its program is malformed.
    #[error("font table line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A stroke program token that is not one of `m h v l a u d`.
    #[error("unknown stroke command '{0}'")]
    UnknownCommand(String),

    /// A stroke command was missing a parameter, or it was not a number.
    #[error("stroke command '{command}' expects a number, got '{found}'")]
    InvalidNumber { command: char, found: String },

    /// An arc sweeping more than a full turn, or with angles that aren't finite.
    #[error("arc from {start} to {end} degrees sweeps more than a full turn")]
    ArcSweep { start: f64, end: f64 },

    /// No `<path>` with the requested id in an SVG document.
    #[error("no path with id '{0}'")]
    PathNotFound(String),

    /// SVG path commands we can't turn into straight edges (curves, arcs).
    #[error("unsupported SVG path command '{0}'")]
    UnsupportedPathCommand(String),

    #[error("invalid SVG document: {0}")]
    Svg(String),

    /// Two consecutive polygon points coincide, so the edge has no direction.
    #[error("zero-length polygon edge at point {0}")]
    DegenerateEdge(usize),

    /// A G-code word whose value isn't a number.
    #[error("line {line}: cannot read '{word}'")]
    Program { line: usize, word: String },
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Svg(e.to_string())
    }
}
