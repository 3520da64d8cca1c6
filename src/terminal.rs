//! Terminal width lookup.
//!
//! The width is read from the terminal every time it is asked for, so a
//! resized window is picked up by the next rendered help text.

use crossterm::terminal;

/// Columns assumed when the output is not attached to a terminal.
pub const DEFAULT_WIDTH: usize = 80;

/// Current width of the controlling terminal, or [`DEFAULT_WIDTH`].
pub fn width() -> usize {
    match terminal::size() {
        Ok((cols, _)) if cols > 0 => usize::from(cols),
        _ => DEFAULT_WIDTH,
    }
}

/// Where the shell takes its rendering width from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    /// Ask the terminal on every render.
    #[default]
    Terminal,
    /// Always render at this many columns.
    Fixed(usize),
}

impl Width {
    /// Resolve to a column count right now.
    pub fn resolve(self) -> usize {
        match self {
            Width::Terminal => width(),
            Width::Fixed(cols) => cols,
        }
    }
}
