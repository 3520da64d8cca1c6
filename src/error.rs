//! Error types for the shell library.
//!
//! Failures raised by commands themselves travel as [`anyhow::Error`]; this
//! enum covers what the shell can get wrong on its own.

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Errors produced by the registry, the usage model and the console adapters.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A caller passed a value the API never accepts (empty name, empty flag, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing to or reading from the console failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The line editor failed for a reason other than end-of-input.
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
}

impl ShellError {
    pub(crate) fn invalid(param: &str, value: &str) -> Self {
        ShellError::InvalidArgument(format!("parameter '{param}' must not be [{value}]"))
    }
}

/// Convenience alias for results with [`ShellError`].
pub type Result<T> = std::result::Result<T, ShellError>;
