//! A small, embeddable interactive command shell.
//!
//! An application implements [`Command`] for each of its commands, registers
//! them on a [`Shell`] and calls [`Shell::start`]. The shell reads lines from
//! its [`Console`], picks the command named by the first word, checks the rest
//! of the line against the command's [`Usage`] and runs it with the parsed
//! [`Line`]. Unknown commands, bad flags and failing commands are reported on
//! the console; none of them stops the loop.
//!
//! The public modules [`builtin`] and [`colors`] hold a handful of ready-made
//! commands and ANSI color helpers used by the `ash` binary; [`terminal`]
//! exposes the live terminal width.

pub mod builtin;
pub mod colors;
mod command;
mod completer;
mod config;
mod console;
mod error;
mod io_adapters;
mod line;
mod registry;
mod schema;
mod shell;
pub mod terminal;
mod usage;

pub use command::Command;
pub use completer::{CommandCompleter, Completion};
pub use config::{DEFAULT_PROMPT, PROMPT_VAR, ShellConfig, WIDTH_VAR};
pub use console::{Console, TerminalConsole};
pub use error::{Result, ShellError};
pub use io_adapters::{ScriptedConsole, SharedBuffer};
pub use line::Line;
pub use registry::Registry;
pub use schema::{FlagDef, FlagError, FlagSchema, Matches};
pub use shell::{Outcome, Shell, StopHandle};
pub use terminal::{DEFAULT_WIDTH, Width};
pub use usage::{Usage, UsageOption};
