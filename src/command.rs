use crate::line::Line;
use crate::usage::Usage;
use anyhow::Result;

/// A command the shell can dispatch to.
///
/// Implementations are supplied by the embedding application and registered on
/// a [`Shell`](crate::Shell) under their [`name`](Command::name). The shell
/// parses each input line against [`usage`](Command::usage) before calling
/// [`run`](Command::run), so `run` only ever sees lines whose flags are valid.
///
/// Example
/// ```
/// use ash_shell::{Command, Line, Usage};
///
/// struct Hello {
///     usage: Usage,
/// }
///
/// impl Command for Hello {
///     fn name(&self) -> &str {
///         "hello"
///     }
///
///     fn usage(&self) -> &Usage {
///         &self.usage
///     }
///
///     fn run(&self, line: &Line) -> anyhow::Result<()> {
///         println!("hello {}", line.args().join(" "));
///         Ok(())
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Name the command is registered under by default.
    fn name(&self) -> &str;

    /// Flags and syntax of the command; also used as its help text.
    fn usage(&self) -> &Usage;

    /// Execute the command.
    ///
    /// Errors are reported by the shell and never stop the read-eval loop.
    fn run(&self, line: &Line) -> Result<()>;
}
