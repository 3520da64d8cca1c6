use crate::command::Command;
use crate::completer::CommandCompleter;
use crate::config::ShellConfig;
use crate::console::{Console, TerminalConsole};
use crate::error::Result;
use crate::registry::Registry;
use crate::schema::FlagError;
use crate::terminal::Width;
use regex::Regex;
use anyhow::anyhow;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use tracing::{debug, error, warn};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown cause"
    }
}

/// What happened to a line passed to [`Shell::exec`].
#[derive(Debug)]
pub enum Outcome {
    /// The line was blank or started with whitespace; nothing ran.
    Empty,
    /// No command is registered under this name.
    NotFound(String),
    /// The flags did not match the command's usage, which was printed instead.
    Usage(FlagError),
    /// The command ran and succeeded.
    Ran,
    /// The command ran and returned this error.
    Failed(anyhow::Error),
}

impl Outcome {
    /// Whether a command was invoked, successfully or not.
    pub fn invoked(&self) -> bool {
        matches!(self, Outcome::Ran | Outcome::Failed(_))
    }
}

/// Cloneable handle that stops a shell's read-eval loop from anywhere,
/// including from inside a running command or another thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub(crate) fn from_flag(running: Arc<AtomicBool>) -> Self {
        Self { running }
    }

    /// Ask the loop to exit. Takes effect once the current read returns.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn started(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// An interactive command shell.
///
/// The shell owns a [`Registry`] of commands and a [`Console`]. Each line read
/// from the console is split on whitespace; the first word selects the
/// command, the rest is parsed against the command's [`Usage`](crate::Usage)
/// and handed to [`Command::run`] as a [`Line`](crate::Line).
///
/// The registry is shared: [`Shell::registry`] hands out an `Arc` that other
/// threads may use to add or remove commands while the loop runs.
///
/// Example
/// ```
/// use ash_shell::{Command, Line, Outcome, ScriptedConsole, Shell, Usage};
/// use std::sync::Arc;
///
/// struct Greet(Usage);
///
/// impl Command for Greet {
///     fn name(&self) -> &str { "greet" }
///     fn usage(&self) -> &Usage { &self.0 }
///     fn run(&self, line: &Line) -> anyhow::Result<()> {
///         assert_eq!(line.args(), ["world"]);
///         Ok(())
///     }
/// }
///
/// let console = ScriptedConsole::new(["greet world"]);
/// let mut sh = Shell::new(Box::new(console));
/// sh.register(Arc::new(Greet(Usage::new("greet <name>")))).unwrap();
/// assert!(matches!(sh.exec("greet world"), Outcome::Ran));
/// assert!(matches!(sh.exec("nope"), Outcome::NotFound(_)));
/// ```
pub struct Shell {
    registry: Arc<Registry>,
    console: Box<dyn Console>,
    running: Arc<AtomicBool>,
    width: Width,
}

impl Shell {
    /// Create a shell with an empty registry.
    pub fn new(console: Box<dyn Console>) -> Self {
        Self::with_registry(Arc::new(Registry::new()), console)
    }

    /// Create a shell dispatching to an existing registry.
    pub fn with_registry(registry: Arc<Registry>, console: Box<dyn Console>) -> Self {
        Self {
            registry,
            console,
            running: Arc::new(AtomicBool::new(false)),
            width: Width::Terminal,
        }
    }

    /// Interactive shell on the process terminal, configured by `config`.
    pub fn terminal(config: &ShellConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let completer = CommandCompleter::new(Arc::clone(&registry));
        let console = TerminalConsole::new(completer, &config.prompt)?;
        let mut shell = Self::with_registry(registry, Box::new(console));
        shell.set_width(config.width);
        Ok(shell)
    }

    /// Width used for usage text printed on flag errors.
    pub fn set_width(&mut self, width: Width) {
        self.width = width;
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    pub fn console_mut(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    /// Completer over this shell's command names.
    pub fn completer(&self) -> CommandCompleter {
        CommandCompleter::new(self.registry())
    }

    /// See [`Registry::register`].
    pub fn register(&self, command: Arc<dyn Command>) -> Result<()> {
        self.registry.register(command)
    }

    /// See [`Registry::register_as`].
    pub fn register_as(&self, name: &str, command: Arc<dyn Command>) -> Result<()> {
        self.registry.register_as(name, command)
    }

    /// See [`Registry::unregister`].
    pub fn unregister(&self, name: &str) -> Result<()> {
        self.registry.unregister(name)
    }

    /// Snapshot of the registered commands, sorted by name.
    pub fn commands(&self) -> BTreeMap<String, Arc<dyn Command>> {
        self.registry.commands()
    }

    /// Resolve and run one input line.
    ///
    /// Nothing a line can contain is fatal: unknown commands, bad flags and
    /// failing commands are reported on the console and described by the
    /// returned [`Outcome`]. A command that panics counts as failed.
    pub fn exec(&mut self, raw: &str) -> Outcome {
        let mut tokens = WHITESPACE.split(raw);
        let name = match tokens.next() {
            Some(name) if !name.is_empty() => name,
            _ => return Outcome::Empty,
        };
        let rest: Vec<&str> = tokens.filter(|t| !t.is_empty()).collect();

        let Some(command) = self.registry.get(name) else {
            self.report(&format!("{name}: command not found"));
            return Outcome::NotFound(name.to_string());
        };

        let schema = self.registry.schema(name, &command);
        let matches = match schema.parse(&rest) {
            Ok(matches) => matches,
            Err(err) => {
                debug!(command = name, error = %err, "rejected flags");
                let usage = command.usage().render(self.width.resolve());
                self.report(&usage);
                return Outcome::Usage(err);
            }
        };

        let line = matches.into_line(name);
        debug!(command = name, args = line.args().len(), "dispatching");
        let result = panic::catch_unwind(AssertUnwindSafe(|| command.run(&line)))
            .unwrap_or_else(|payload| Err(anyhow!("panicked: {}", panic_message(&*payload))));
        match result {
            Ok(()) => Outcome::Ran,
            Err(err) => {
                warn!(command = name, error = %err, "command failed");
                self.report(&format!("{name}: {err:#}"));
                Outcome::Failed(err)
            }
        }
    }

    /// Run the read-eval loop until [`Shell::stop`] or end of input.
    ///
    /// Only one loop may run per shell at a time. A stop request is noticed
    /// between lines; a read already blocked keeps waiting for its line.
    /// Returns an error only if the console itself fails.
    pub fn start(&mut self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let result = self.run_loop();
        self.running.store(false, Ordering::SeqCst);
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.running.load(Ordering::SeqCst) {
            let line = match self.console.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "console read failed");
                    return Err(err);
                }
            };
            self.exec(&line);
        }
        Ok(())
    }

    /// Ask the read-eval loop to exit after the current line.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the read-eval loop is running.
    pub fn started(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::from_flag(Arc::clone(&self.running))
    }

    fn report(&mut self, text: &str) {
        if let Err(err) = self.console.println(text) {
            error!(error = %err, "console write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::{ScriptedConsole, SharedBuffer};
    use crate::line::Line;
    use crate::usage::Usage;
    use parking_lot::Mutex;

    /// Records every line it is run with.
    struct Recorder {
        name: &'static str,
        usage: Usage,
        calls: Mutex<Vec<Line>>,
        fail: bool,
    }

    impl Recorder {
        fn put() -> Arc<Self> {
            let mut usage = Usage::new("put [options] <target>");
            usage
                .option("f", Some("file"), true, Some("file to upload"), Some("path"))
                .unwrap()
                .option("v", Some("verbose"), false, Some("print progress"), None)
                .unwrap();
            Arc::new(Self {
                name: "put",
                usage,
                calls: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn plain(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                usage: Usage::new(name),
                calls: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn calls(&self) -> Vec<Line> {
            self.calls.lock().clone()
        }
    }

    impl Command for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn usage(&self) -> &Usage {
            &self.usage
        }

        fn run(&self, line: &Line) -> anyhow::Result<()> {
            self.calls.lock().push(line.clone());
            if self.fail {
                return Err(anyhow::anyhow!("disk full").context("write failed"));
            }
            Ok(())
        }
    }

    fn shell(lines: &[&str]) -> (Shell, SharedBuffer) {
        let console = ScriptedConsole::new(lines.iter().copied());
        let out = console.output();
        let mut sh = Shell::new(Box::new(console));
        sh.set_width(Width::Fixed(80));
        (sh, out)
    }

    #[test]
    fn test_blank_lines_do_nothing() {
        let (mut sh, out) = shell(&[]);
        let put = Recorder::put();
        sh.register(put.clone()).unwrap();
        assert!(matches!(sh.exec(""), Outcome::Empty));
        assert!(matches!(sh.exec("   "), Outcome::Empty));
        assert!(matches!(sh.exec(" put -f a"), Outcome::Empty));
        assert_eq!(out.contents(), "");
        assert!(put.calls().is_empty());
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let (mut sh, out) = shell(&[]);
        assert!(matches!(sh.exec("nope"), Outcome::NotFound(name) if name == "nope"));
        assert_eq!(out.contents(), "nope: command not found\n");
        assert!(sh.commands().is_empty());
    }

    #[test]
    fn test_dispatch_builds_line() {
        let (mut sh, out) = shell(&[]);
        let put = Recorder::put();
        sh.register(put.clone()).unwrap();

        assert!(matches!(sh.exec("put -f a.txt extra"), Outcome::Ran));
        let calls = put.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command(), "put");
        assert_eq!(calls[0].value("f"), Some("a.txt"));
        assert_eq!(calls[0].value("file"), Some("a.txt"));
        assert_eq!(calls[0].options().len(), 2);
        assert_eq!(calls[0].args(), ["extra"]);
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_extra_whitespace_between_tokens_is_ignored() {
        let (mut sh, _out) = shell(&[]);
        let put = Recorder::put();
        sh.register(put.clone()).unwrap();
        assert!(matches!(sh.exec("put\t-f  a.txt   b  "), Outcome::Ran));
        assert_eq!(put.calls()[0].args(), ["b"]);
    }

    #[test]
    fn test_bad_flags_print_usage_and_skip_run() {
        let (mut sh, out) = shell(&[]);
        let put = Recorder::put();
        sh.register(put.clone()).unwrap();

        let outcome = sh.exec("put extra");
        assert!(matches!(
            outcome,
            Outcome::Usage(FlagError::MissingRequired(_))
        ));
        assert_eq!(out.take(), format!("{}\n", put.usage().render(80)));

        assert!(matches!(
            sh.exec("put -f a -x"),
            Outcome::Usage(FlagError::UnknownFlag(_))
        ));
        assert!(matches!(
            sh.exec("put -f"),
            Outcome::Usage(FlagError::MissingValue(_))
        ));
        assert!(put.calls().is_empty());
    }

    #[test]
    fn test_failing_command_is_reported_not_propagated() {
        let (mut sh, out) = shell(&[]);
        sh.register(Recorder::plain("boom", true)).unwrap();
        let outcome = sh.exec("boom");
        assert!(outcome.invoked());
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(out.contents(), "boom: write failed: disk full\n");
    }

    struct Panicky(Usage);

    impl Command for Panicky {
        fn name(&self) -> &str {
            "boom"
        }

        fn usage(&self) -> &Usage {
            &self.0
        }

        fn run(&self, line: &Line) -> anyhow::Result<()> {
            let _ = &line.args()[5];
            Ok(())
        }
    }

    #[test]
    fn test_panicking_command_does_not_end_loop() {
        let (mut sh, out) = shell(&["boom", "x"]);
        sh.register(Arc::new(Panicky(Usage::new("boom")))).unwrap();
        let x = Recorder::plain("x", false);
        sh.register(x.clone()).unwrap();

        sh.start().unwrap();
        assert!(!sh.started());
        assert_eq!(x.calls().len(), 1);
        assert!(out.contents().starts_with("boom: panicked: index out of bounds"));
    }

    #[test]
    fn test_panic_is_reported_as_failure() {
        let (mut sh, _out) = shell(&[]);
        sh.register(Arc::new(Panicky(Usage::new("boom")))).unwrap();
        let outcome = sh.exec("boom");
        assert!(outcome.invoked());
        assert!(matches!(outcome, Outcome::Failed(err) if err.to_string().starts_with("panicked: ")));
    }

    #[test]
    fn test_reregistered_name_dispatches_to_latest() {
        let (mut sh, _out) = shell(&[]);
        let a = Recorder::plain("x", false);
        let b = Recorder::plain("x", false);
        sh.register_as("x", a.clone()).unwrap();
        sh.exec("x");
        sh.register_as("x", b.clone()).unwrap();
        sh.exec("x 1");
        assert_eq!(a.calls().len(), 1);
        assert_eq!(b.calls().len(), 1);
        assert_eq!(b.calls()[0].args(), ["1"]);
    }

    #[test]
    fn test_reregistered_name_uses_new_usage() {
        let (mut sh, _out) = shell(&[]);
        sh.register_as("put", Recorder::plain("put", false)).unwrap();
        assert!(matches!(sh.exec("put"), Outcome::Ran));

        let put = Recorder::put();
        sh.register(put.clone()).unwrap();
        assert!(matches!(sh.exec("put"), Outcome::Usage(_)));
        assert!(put.calls().is_empty());
    }

    #[test]
    fn test_unregistered_command_is_not_found() {
        let (mut sh, _out) = shell(&[]);
        sh.register(Recorder::plain("x", false)).unwrap();
        sh.unregister("x").unwrap();
        assert!(matches!(sh.exec("x"), Outcome::NotFound(_)));
    }

    #[test]
    fn test_start_runs_until_end_of_input() {
        let (mut sh, out) = shell(&["x", "nope", "", "x a"]);
        let x = Recorder::plain("x", false);
        sh.register(x.clone()).unwrap();

        assert!(!sh.started());
        sh.start().unwrap();
        assert!(!sh.started());
        assert_eq!(x.calls().len(), 2);
        assert_eq!(out.contents(), "nope: command not found\n");
    }

    #[test]
    fn test_stop_before_start_is_reset_by_start() {
        let (mut sh, _out) = shell(&["x"]);
        let x = Recorder::plain("x", false);
        sh.register(x.clone()).unwrap();
        sh.stop();
        sh.start().unwrap();
        assert_eq!(x.calls().len(), 1);
    }

    #[test]
    fn test_stop_handle_shares_running_flag() {
        let (sh, _out) = shell(&[]);
        let handle = sh.stop_handle();
        sh.running.store(true, Ordering::SeqCst);
        assert!(handle.started());
        handle.stop();
        assert!(!sh.started());
    }
}
