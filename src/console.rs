//! Line input and text output used by the shell.
//!
//! The shell only needs to read a line, print text and manage a prompt. Line
//! editing, history and completion key handling are left to `rustyline`.

use crate::completer::{CommandCompleter, Completion};
use crate::error::{Result, ShellError};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::io::Write;

/// Input/output collaborator of a [`Shell`](crate::Shell).
pub trait Console {
    /// Block until a full line is available. `Ok(None)` means end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    fn print(&mut self, text: &str) -> Result<()>;

    fn println(&mut self, text: &str) -> Result<()> {
        self.print(text)?;
        self.print("\n")
    }

    fn prompt(&self) -> &str;

    /// Replace the prompt. Fails with [`ShellError::InvalidArgument`] when empty.
    fn set_prompt(&mut self, prompt: &str) -> Result<()>;
}

pub(crate) fn check_prompt(prompt: &str) -> Result<()> {
    if prompt.is_empty() {
        return Err(ShellError::invalid("prompt", prompt));
    }
    Ok(())
}

/// Interactive console on the process terminal, with history and tab
/// completion of command names.
pub struct TerminalConsole {
    editor: Editor<ShellHelper, DefaultHistory>,
    prompt: String,
}

impl TerminalConsole {
    pub fn new(completer: CommandCompleter, prompt: &str) -> Result<Self> {
        check_prompt(prompt)?;
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ShellHelper { completer }));
        Ok(Self {
            editor,
            prompt: prompt.to_string(),
        })
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the current line, Ctrl-D ends the session.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn print(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn set_prompt(&mut self, prompt: &str) -> Result<()> {
        check_prompt(prompt)?;
        self.prompt = prompt.to_string();
        Ok(())
    }
}

/// Hooks the command completer into the line editor.
struct ShellHelper {
    completer: CommandCompleter,
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        match self.completer.complete(Some(&line[..pos])) {
            Completion::Candidates(candidates) => Ok((0, candidates)),
            Completion::Unavailable => Ok((0, Vec::new())),
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
