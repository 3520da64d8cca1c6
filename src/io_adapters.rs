use crate::console::{Console, check_prompt};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::sync::Arc;

/// Memory-backed writer whose clones all append to the same buffer.
///
/// Handy for capturing what a console or a command printed.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Return the collected text and empty the buffer.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.buf.lock());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Console that replays a fixed list of lines and records its output.
///
/// Reaching the end of the list reads as end of input.
pub struct ScriptedConsole {
    lines: VecDeque<String>,
    output: SharedBuffer,
    echo: bool,
    prompt: String,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            output: SharedBuffer::new(),
            echo: false,
            prompt: "> ".to_string(),
        }
    }

    /// Like [`ScriptedConsole::new`], but everything printed is also written
    /// to standard output.
    pub fn echoing<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            echo: true,
            ..Self::new(lines)
        }
    }

    /// Handle on the output buffer; stays valid after the console is boxed.
    pub fn output(&self) -> SharedBuffer {
        self.output.clone()
    }

    /// Lines not read yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        if self.echo {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_console_replays_lines_then_eof() {
        let mut console = ScriptedConsole::new(["one", "two"]);
        assert_eq!(console.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(console.remaining(), 1);
        assert_eq!(console.read_line().unwrap().as_deref(), Some("two"));
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn test_scripted_console_captures_output() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let out = console.output();
        console.print("a").unwrap();
        console.println("b").unwrap();
        assert_eq!(out.contents(), "ab\n");
        assert_eq!(out.take(), "ab\n");
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_scripted_console_prompt() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert_eq!(console.prompt(), "> ");
        console.set_prompt("$ ").unwrap();
        assert_eq!(console.prompt(), "$ ");
        assert!(console.set_prompt("").is_err());
        assert_eq!(console.prompt(), "$ ");
    }

    #[test]
    fn test_shared_buffer_clones_share_storage() {
        let buf = SharedBuffer::new();
        let mut writer = buf.clone();
        write!(writer, "hello").unwrap();
        assert_eq!(buf.contents(), "hello");
    }
}
