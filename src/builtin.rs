//! Ready-made commands, used by the `ash` binary and handy as examples of the
//! [`Command`] contract.
//!
//! Every command writes to an [`Output`], so tests can capture what it prints.

use crate::command::Command;
use crate::error::Result as ShellResult;
use crate::line::Line;
use crate::registry::Registry;
use crate::shell::StopHandle;
use crate::terminal::Width;
use crate::usage::Usage;
use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

/// Shared destination for command output.
pub struct Output(Mutex<Box<dyn Write + Send>>);

impl Output {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Mutex::new(Box::new(writer)))
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    fn write_all(&self, text: &str) -> Result<()> {
        let mut out = self.0.lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Register the standard set of commands on `registry`.
///
/// `exit` stops the loop behind `stop`; `help` renders usage at `width`.
pub fn install(
    registry: &Arc<Registry>,
    stop: StopHandle,
    width: Width,
    make_output: impl Fn() -> Output,
) -> ShellResult<()> {
    registry.register(Arc::new(Echo::new(make_output())?))?;
    registry.register(Arc::new(Pwd::new(make_output())))?;
    registry.register(Arc::new(Cat::new(make_output())))?;
    registry.register(Arc::new(Wc::new(make_output())?))?;
    registry.register(Arc::new(Grep::new(make_output())?))?;
    registry.register(Arc::new(Help::new(
        Arc::clone(registry),
        width,
        make_output(),
    )))?;
    registry.register(Arc::new(Exit::new(stop)))?;
    Ok(())
}

/// `echo [-n] [text...]`: write the arguments separated by spaces.
pub struct Echo {
    usage: Usage,
    out: Output,
}

impl Echo {
    pub fn new(out: Output) -> ShellResult<Self> {
        let mut usage = Usage::new("echo [-n] [text...]");
        usage.option(
            "n",
            Some("no-newline"),
            false,
            Some("do not output the trailing newline"),
            None,
        )?;
        Ok(Self { usage, out })
    }
}

impl Command for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, line: &Line) -> Result<()> {
        let mut text = line.args().join(" ");
        if !line.has_option("n") {
            text.push('\n');
        }
        self.out.write_all(&text)
    }
}

/// `pwd`: print the current working directory.
pub struct Pwd {
    usage: Usage,
    out: Output,
}

impl Pwd {
    pub fn new(out: Output) -> Self {
        Self {
            usage: Usage::new("pwd"),
            out,
        }
    }
}

impl Command for Pwd {
    fn name(&self) -> &str {
        "pwd"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, _line: &Line) -> Result<()> {
        let cwd = std::env::current_dir().context("can't read current directory")?;
        self.out.write_all(&format!("{}\n", cwd.display()))
    }
}

/// `cat <file...>`: print files one after another.
pub struct Cat {
    usage: Usage,
    out: Output,
}

impl Cat {
    pub fn new(out: Output) -> Self {
        Self {
            usage: Usage::new("cat <file...>"),
            out,
        }
    }
}

impl Command for Cat {
    fn name(&self) -> &str {
        "cat"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, line: &Line) -> Result<()> {
        if line.args().is_empty() {
            bail!("missing file operand");
        }
        for file in line.args() {
            let content = fs::read_to_string(file).with_context(|| file.clone())?;
            self.out.write_all(&content)?;
        }
        Ok(())
    }
}

/// `wc [-l] [-w] [-c] <file...>`: count lines, words and bytes.
pub struct Wc {
    usage: Usage,
    out: Output,
}

impl Wc {
    pub fn new(out: Output) -> ShellResult<Self> {
        let mut usage = Usage::new("wc [-l] [-w] [-c] <file...>");
        usage
            .option("c", Some("bytes"), false, Some("print the byte counts"), None)?
            .option("l", Some("lines"), false, Some("print the newline counts"), None)?
            .option("w", Some("words"), false, Some("print the word counts"), None)?;
        Ok(Self { usage, out })
    }
}

impl Command for Wc {
    fn name(&self) -> &str {
        "wc"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, line: &Line) -> Result<()> {
        if line.args().is_empty() {
            bail!("missing file operand");
        }
        let lines = line.has_option("l");
        let words = line.has_option("w");
        let bytes = line.has_option("c");
        let all = !(lines || words || bytes);

        for file in line.args() {
            let content = fs::read_to_string(file).with_context(|| file.clone())?;
            let mut columns = Vec::new();
            if all || lines {
                columns.push(content.lines().count().to_string());
            }
            if all || words {
                columns.push(content.split_whitespace().count().to_string());
            }
            if all || bytes {
                columns.push(content.len().to_string());
            }
            columns.push(file.clone());
            self.out.write_all(&format!("{}\n", columns.join(" ")))?;
        }
        Ok(())
    }
}

/// `grep -e <pattern> [-i] [-w] [-A <num>] <file...>`: print matching lines.
pub struct Grep {
    usage: Usage,
    out: Output,
}

impl Grep {
    pub fn new(out: Output) -> ShellResult<Self> {
        let mut usage = Usage::new("grep -e <pattern> [-i] [-w] [-A <num>] <file...>");
        usage
            .option(
                "A",
                Some("after-context"),
                false,
                Some("print NUM lines of trailing context after matching lines"),
                Some("num"),
            )?
            .option(
                "e",
                Some("regexp"),
                true,
                Some("the pattern to search for (a regular expression)"),
                Some("pattern"),
            )?
            .option("i", Some("ignore-case"), false, Some("ignore case distinctions"), None)?
            .option(
                "w",
                Some("word-regexp"),
                false,
                Some("match only whole words"),
                None,
            )?;
        Ok(Self { usage, out })
    }

    fn search(
        &self,
        reader: impl Read,
        prefix: &str,
        re: &Regex,
        after_context: usize,
    ) -> Result<()> {
        let lines: Vec<String> = BufReader::new(reader).lines().collect::<Result<_, _>>()?;

        let mut to_print = vec![false; lines.len()];
        for (i, _) in lines.iter().enumerate().filter(|(_, l)| re.is_match(l)) {
            let end = (i + after_context + 1).min(lines.len());
            to_print[i..end].iter_mut().for_each(|p| *p = true);
        }

        let mut text = String::new();
        let mut last_printed: Option<usize> = None;
        for (i, line) in lines.iter().enumerate().filter(|(i, _)| to_print[*i]) {
            if after_context > 0 && last_printed.is_some_and(|last| i > last + 1) {
                text.push_str("--\n");
            }
            text.push_str(prefix);
            text.push_str(line);
            text.push('\n');
            last_printed = Some(i);
        }
        self.out.write_all(&text)
    }
}

impl Command for Grep {
    fn name(&self) -> &str {
        "grep"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, line: &Line) -> Result<()> {
        let pattern = line.value("e").context("missing pattern")?;
        let pattern = if line.has_option("w") {
            format!(r"\b({pattern})\b")
        } else {
            pattern.to_string()
        };
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(line.has_option("i"))
            .build()
            .with_context(|| format!("invalid regex pattern: {pattern}"))?;

        let after_context = match line.value("A") {
            Some(num) => num
                .parse::<usize>()
                .with_context(|| format!("invalid context length: {num}"))?,
            None => 0,
        };

        if line.args().is_empty() {
            bail!("missing file operand");
        }
        let many = line.args().len() > 1;
        for file in line.args() {
            let f = fs::File::open(file).with_context(|| file.clone())?;
            let prefix = if many { format!("{file}:") } else { String::new() };
            self.search(f, &prefix, &re, after_context)?;
        }
        Ok(())
    }
}

/// `help [command]`: list commands, or show one command's usage.
pub struct Help {
    usage: Usage,
    registry: Arc<Registry>,
    width: Width,
    out: Output,
}

impl Help {
    pub fn new(registry: Arc<Registry>, width: Width, out: Output) -> Self {
        Self {
            usage: Usage::new("help [command]"),
            registry,
            width,
            out,
        }
    }
}

impl Command for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, line: &Line) -> Result<()> {
        match line.args().first() {
            None => {
                let mut text = String::new();
                for name in self.registry.names() {
                    text.push_str(&name);
                    text.push('\n');
                }
                self.out.write_all(&text)
            }
            Some(name) => {
                let command = self
                    .registry
                    .get(name)
                    .with_context(|| format!("no such command: {name}"))?;
                let usage = command.usage().render(self.width.resolve());
                self.out.write_all(&format!("{usage}\n"))
            }
        }
    }
}

/// `exit`: leave the read-eval loop.
pub struct Exit {
    usage: Usage,
    stop: StopHandle,
}

impl Exit {
    pub fn new(stop: StopHandle) -> Self {
        Self {
            usage: Usage::new("exit"),
            stop,
        }
    }
}

impl Command for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }

    fn run(&self, _line: &Line) -> Result<()> {
        self.stop.stop();
        Ok(())
    }
}
