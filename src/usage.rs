//! Declarative description of a command's flags and its help text renderer.
//!
//! A [`Usage`] holds a free-text syntax line and a set of [`UsageOption`]s kept
//! in short-flag order. Rendering wraps every line at the terminal width without
//! ever splitting a word:
//!
//! ```
//! use ash_shell::Usage;
//!
//! let mut usage = Usage::new("put [options] <target>");
//! usage
//!     .option("f", Some("file"), true, Some("file to upload"), Some("path"))
//!     .unwrap()
//!     .option("v", Some("verbose"), false, Some("print progress"), None)
//!     .unwrap();
//!
//! assert_eq!(
//!     usage.render(80),
//!     "usage: put [options] <target>\n \
//!      -f,--file <path>   file to upload\n \
//!      -v,--verbose       print progress"
//! );
//! ```

use crate::error::{Result, ShellError};
use crate::terminal;
use std::collections::BTreeMap;
use std::fmt;

const PREFIX: &str = "usage: ";
const GUTTER: usize = 3;

/// One flag accepted by a command.
///
/// The short flag is mandatory; everything else is optional. Giving an argument
/// name makes the flag consume the token that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageOption {
    short: String,
    long: Option<String>,
    required: bool,
    description: Option<String>,
    arg: Option<String>,
}

impl UsageOption {
    /// Create an optional, value-less flag spelled `-<short>`.
    ///
    /// Fails with [`ShellError::InvalidArgument`] when `short` is empty.
    pub fn new(short: impl Into<String>) -> Result<Self> {
        let short = short.into();
        if short.is_empty() {
            return Err(ShellError::invalid("short", &short));
        }
        Ok(Self {
            short,
            long: None,
            required: false,
            description: None,
            arg: None,
        })
    }

    /// Add the `--<long>` spelling. An empty string leaves the flag without one.
    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = non_empty(long.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Name the flag's value, e.g. `path` renders as `<path>`.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = non_empty(arg.into());
        self
    }

    pub fn short(&self) -> &str {
        &self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arg(&self) -> Option<&str> {
        self.arg.as_deref()
    }

    /// Whether the flag consumes a value.
    pub fn takes_value(&self) -> bool {
        self.arg.is_some()
    }

    /// Left column of the help text: ` -f,--file <path>`.
    fn label(&self) -> String {
        let mut label = format!(" -{}", self.short);
        if let Some(long) = &self.long {
            label.push_str(",--");
            label.push_str(long);
        }
        if let Some(arg) = &self.arg {
            label.push_str(" <");
            label.push_str(arg);
            label.push('>');
        }
        label
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Syntax line plus flag set of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    syntax: String,
    options: BTreeMap<String, UsageOption>,
}

impl Usage {
    pub fn new(syntax: impl Into<String>) -> Self {
        Self {
            syntax: syntax.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// Options in ascending short-flag order.
    pub fn options(&self) -> impl Iterator<Item = &UsageOption> {
        self.options.values()
    }

    /// Declare a flag. See [`Usage::insert`] for how clashes are resolved.
    ///
    /// Fails with [`ShellError::InvalidArgument`] when `short` is empty.
    pub fn option(
        &mut self,
        short: &str,
        long: Option<&str>,
        required: bool,
        description: Option<&str>,
        arg: Option<&str>,
    ) -> Result<&mut Self> {
        let mut option = UsageOption::new(short)?.with_required(required);
        if let Some(long) = long {
            option = option.with_long(long);
        }
        if let Some(description) = description {
            option = option.with_description(description);
        }
        if let Some(arg) = arg {
            option = option.with_arg(arg);
        }
        Ok(self.insert(option))
    }

    /// Insert a flag, replacing any existing flag with the same short spelling
    /// or the same long spelling.
    pub fn insert(&mut self, option: UsageOption) -> &mut Self {
        self.options.retain(|short, existing| {
            *short != option.short && (option.long.is_none() || existing.long != option.long)
        });
        self.options.insert(option.short.clone(), option);
        self
    }

    /// Render the help text for a terminal `width` columns wide.
    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        let indent = PREFIX.len()
            + self
                .syntax
                .chars()
                .position(|c| c == ' ')
                .map_or(0, |i| i + 1);
        push_wrapped(&mut out, &format!("{PREFIX}{}", self.syntax), 0, indent, width);

        let labels: Vec<String> = self.options().map(UsageOption::label).collect();
        let max = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let tab = max + GUTTER;
        for (option, label) in self.options().zip(labels) {
            out.push('\n');
            let pad = tab - label.chars().count();
            let text = format!(
                "{label}{:pad$}{}",
                "",
                option.description().unwrap_or_default()
            );
            push_wrapped(&mut out, &text, tab, tab, width);
        }
        out
    }
}

impl fmt::Display for Usage {
    /// Renders at the terminal's current width.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(terminal::width()))
    }
}

/// Append `text` to `out`, broken into lines of at most `width` columns.
///
/// The first break point is searched from column `from`; continuation lines
/// start with `indent` spaces and are searched from there.
fn push_wrapped(out: &mut String, text: &str, from: usize, indent: usize, width: usize) {
    let mut line: Vec<char> = text.chars().collect();
    let mut from = from;
    while let Some(pos) = wrap(&line, from, width) {
        let head: String = line[..pos].iter().collect();
        out.push_str(head.trim_end());
        out.push('\n');

        let rest: String = line[pos..].iter().collect();
        line = std::iter::repeat_n(' ', indent)
            .chain(rest.trim().chars())
            .collect();
        from = indent;
    }
    let last: String = line.into_iter().collect();
    out.push_str(last.trim_end());
}

/// Where to break `line` so the head fits in `width` columns.
///
/// Returns `None` when the line fits, or when it holds no whitespace at or
/// past `from` to break on. A newline within the width always wins.
pub(crate) fn wrap(line: &[char], from: usize, width: usize) -> Option<usize> {
    let newline = line
        .iter()
        .skip(from)
        .position(|&c| c == '\n')
        .map(|i| i + from);
    if let Some(i) = newline {
        if i <= width {
            return Some(i + 1);
        }
    }

    if line.len() <= width {
        return None;
    }

    if let Some(pos) = (from..=width).rev().find(|&p| line[p].is_whitespace()) {
        return Some(pos);
    }

    let start = (width + 1).max(from);
    (start..line.len()).find(|&p| line[p].is_whitespace())
}
