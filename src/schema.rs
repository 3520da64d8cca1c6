//! Compiled flag schema and the token-level parser that matches a command's
//! arguments against it.
//!
//! Conventions follow the usual Unix style:
//! - `-f` is a short flag, `--file` a long one; `--` ends flag processing.
//! - A value-taking flag consumes the next token, or an inline value given as
//!   `--file=a.txt`, `-f=a.txt` or `-fa.txt`.
//! - Anything else is a positional argument and keeps its position relative to
//!   the other positionals.

use crate::line::Line;
use crate::usage::Usage;
use std::collections::HashMap;
use thiserror::Error;

/// A single flag the parser recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDef {
    pub short: String,
    pub long: Option<String>,
    pub takes_value: bool,
    pub required: bool,
}

/// Reasons a line does not match a command's flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("unrecognized option: {0}")]
    UnknownFlag(String),

    #[error("missing argument for option: {0}")]
    MissingValue(String),

    #[error("option {0} does not take a value")]
    UnexpectedValue(String),

    #[error("missing required option(s): {}", .0.join(", "))]
    MissingRequired(Vec<String>),
}

/// The set of flags a command accepts, compiled from its [`Usage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSchema {
    flags: Vec<FlagDef>,
}

impl FlagSchema {
    pub fn from_usage(usage: &Usage) -> Self {
        let flags = usage
            .options()
            .map(|option| FlagDef {
                short: option.short().to_string(),
                long: option.long().map(str::to_string),
                takes_value: option.takes_value(),
                required: option.required(),
            })
            .collect();
        Self { flags }
    }

    pub fn flags(&self) -> &[FlagDef] {
        &self.flags
    }

    /// Match `tokens` (everything after the command name) against the schema.
    pub fn parse(&self, tokens: &[&str]) -> Result<Matches, FlagError> {
        FlagParser::new(self, tokens).run()
    }

    fn by_short(&self, short: &str) -> Option<usize> {
        self.flags.iter().position(|f| f.short == short)
    }

    fn by_long(&self, long: &str) -> Option<usize> {
        self.flags
            .iter()
            .position(|f| f.long.as_deref() == Some(long))
    }
}

/// Flags and positionals extracted from one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    options: HashMap<String, Option<String>>,
    args: Vec<String>,
}

impl Matches {
    pub fn options(&self) -> &HashMap<String, Option<String>> {
        &self.options
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_line(self, command: impl Into<String>) -> Line {
        Line::with_options_and_args(command, self.options, self.args)
    }
}

struct FlagParser<'a> {
    schema: &'a FlagSchema,
    tokens: &'a [&'a str],
    pos: usize,
    // Outer `None`: flag not seen. Inner `None`: seen, takes no value.
    values: Vec<Option<Option<String>>>,
    args: Vec<String>,
}

impl<'a> FlagParser<'a> {
    fn new(schema: &'a FlagSchema, tokens: &'a [&'a str]) -> Self {
        Self {
            schema,
            tokens,
            pos: 0,
            values: vec![None; schema.flags.len()],
            args: Vec::new(),
        }
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn run(mut self) -> Result<Matches, FlagError> {
        while let Some(token) = self.advance() {
            if token == "--" {
                let rest = &self.tokens[self.pos..];
                self.args.extend(rest.iter().map(|t| t.to_string()));
                break;
            }

            if let Some(body) = token.strip_prefix("--") {
                self.long_flag(body)?;
            } else if let Some(body) = token.strip_prefix('-').filter(|b| !b.is_empty()) {
                self.short_flag(token, body)?;
            } else {
                self.args.push(token.to_string());
            }
        }
        self.finish()
    }

    fn long_flag(&mut self, body: &str) -> Result<(), FlagError> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let spelled = format!("--{name}");
        let idx = self
            .schema
            .by_long(name)
            .ok_or_else(|| FlagError::UnknownFlag(spelled.clone()))?;

        let value = if self.schema.flags[idx].takes_value {
            match inline {
                Some(v) => Some(v.to_string()),
                None => Some(self.value_for(&spelled)?),
            }
        } else if inline.is_some() {
            return Err(FlagError::UnexpectedValue(spelled));
        } else {
            None
        };
        self.values[idx] = Some(value);
        Ok(())
    }

    fn short_flag(&mut self, token: &str, body: &str) -> Result<(), FlagError> {
        if let Some(idx) = self.schema.by_short(body) {
            let value = if self.schema.flags[idx].takes_value {
                Some(self.value_for(token)?)
            } else {
                None
            };
            self.values[idx] = Some(value);
            return Ok(());
        }

        // `-f=VALUE`, same as the long form.
        if let Some((name, value)) = body.split_once('=') {
            if let Some(idx) = self.schema.by_short(name) {
                if !self.schema.flags[idx].takes_value {
                    return Err(FlagError::UnexpectedValue(format!("-{name}")));
                }
                self.values[idx] = Some(Some(value.to_string()));
                return Ok(());
            }
        }

        // `-fVALUE`: first character names a value-taking flag.
        let mut chars = body.chars();
        if let Some(first) = chars.next() {
            let mut buf = [0u8; 4];
            if let Some(idx) = self.schema.by_short(first.encode_utf8(&mut buf)) {
                if self.schema.flags[idx].takes_value {
                    self.values[idx] = Some(Some(chars.as_str().to_string()));
                    return Ok(());
                }
            }
        }
        Err(FlagError::UnknownFlag(token.to_string()))
    }

    fn value_for(&mut self, spelled: &str) -> Result<String, FlagError> {
        self.advance()
            .map(str::to_string)
            .ok_or_else(|| FlagError::MissingValue(spelled.to_string()))
    }

    fn finish(self) -> Result<Matches, FlagError> {
        let missing: Vec<String> = self
            .schema
            .flags
            .iter()
            .zip(&self.values)
            .filter(|(flag, value)| flag.required && value.is_none())
            .map(|(flag, _)| format!("-{}", flag.short))
            .collect();
        if !missing.is_empty() {
            return Err(FlagError::MissingRequired(missing));
        }

        let mut options = HashMap::new();
        for (flag, value) in self.schema.flags.iter().zip(self.values) {
            let Some(value) = value else { continue };
            if let Some(long) = &flag.long {
                options.insert(long.clone(), value.clone());
            }
            options.insert(flag.short.clone(), value);
        }
        Ok(Matches {
            options,
            args: self.args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_schema() -> FlagSchema {
        let mut usage = Usage::new("put [options] <target>");
        usage
            .option("f", Some("file"), true, Some("file to upload"), Some("path"))
            .unwrap()
            .option("v", Some("verbose"), false, Some("print progress"), None)
            .unwrap();
        FlagSchema::from_usage(&usage)
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_from_usage_compiles_every_option() {
        let schema = put_schema();
        assert_eq!(
            schema.flags(),
            [
                FlagDef {
                    short: "f".into(),
                    long: Some("file".into()),
                    takes_value: true,
                    required: true,
                },
                FlagDef {
                    short: "v".into(),
                    long: Some("verbose".into()),
                    takes_value: false,
                    required: false,
                },
            ]
        );
    }

    #[test]
    fn test_short_value_flag_and_positional() {
        let m = put_schema().parse(&["-f", "a.txt", "extra"]).unwrap();
        assert_eq!(m.options().get("f"), Some(&some("a.txt")));
        assert_eq!(m.options().get("file"), Some(&some("a.txt")));
        assert_eq!(m.options().len(), 2);
        assert_eq!(m.args(), ["extra"]);
    }

    #[test]
    fn test_long_flags_with_inline_value_and_switch() {
        let m = put_schema()
            .parse(&["one", "--file=b.txt", "two", "--verbose", "three"])
            .unwrap();
        assert_eq!(m.options().get("f"), Some(&some("b.txt")));
        assert_eq!(m.options().get("verbose"), Some(&None));
        assert_eq!(m.options().get("v"), Some(&None));
        assert_eq!(m.args(), ["one", "two", "three"]);
    }

    #[test]
    fn test_attached_short_value() {
        let m = put_schema().parse(&["-fc.txt"]).unwrap();
        assert_eq!(m.options().get("file"), Some(&some("c.txt")));
    }

    #[test]
    fn test_short_flag_with_equals_value() {
        let m = put_schema().parse(&["-f=a.txt", "extra"]).unwrap();
        assert_eq!(m.options().get("f"), Some(&some("a.txt")));
        assert_eq!(m.options().get("file"), Some(&some("a.txt")));
        assert_eq!(m.args(), ["extra"]);
    }

    #[test]
    fn test_short_switch_with_equals_value_is_rejected() {
        assert_eq!(
            put_schema().parse(&["-f", "a", "-v=yes"]),
            Err(FlagError::UnexpectedValue("-v".into()))
        );
    }

    #[test]
    fn test_value_may_look_like_a_flag() {
        let m = put_schema().parse(&["-f", "-v"]).unwrap();
        assert_eq!(m.options().get("f"), Some(&some("-v")));
        assert!(!m.options().contains_key("v"));
    }

    #[test]
    fn test_repeated_flag_keeps_last_value() {
        let m = put_schema().parse(&["-f", "a", "--file", "b"]).unwrap();
        assert_eq!(m.options().get("f"), Some(&some("b")));
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let m = put_schema().parse(&["-f", "a", "--", "-v", "--file"]).unwrap();
        assert_eq!(m.args(), ["-v", "--file"]);
        assert!(!m.options().contains_key("v"));
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let m = put_schema().parse(&["-f", "a", "-"]).unwrap();
        assert_eq!(m.args(), ["-"]);
    }

    #[test]
    fn test_multi_character_short_flag() {
        let mut usage = Usage::new("x");
        usage
            .option("rf", None, false, None, None)
            .unwrap();
        let m = FlagSchema::from_usage(&usage).parse(&["-rf"]).unwrap();
        assert_eq!(m.options().get("rf"), Some(&None));
    }

    #[test]
    fn test_unknown_flags_are_rejected() {
        let schema = put_schema();
        assert_eq!(
            schema.parse(&["-f", "a", "-x"]),
            Err(FlagError::UnknownFlag("-x".into()))
        );
        assert_eq!(
            schema.parse(&["-f", "a", "--nope"]),
            Err(FlagError::UnknownFlag("--nope".into()))
        );
        assert_eq!(
            schema.parse(&["-f", "a", "-vx"]),
            Err(FlagError::UnknownFlag("-vx".into()))
        );
    }

    #[test]
    fn test_missing_value_is_rejected() {
        assert_eq!(
            put_schema().parse(&["-f"]),
            Err(FlagError::MissingValue("-f".into()))
        );
        assert_eq!(
            put_schema().parse(&["--file"]),
            Err(FlagError::MissingValue("--file".into()))
        );
    }

    #[test]
    fn test_switch_with_inline_value_is_rejected() {
        assert_eq!(
            put_schema().parse(&["-f", "a", "--verbose=yes"]),
            Err(FlagError::UnexpectedValue("--verbose".into()))
        );
    }

    #[test]
    fn test_missing_required_flag_is_rejected() {
        let err = put_schema().parse(&["extra", "-v"]).unwrap_err();
        assert_eq!(err, FlagError::MissingRequired(vec!["-f".into()]));
        assert_eq!(err.to_string(), "missing required option(s): -f");
    }

    #[test]
    fn test_into_line_carries_command_name() {
        let line = put_schema()
            .parse(&["-f", "a.txt", "extra"])
            .unwrap()
            .into_line("put");
        assert_eq!(line.command(), "put");
        assert_eq!(line.value("file"), Some("a.txt"));
        assert_eq!(line.args(), ["extra"]);
    }
}
