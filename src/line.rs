use std::collections::HashMap;

/// One resolved invocation: command name, matched flags and positional arguments.
///
/// Flags are keyed by every spelling they were declared with, so a match on
/// `-f` is visible under both `"f"` and `"file"`. Switches that take no value
/// map to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    command: String,
    options: HashMap<String, Option<String>>,
    args: Vec<String>,
}

impl Line {
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_options_and_args(command, HashMap::new(), Vec::new())
    }

    pub fn with_options(
        command: impl Into<String>,
        options: HashMap<String, Option<String>>,
    ) -> Self {
        Self::with_options_and_args(command, options, Vec::new())
    }

    pub fn with_args(command: impl Into<String>, args: Vec<String>) -> Self {
        Self::with_options_and_args(command, HashMap::new(), args)
    }

    pub fn with_options_and_args(
        command: impl Into<String>,
        options: HashMap<String, Option<String>>,
        args: Vec<String>,
    ) -> Self {
        Self {
            command: command.into(),
            options,
            args,
        }
    }

    /// Name the command was invoked under.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn options(&self) -> &HashMap<String, Option<String>> {
        &self.options
    }

    /// Positional arguments, in the order they were typed.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether the flag was given, with or without a value.
    pub fn has_option(&self, flag: &str) -> bool {
        self.options.contains_key(flag)
    }

    /// Value of a value-taking flag.
    pub fn value(&self, flag: &str) -> Option<&str> {
        self.options.get(flag).and_then(|v| v.as_deref())
    }
}
