use crate::terminal::Width;
use std::collections::HashMap;
use std::env;

/// Environment variable holding the prompt text.
pub const PROMPT_VAR: &str = "ASH_PROMPT";
/// Environment variable pinning the help text width, in columns.
pub const WIDTH_VAR: &str = "ASH_WIDTH";

pub const DEFAULT_PROMPT: &str = "ash> ";

/// User-level settings of an interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Text shown before each input line. Never empty.
    pub prompt: String,
    /// Width used when rendering usage text.
    pub width: Width,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            width: Width::Terminal,
        }
    }
}

impl ShellConfig {
    /// Defaults overridden by `ASH_PROMPT` and `ASH_WIDTH` from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Same as [`ShellConfig::from_env`] but reading from the given pairs.
    ///
    /// Empty prompts and widths that are not positive integers are ignored.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let mut config = Self::default();
        if let Some(prompt) = vars.get(PROMPT_VAR).filter(|p| !p.is_empty()) {
            config.prompt = prompt.clone();
        }
        if let Some(width) = vars.get(WIDTH_VAR).and_then(|w| parse_width(w)) {
            config.width = Width::Fixed(width);
        }
        config
    }
}

fn parse_width(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|w| *w > 0)
}
