use crate::registry::Registry;
use std::sync::Arc;

/// Result of completing a command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No registered command starts with the prefix.
    Unavailable,
    /// Sorted candidates. A lone candidate carries a trailing space.
    Candidates(Vec<String>),
}

/// Tab completion over the names currently registered on a shell.
#[derive(Clone)]
pub struct CommandCompleter {
    registry: Arc<Registry>,
}

impl CommandCompleter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Complete `prefix` against the registered names. `None` or an empty
    /// prefix matches every command.
    pub fn complete(&self, prefix: Option<&str>) -> Completion {
        let prefix = prefix.unwrap_or_default();
        let mut candidates: Vec<String> = self
            .registry
            .names()
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect();

        match candidates.len() {
            0 => Completion::Unavailable,
            1 => {
                candidates[0].push(' ');
                Completion::Candidates(candidates)
            }
            _ => Completion::Candidates(candidates),
        }
    }
}
