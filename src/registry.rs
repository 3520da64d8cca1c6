use crate::command::Command;
use crate::error::{Result, ShellError};
use crate::schema::FlagSchema;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Thread-safe map of command names to commands, plus the flag schemas
/// compiled from them.
///
/// Schemas are built on the first dispatch of a name and reused afterwards.
/// Registering or unregistering a name drops its schema, and a cached schema
/// is only reused for the very command instance it was built from, so a
/// replacement command is never parsed against the flags of the one it replaced.
#[derive(Default)]
pub struct Registry {
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
    schemas: RwLock<HashMap<String, CachedSchema>>,
}

struct CachedSchema {
    source: Arc<dyn Command>,
    schema: Arc<FlagSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command` under its own name.
    pub fn register(&self, command: Arc<dyn Command>) -> Result<()> {
        let name = command.name().to_string();
        self.register_as(&name, command)
    }

    /// Register `command` under `name`, replacing whatever was there.
    pub fn register_as(&self, name: &str, command: Arc<dyn Command>) -> Result<()> {
        if name.is_empty() {
            return Err(ShellError::invalid("name", name));
        }
        self.schemas.write().remove(name);
        let replaced = self
            .commands
            .write()
            .insert(name.to_string(), command)
            .is_some();
        debug!(name, replaced, "registered command");
        Ok(())
    }

    /// Remove the command registered under `name`, if any.
    pub fn unregister(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ShellError::invalid("name", name));
        }
        let removed = self.commands.write().remove(name).is_some();
        self.schemas.write().remove(name);
        debug!(name, removed, "unregistered command");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.read().get(name).cloned()
    }

    /// Snapshot of the registered commands, sorted by name.
    pub fn commands(&self) -> BTreeMap<String, Arc<dyn Command>> {
        self.commands
            .read()
            .iter()
            .map(|(name, command)| (name.clone(), Arc::clone(command)))
            .collect()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Compiled schema for `name`, building it from `command` on first use.
    pub fn schema(&self, name: &str, command: &Arc<dyn Command>) -> Arc<FlagSchema> {
        if let Some(cached) = self.schemas.read().get(name) {
            if Arc::ptr_eq(&cached.source, command) {
                return Arc::clone(&cached.schema);
            }
        }
        let schema = Arc::new(FlagSchema::from_usage(command.usage()));
        debug!(name, flags = schema.flags().len(), "compiled flag schema");
        self.schemas.write().insert(
            name.to_string(),
            CachedSchema {
                source: Arc::clone(command),
                schema: Arc::clone(&schema),
            },
        );
        schema
    }

    #[cfg(test)]
    pub(crate) fn cached_schema(&self, name: &str) -> Option<Arc<FlagSchema>> {
        self.schemas
            .read()
            .get(name)
            .map(|cached| Arc::clone(&cached.schema))
    }
}
