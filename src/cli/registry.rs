use std::collections::BTreeMap;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// A top-level shell command and the subcommands it understands.
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub subcommands: &'static [&'static str],
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            subcommands: &[],
            handler,
        }
    }

    pub fn with_subcommands(self, subcommands: &'static [&'static str]) -> Self {
        Self {
            subcommands,
            ..self
        }
    }
}

/// Registered commands, listed in the order they were added.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under an existing name replace the earlier entry in place.
    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter_mut().find(|slot| slot.name == entry.name) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn list(&self) -> impl Iterator<Item = &CommandEntry> + '_ {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    /// Command name to subcommand names, for completion.
    pub fn completion_table(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        self.entries
            .iter()
            .map(|entry| (entry.name, entry.subcommands.to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut ShellContext, _: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn registration_order_is_kept_and_duplicates_replace() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("plan", "first", "plan", noop));
        registry.register(CommandEntry::new("schedule", "schedule", "schedule", noop));
        registry.register(
            CommandEntry::new("plan", "second", "plan", noop).with_subcommands(&["new", "list"]),
        );

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["plan", "schedule"]);
        assert_eq!(registry.get("plan").map(|e| e.description), Some("second"));
        assert_eq!(registry.completion_table()["plan"], vec!["new", "list"]);
        assert!(registry.handler("missing").is_none());
    }
}
