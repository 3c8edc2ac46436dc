//! Which plugin owns which commands, and which commands went away.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::core::command::CommandDescriptor;
use crate::core::error::{Error, Result};
use crate::core::plugin::PluginMetadata;
use crate::notifier::index::index_plugin;

/// Removed command names with their unix removal time, in insertion order.
///
/// Re-stamping a name keeps its original position.
#[derive(Debug, Default, Clone)]
pub struct RemovedCommands {
    entries: Vec<(String, i64)>,
}

impl RemovedCommands {
    pub fn insert(&mut self, name: String, removed_at: i64) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = removed_at,
            None => self.entries.push((name, removed_at)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<i64> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, at)| *at)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(n, at)| (n.as_str(), *at))
    }

    /// First entry, in insertion order, that `message` starts with.
    pub fn first_prefix_of(&self, message: &str) -> Option<(&str, i64)> {
        self.iter().find(|(name, _)| message.starts_with(name))
    }
}

/// Activation map plus removal cache.
///
/// A command name is never both active and removed once a call returns.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    activated: HashMap<String, HashSet<String>>,
    removed: RemovedCommands,
    ready: bool,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether startup indexing has happened.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Index every activated plugin in `plugins`.
    pub fn index_startup(
        &mut self,
        plugins: &[PluginMetadata],
        commands: &[CommandDescriptor],
    ) -> Result<()> {
        for plugin in plugins.iter().filter(|p| p.activated) {
            let names = index_plugin(commands, &plugin.name)?;
            debug!("Indexed {} commands of {}", names.len(), plugin.name);
            for name in &names {
                self.removed.remove(name);
            }
            self.activated.insert(plugin.name.clone(), names);
        }
        self.ready = true;
        Ok(())
    }

    /// Merge freshly indexed `names` into `plugin` and un-remove them.
    pub fn plugin_loaded(&mut self, plugin: &str, names: HashSet<String>) {
        for name in &names {
            if self.removed.remove(name).is_some() {
                debug!("Command {} is back with {}", name, plugin);
            }
        }
        self.activated
            .entry(plugin.to_string())
            .or_default()
            .extend(names);
    }

    /// Drop `plugin` and stamp its commands as removed at `now`.
    ///
    /// Names another active plugin still provides are not stamped.
    /// Names enter the cache in lexical order; the stamped names are returned.
    pub fn plugin_unloaded(&mut self, plugin: &str, now: i64) -> Result<Vec<String>> {
        let names = self
            .activated
            .remove(plugin)
            .ok_or_else(|| Error::PluginNotTracked(plugin.to_string()))?;

        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();

        let mut stamped = Vec::with_capacity(names.len());
        for name in names {
            if self.activated.values().any(|other| other.contains(&name)) {
                continue;
            }
            self.removed.insert(name.clone(), now);
            stamped.push(name);
        }
        Ok(stamped)
    }

    pub fn commands_of(&self, plugin: &str) -> Option<&HashSet<String>> {
        self.activated.get(plugin)
    }

    pub fn is_tracked(&self, plugin: &str) -> bool {
        self.activated.contains_key(plugin)
    }

    pub fn removed(&self) -> &RemovedCommands {
        &self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::CommandNode;

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ("plugin", "cmd cmd ...")
    fn started(plugins: &[(&str, &str)]) -> LifecycleTracker {
        let mut metas = Vec::new();
        let mut commands = Vec::new();
        for (plugin, cmds) in plugins {
            metas.push(PluginMetadata::new(*plugin));
            for cmd in cmds.split_whitespace() {
                commands.push(CommandDescriptor::new(
                    *plugin,
                    CommandNode::command(cmd, Vec::<String>::new()),
                ));
            }
        }

        let mut tracker = LifecycleTracker::new();
        tracker.index_startup(&metas, &commands).unwrap();
        tracker
    }

    #[test]
    fn startup_skips_inactive_plugins() {
        let metas = vec![
            PluginMetadata::new("on"),
            PluginMetadata::new("off").activated(false),
        ];
        let commands = vec![
            CommandDescriptor::new("on", CommandNode::command("a", Vec::<String>::new())),
            CommandDescriptor::new("off", CommandNode::command("b", Vec::<String>::new())),
        ];

        let mut tracker = LifecycleTracker::new();
        assert!(!tracker.is_ready());
        tracker.index_startup(&metas, &commands).unwrap();

        assert!(tracker.is_ready());
        assert_eq!(tracker.commands_of("on"), Some(&names(&["a"])));
        assert!(!tracker.is_tracked("off"));
    }

    #[test]
    fn unload_moves_commands_into_cache() {
        let mut tracker = started(&[("p", "a b")]);

        let stamped = tracker.plugin_unloaded("p", 1_700_000_000).unwrap();

        assert_eq!(stamped, vec!["a".to_string(), "b".to_string()]);
        assert!(!tracker.is_tracked("p"));
        assert_eq!(tracker.removed().get("a"), Some(1_700_000_000));
        assert_eq!(tracker.removed().get("b"), Some(1_700_000_000));
    }

    #[test]
    fn reload_un_removes_commands() {
        let mut tracker = started(&[("p", "a b")]);
        tracker.plugin_unloaded("p", 10).unwrap();

        tracker.plugin_loaded("p", names(&["a"]));

        assert!(!tracker.removed().contains("a"));
        assert!(tracker.removed().contains("b"));
        assert_eq!(tracker.commands_of("p"), Some(&names(&["a"])));
    }

    #[test]
    fn startup_reindex_un_removes_commands() {
        let mut tracker = started(&[("p", "a b")]);
        tracker.plugin_unloaded("p", 10).unwrap();
        assert!(tracker.removed().contains("a"));

        let metas = vec![PluginMetadata::new("p")];
        let commands = vec![CommandDescriptor::new(
            "p",
            CommandNode::command("a", Vec::<String>::new()),
        )];
        tracker.index_startup(&metas, &commands).unwrap();

        assert!(!tracker.removed().contains("a"));
        assert_eq!(tracker.removed().get("b"), Some(10));
        assert_eq!(tracker.commands_of("p"), Some(&names(&["a"])));
    }

    #[test]
    fn load_unions_into_existing_entry() {
        let mut tracker = started(&[("p", "a")]);
        tracker.plugin_loaded("p", names(&["b"]));
        assert_eq!(tracker.commands_of("p"), Some(&names(&["a", "b"])));
    }

    #[test]
    fn unload_untracked_plugin_is_error() {
        let mut tracker = started(&[]);
        let err = tracker.plugin_unloaded("ghost", 0).unwrap_err();
        assert!(matches!(err, Error::PluginNotTracked(name) if name == "ghost"));
        assert!(tracker.removed().is_empty());
    }

    #[test]
    fn shared_command_stays_active() {
        let mut tracker = started(&[("p", "a shared"), ("q", "shared")]);

        let stamped = tracker.plugin_unloaded("p", 5).unwrap();

        assert_eq!(stamped, vec!["a".to_string()]);
        assert!(!tracker.removed().contains("shared"));
    }

    #[test]
    fn restamp_keeps_insertion_order() {
        let mut cache = RemovedCommands::default();
        cache.insert("x".to_string(), 1);
        cache.insert("y".to_string(), 2);
        cache.insert("x".to_string(), 3);

        let order: Vec<_> = cache.iter().collect();
        assert_eq!(order, vec![("x", 3), ("y", 2)]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn first_prefix_wins_over_longer_match() {
        let mut cache = RemovedCommands::default();
        cache.insert("wx".to_string(), 1);
        cache.insert("wx today".to_string(), 2);

        assert_eq!(cache.first_prefix_of("wx today please"), Some(("wx", 1)));
        assert_eq!(cache.first_prefix_of("hello"), None);
    }
}
