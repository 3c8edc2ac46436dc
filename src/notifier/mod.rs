//! The alteration notifier plugin.
//!
//! Announces plugin loads and unloads to a set of groups, and tells users
//! when the command they just typed belongs to a plugin that is gone.

pub mod config;
pub mod index;
pub mod role_range;
pub mod tracker;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::core::config::ConfigStore;
use crate::core::context::Context;
use crate::core::event::{MessageEvent, UnifiedOrigin};
use crate::core::plugin::{EventFilter, MessageHandler, Plugin, PluginMetadata, Reply};

pub use config::{MessageTemplates, NotifierConfig, RoleRangeConfig};
pub use index::{collect_command_names, index_plugin};
pub use role_range::RoleRange;
pub use tracker::{LifecycleTracker, RemovedCommands};

/// Runs before any other handler so that the group is known when notifying.
pub const COLLECT_GROUP_PRIORITY: i32 = 10;
/// Runs after everything else so replies from other plugins win.
pub const MONITOR_PRIORITY: i32 = -10;

struct NotifierState {
    tracker: LifecycleTracker,
    role_range: RoleRange,
}

pub struct AlterationNotifier {
    config: NotifierConfig,
    // never held across an await
    state: Mutex<NotifierState>,
}

impl AlterationNotifier {
    pub fn new(config: NotifierConfig) -> crate::core::error::Result<Self> {
        config.validate()?;

        let state = NotifierState {
            tracker: LifecycleTracker::new(),
            role_range: RoleRange::new(&config.role_range),
        };

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    /// Build from the `[alteration_notifier]` section of `store`.
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let config: NotifierConfig = store.get()?;
        Ok(Self::new(config)?)
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Whether startup indexing has run.
    pub fn is_ready(&self) -> bool {
        self.state.lock().tracker.is_ready()
    }

    pub fn commands_of(&self, plugin: &str) -> Option<HashSet<String>> {
        self.state.lock().tracker.commands_of(plugin).cloned()
    }

    /// Snapshot of the removal cache in insertion order.
    pub fn removed_commands(&self) -> Vec<(String, i64)> {
        self.state
            .lock()
            .tracker
            .removed()
            .iter()
            .map(|(name, at)| (name.to_string(), at))
            .collect()
    }

    /// Snapshot of the groups notifications go to.
    pub fn role_range(&self) -> Vec<String> {
        self.state
            .lock()
            .role_range
            .iter()
            .map(str::to_string)
            .collect()
    }

    /// Index the commands of every plugin the host has active.
    pub async fn save_activated_plugins(&self, ctx: &Context) -> Result<()> {
        let plugins = ctx.activated_plugins();
        let commands = ctx.list_commands().await?;

        self.state
            .lock()
            .tracker
            .index_startup(&plugins, &commands)?;

        info!(
            "Indexed commands of {} active plugins ({} registered commands)",
            plugins.len(),
            commands.len()
        );
        Ok(())
    }

    /// Send `msg` to every group in the role range.
    pub async fn notify(&self, ctx: &Context, msg: &str) -> Result<()> {
        let groups = self.role_range();
        debug!("Notifying {} groups: {}", groups.len(), msg);

        for group in groups {
            let origin = UnifiedOrigin::group(self.config.platform_id.as_str(), group);
            ctx.send_message(&origin, msg).await?;
        }
        Ok(())
    }

    fn is_muted(&self, plugin: &str) -> bool {
        !self.config.monitor_self && plugin == self.config.self_name
    }

    /// Grow the role range from group traffic.
    fn collect_group(&self, event: &MessageEvent) -> Reply {
        if let Some(group_id) = event.group_id()
            && self.state.lock().role_range.observe(group_id)
        {
            info!("Group {} added to the notification range", group_id);
        }
        None
    }

    /// Reply once if the message starts with a removed command.
    fn check_removed(&self, event: &MessageEvent) -> Reply {
        if event.replied || event.message.is_empty() {
            return None;
        }

        let state = self.state.lock();
        let (name, removed_at) = state.tracker.removed().first_prefix_of(&event.message)?;

        debug!("{} invoked removed command {}", event.origin, name);
        Some(self.config.messages.command_removed(name, removed_at))
    }
}

#[async_trait]
impl Plugin for AlterationNotifier {
    fn meta(&self) -> PluginMetadata {
        PluginMetadata::new(self.config.self_name.as_str())
            .description("Announces plugin changes and warns about removed commands")
            .version(env!("CARGO_PKG_VERSION"))
    }

    async fn initialize(&self, ctx: &Context) -> Result<()> {
        self.save_activated_plugins(ctx).await
    }

    async fn on_host_loaded(&self, ctx: &Context) -> Result<()> {
        self.save_activated_plugins(ctx).await
    }

    async fn on_plugin_loaded(&self, ctx: &Context, meta: &PluginMetadata) -> Result<()> {
        if !self.is_ready() {
            debug!("Ignoring load of {} before startup indexing", meta.name);
            return Ok(());
        }

        let commands = ctx.list_commands().await?;
        let names = index_plugin(&commands, &meta.name)?;
        info!("Plugin {} loaded with {} commands", meta.name, names.len());
        self.state.lock().tracker.plugin_loaded(&meta.name, names);

        if self.is_muted(&meta.name) {
            return Ok(());
        }
        self.notify(ctx, &self.config.messages.plugin_loaded(&meta.name))
            .await
    }

    async fn on_plugin_unloaded(&self, ctx: &Context, meta: &PluginMetadata) -> Result<()> {
        if !self.is_ready() {
            debug!("Ignoring unload of {} before startup indexing", meta.name);
            return Ok(());
        }

        let now = Local::now().timestamp();
        let stamped = self
            .state
            .lock()
            .tracker
            .plugin_unloaded(&meta.name, now)?;
        info!("Plugin {} unloaded, removed commands: {:?}", meta.name, stamped);

        if self.is_muted(&meta.name) {
            return Ok(());
        }
        self.notify(ctx, &self.config.messages.plugin_unloaded(&meta.name))
            .await
    }

    fn handlers(self: Arc<Self>) -> Vec<MessageHandler> {
        let collector = self.clone();
        let monitor = self;

        vec![
            MessageHandler::new("collect_group", EventFilter::GroupMessage, move |_ctx, event| {
                let this = collector.clone();
                async move { anyhow::Ok(this.collect_group(&event)) }
            })
            .priority(COLLECT_GROUP_PRIORITY),
            MessageHandler::new("monitor_removed", EventFilter::All, move |_ctx, event| {
                let this = monitor.clone();
                async move { anyhow::Ok(this.check_removed(&event)) }
            })
            .priority(MONITOR_PRIORITY),
        ]
    }
}
