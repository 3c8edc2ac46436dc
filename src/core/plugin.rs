use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::{FutureExt, future::BoxFuture};
use tracing::{debug, error, info, warn};

use crate::core::context::Context;
use crate::core::event::{HostEvent, MessageEvent};

// ============================================================================
// Metadata
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Whether the host currently has this plugin enabled
    pub activated: bool,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: "0.0.0".to_string(),
            activated: true,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self::new("unnamed")
    }
}

// ============================================================================
// Message handlers
// ============================================================================

/// Which message events a handler wants to see
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    All,
    GroupMessage,
}

impl EventFilter {
    pub fn matches(&self, event: &MessageEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::GroupMessage => event.is_group(),
        }
    }
}

/// Handler output: `Some(text)` is sent back to the event's origin.
pub type Reply = Option<String>;

type HandlerFn = Arc<dyn Fn(Context, MessageEvent) -> BoxFuture<'static, Result<Reply>> + Send + Sync>;

/// A message handler registered by a plugin.
///
/// Handlers run in descending `priority`; equal priorities keep
/// registration order.
#[derive(Clone)]
pub struct MessageHandler {
    pub name: String,
    pub filter: EventFilter,
    pub priority: i32,
    func: HandlerFn,
}

impl MessageHandler {
    pub fn new<F, Fut>(name: impl Into<String>, filter: EventFilter, f: F) -> Self
    where
        F: Fn(Context, MessageEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply>> + Send + 'static,
    {
        Self {
            name: name.into(),
            filter,
            priority: 0,
            func: Arc::new(move |ctx, event| f(ctx, event).boxed()),
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub async fn call(&self, ctx: Context, event: MessageEvent) -> Result<Reply> {
        (self.func)(ctx, event).await
    }
}

// ============================================================================
// Plugin trait
// ============================================================================

/// Plugin trait: hooks the host calls on lifecycle and message events.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Metadata (name/description/version)
    fn meta(&self) -> PluginMetadata {
        PluginMetadata::default()
    }

    /// Called right after the plugin is constructed.
    async fn initialize(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Called when the plugin is about to be dropped.
    async fn terminate(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Called once the host has finished loading every plugin.
    async fn on_host_loaded(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Called whenever some plugin (possibly this one) is enabled or loaded.
    async fn on_plugin_loaded(&self, _ctx: &Context, _meta: &PluginMetadata) -> Result<()> {
        Ok(())
    }

    /// Called whenever some plugin (possibly this one) is disabled or unloaded.
    async fn on_plugin_unloaded(&self, _ctx: &Context, _meta: &PluginMetadata) -> Result<()> {
        Ok(())
    }

    /// Message handlers of this plugin.
    fn handlers(self: Arc<Self>) -> Vec<MessageHandler> {
        Vec::new()
    }
}

pub type PluginList = Arc<[Arc<dyn Plugin>]>;

// ============================================================================
// Manager
// ============================================================================

#[derive(Default)]
pub struct PluginManager {
    pending: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already shared plugin
    pub fn register_arc(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        let meta = plugin.meta();
        info!(
            "Registering plugin: {} v{} - {}",
            meta.name, meta.version, meta.description
        );
        self.pending.push(plugin);
        self
    }

    /// Freeze the plugin list and collect message handlers.
    pub fn build(&mut self) -> Dispatcher {
        let plugins: PluginList = self.pending.drain(..).collect();
        Dispatcher::new(plugins)
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

#[derive(Clone)]
pub struct Dispatcher {
    plugins: PluginList,
    handlers: Arc<[MessageHandler]>,
}

impl Dispatcher {
    /// Create dispatcher from plugin list
    pub fn new(plugins: PluginList) -> Self {
        let mut handlers: Vec<MessageHandler> = plugins
            .iter()
            .flat_map(|p| p.clone().handlers())
            .collect();
        // stable: equal priorities keep registration order
        handlers.sort_by(|a, b| b.priority.cmp(&a.priority));

        Self {
            plugins,
            handlers: handlers.into(),
        }
    }

    pub fn plugins(&self) -> &PluginList {
        &self.plugins
    }

    /// Handler names in execution order
    pub fn handler_order(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name.as_str()).collect()
    }

    /// Run `initialize` on every plugin.
    pub async fn initialize(&self, ctx: &Context) {
        for plugin in self.plugins.iter() {
            if let Err(e) = plugin.initialize(ctx).await {
                error!("Failed to initialize plugin {}: {:#}", plugin.meta().name, e);
            }
        }
    }

    /// Run `terminate` on every plugin, in reverse order.
    pub async fn terminate(&self, ctx: &Context) {
        for plugin in self.plugins.iter().rev() {
            if let Err(e) = plugin.terminate(ctx).await {
                warn!("Error terminating plugin {}: {:#}", plugin.meta().name, e);
            }
        }
    }

    /// Deliver one host event to every plugin.
    pub async fn dispatch(&self, ctx: &Context, event: HostEvent) {
        match event {
            HostEvent::Started => {
                for plugin in self.plugins.iter() {
                    if let Err(e) = plugin.on_host_loaded(ctx).await {
                        error!("Plugin {} failed on host loaded: {:#}", plugin.meta().name, e);
                    }
                }
            }
            HostEvent::PluginLoaded(meta) => {
                for plugin in self.plugins.iter() {
                    if let Err(e) = plugin.on_plugin_loaded(ctx, &meta).await {
                        error!(
                            "Plugin {} failed on load of {}: {:#}",
                            plugin.meta().name,
                            meta.name,
                            e
                        );
                    }
                }
            }
            HostEvent::PluginUnloaded(meta) => {
                for plugin in self.plugins.iter() {
                    if let Err(e) = plugin.on_plugin_unloaded(ctx, &meta).await {
                        error!(
                            "Plugin {} failed on unload of {}: {:#}",
                            plugin.meta().name,
                            meta.name,
                            e
                        );
                    }
                }
            }
            HostEvent::Message(event) => self.dispatch_message(ctx, event).await,
        }
    }

    /// Run message handlers in priority order (sequential).
    pub async fn dispatch_message(&self, ctx: &Context, mut event: MessageEvent) {
        for handler in self.handlers.iter() {
            if !handler.filter.matches(&event) {
                continue;
            }

            match handler.call(ctx.clone(), event.clone()).await {
                Ok(Some(reply)) => {
                    debug!("Handler {} replied to {}", handler.name, event.origin);
                    if let Err(e) = ctx.send_message(&event.origin, &reply).await {
                        warn!("Failed to send reply to {}: {:#}", event.origin, e);
                    }
                    event.replied = true;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Handler {} failed: {:#}", handler.name, e);
                }
            }
        }
    }
}
