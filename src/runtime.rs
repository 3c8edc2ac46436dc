use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::core::adapter::Adapter;
use crate::core::context::Context;
use crate::core::plugin::{Plugin, PluginManager};

/// Event loop between one adapter and the registered plugins.
#[derive(Default)]
pub struct Runtime {
    plugin_manager: PluginManager,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册共享插件（调用方保留一份引用）
    pub fn plugin_arc(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugin_manager.register_arc(plugin);
        self
    }

    /// Run until the adapter runs out of events.
    ///
    /// Events are dispatched one at a time: every hook of one event finishes
    /// before the adapter is asked for the next.
    pub async fn run<A: Adapter>(mut self, mut adapter: A) -> Result<()> {
        let ctx = Context::new(adapter.host());
        let dispatcher = self.plugin_manager.build();
        info!(
            "Loaded {} plugins on adapter {}",
            dispatcher.plugins().len(),
            adapter.name()
        );

        dispatcher.initialize(&ctx).await;
        adapter.start()?;

        while let Some(event) = adapter.next_event().await {
            dispatcher.dispatch(&ctx, event).await;
        }

        info!("Adapter {} closed, shutting down", adapter.name());
        dispatcher.terminate(&ctx).await;
        adapter.shutdown().await
    }
}
