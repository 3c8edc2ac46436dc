use std::sync::Arc;

use anyhow::Result;

use crate::core::command::CommandDescriptor;
use crate::core::event::UnifiedOrigin;
use crate::core::host::Host;
use crate::core::plugin::PluginMetadata;

/// Handle to the host, passed to every plugin hook.
/// Cloning is cheap.
#[derive(Clone)]
pub struct Context {
    host: Arc<dyn Host>,
}

impl Context {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }

    /// Plugins currently marked active by the host.
    pub fn activated_plugins(&self) -> Vec<PluginMetadata> {
        self.host
            .list_plugins()
            .into_iter()
            .filter(|p| p.activated)
            .collect()
    }

    pub async fn list_commands(&self) -> Result<Vec<CommandDescriptor>> {
        self.host.list_commands().await
    }

    pub async fn send_message(&self, origin: &UnifiedOrigin, content: &str) -> Result<()> {
        self.host.send_message(origin, content).await
    }
}
