use anyhow::Result;
use async_trait::async_trait;

use crate::core::command::CommandDescriptor;
use crate::core::event::UnifiedOrigin;
use crate::core::plugin::PluginMetadata;

/// The host platform as seen from a plugin.
/// Adapters implement this trait.
#[async_trait]
pub trait Host: Send + Sync {
    /// Every plugin the host knows about, active or not.
    fn list_plugins(&self) -> Vec<PluginMetadata>;

    /// Every registered command, tagged with its owning plugin.
    async fn list_commands(&self) -> Result<Vec<CommandDescriptor>>;

    /// Send a plain text message to a conversation.
    async fn send_message(&self, origin: &UnifiedOrigin, content: &str) -> Result<()>;
}
