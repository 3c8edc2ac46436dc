use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::command::CommandDescriptor;
use crate::core::event::UnifiedOrigin;
use crate::core::host::Host;
use crate::core::plugin::PluginMetadata;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub origin: UnifiedOrigin,
    pub content: String,
}

/// A host kept entirely in memory: plugin registry, command registry and
/// an outbox of everything sent.
#[derive(Default)]
pub struct MemoryHost {
    plugins: RwLock<Vec<PluginMetadata>>,
    commands: RwLock<Vec<CommandDescriptor>>,
    outbox: Mutex<Vec<SentMessage>>,
    outbound_tx: Mutex<Option<mpsc::Sender<String>>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forward every sent message, rendered as `[origin] text`.
    pub fn with_outbound(outbound_tx: mpsc::Sender<String>) -> Self {
        Self {
            outbound_tx: Mutex::new(Some(outbound_tx)),
            ..Self::default()
        }
    }

    /// Register (or re-register) an active plugin with its commands.
    pub fn install(&self, meta: PluginMetadata, commands: Vec<CommandDescriptor>) -> PluginMetadata {
        let meta = meta.activated(true);
        info!("Installing plugin {} with {} commands", meta.name, commands.len());

        {
            let mut plugins = self.plugins.write();
            plugins.retain(|p| p.name != meta.name);
            plugins.push(meta.clone());
        }
        {
            let mut registry = self.commands.write();
            registry.retain(|c| c.plugin != meta.name);
            registry.extend(commands);
        }

        meta
    }

    /// Deactivate a plugin and drop its commands.
    pub fn uninstall(&self, name: &str) -> Option<PluginMetadata> {
        let meta = {
            let mut plugins = self.plugins.write();
            let entry = plugins.iter_mut().find(|p| p.name == name)?;
            entry.activated = false;
            entry.clone()
        };
        self.commands.write().retain(|c| c.plugin != name);

        info!("Uninstalled plugin {}", name);
        Some(meta)
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.outbox.lock().clone()
    }

    /// Drain the outbox.
    pub fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Stop forwarding. Once in-flight sends finish, the receiving side
    /// sees the channel closed.
    pub fn close_outbound(&self) {
        if self.outbound_tx.lock().take().is_some() {
            debug!("Outbound channel closed");
        }
    }
}

#[async_trait]
impl Host for MemoryHost {
    fn list_plugins(&self) -> Vec<PluginMetadata> {
        self.plugins.read().clone()
    }

    async fn list_commands(&self) -> Result<Vec<CommandDescriptor>> {
        Ok(self.commands.read().clone())
    }

    async fn send_message(&self, origin: &UnifiedOrigin, content: &str) -> Result<()> {
        debug!("发送 -> {} {:?}", origin, content);
        self.outbox.lock().push(SentMessage {
            origin: origin.clone(),
            content: content.to_string(),
        });

        let tx = self.outbound_tx.lock().clone();
        if let Some(tx) = tx {
            tx.send(format!("[{}] {}", origin, content))
                .await
                .map_err(|_| anyhow!("outbound channel closed"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::CommandNode;

    #[tokio::test]
    async fn install_replaces_previous_registration() {
        let host = MemoryHost::new();
        host.install(
            PluginMetadata::new("p"),
            vec![CommandDescriptor::new("p", CommandNode::command("a", Vec::<String>::new()))],
        );
        host.install(
            PluginMetadata::new("p"),
            vec![CommandDescriptor::new("p", CommandNode::command("b", Vec::<String>::new()))],
        );

        assert_eq!(host.list_plugins().len(), 1);
        let commands = host.list_commands().await.unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].node, CommandNode::command("b", Vec::<String>::new()));
    }

    #[tokio::test]
    async fn uninstall_deactivates_and_drops_commands() {
        let host = MemoryHost::new();
        host.install(
            PluginMetadata::new("p"),
            vec![CommandDescriptor::new("p", CommandNode::command("a", Vec::<String>::new()))],
        );

        let meta = host.uninstall("p").unwrap();
        assert!(!meta.activated);
        assert!(!host.list_plugins()[0].activated);
        assert!(host.list_commands().await.unwrap().is_empty());
        assert!(host.uninstall("ghost").is_none());
    }

    #[tokio::test]
    async fn send_records_and_forwards() {
        let (tx, mut rx) = mpsc::channel(4);
        let host = MemoryHost::with_outbound(tx);
        let origin = UnifiedOrigin::group("default", "1");

        host.send_message(&origin, "hi").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), "[default:GroupMessage:1] hi");
        assert_eq!(host.take_sent().len(), 1);
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn close_outbound_ends_the_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let host = MemoryHost::with_outbound(tx);
        let origin = UnifiedOrigin::group("default", "1");

        host.send_message(&origin, "last").await.unwrap();
        host.close_outbound();
        host.send_message(&origin, "unforwarded").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), "[default:GroupMessage:1] last");
        assert!(rx.recv().await.is_none());
        assert_eq!(host.sent().len(), 2);
    }
}
