// Convenience re-exports: use alteration_notifier::prelude::*;
pub use crate::Runtime;

pub use crate::core::{
    Adapter, CommandDescriptor, CommandNode, ConfigStore, Configurable, Context, EventFilter,
    Host, HostEvent, MessageEvent, MessageHandler, Plugin, PluginMetadata, UnifiedOrigin,
};

pub use crate::adapter::{ConsoleAdapter, ConsoleConfig, MemoryHost};
pub use crate::notifier::{AlterationNotifier, NotifierConfig};

// Re-export async_trait for Plugin impls
pub use async_trait::async_trait;
