pub mod adapter;
pub mod command;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod event;
pub mod host;
pub mod plugin;

pub use adapter::Adapter;
pub use command::{CommandDescriptor, CommandNode};
pub use config::{ConfigStore, Configurable};
pub use context::Context;
pub use driver::Driver;
pub use error::Error;
pub use event::{HostEvent, MessageEvent, MessageType, UnifiedOrigin};
pub use host::Host;
pub use plugin::{
    Dispatcher, EventFilter, MessageHandler, Plugin, PluginManager, PluginMetadata, Reply,
};
