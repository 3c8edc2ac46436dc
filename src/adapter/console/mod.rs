//! Console adapter: drive the notifier by typing host events on stdin.

pub mod protocol;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapter::memory::MemoryHost;
use crate::core::adapter::Adapter;
use crate::core::command::CommandDescriptor;
use crate::core::config::Configurable;
use crate::core::driver::Driver;
use crate::core::event::{HostEvent, MessageEvent};
use crate::core::host::Host;
use crate::core::plugin::PluginMetadata;
use crate::driver::console::ConsoleDriver;

pub use protocol::{ConsoleCommand, HELP, ParseError, parse_line};

const CONSOLE_USER: &str = "console-user";

/// `[console]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Platform segment of the origins console messages come from
    #[serde(default = "default_platform_id")]
    pub platform_id: String,

    /// `{}` is replaced by the outgoing message
    #[serde(default = "default_output_format")]
    pub output_format: String,

    #[serde(default = "default_banner")]
    pub banner: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            platform_id: default_platform_id(),
            output_format: default_output_format(),
            banner: default_banner(),
        }
    }
}

impl Configurable for ConsoleConfig {
    const PREFIX: &'static str = "console";
}

fn default_platform_id() -> String {
    "default".to_string()
}

fn default_output_format() -> String {
    "\x1b[36m[Console Output]\x1b[0m {}".to_string()
}

fn default_banner() -> String {
    "Console host started. Type `help` for commands.".to_string()
}

type LineDriver = Box<dyn Driver<Inbound = String, Outbound = String>>;

pub struct ConsoleAdapter {
    host: Arc<MemoryHost>,
    platform_id: String,
    driver: Option<LineDriver>,
    outbound_rx: Option<mpsc::Receiver<String>>,
    inbound_rx: Option<mpsc::Receiver<String>>,
    driver_task: Option<JoinHandle<()>>,
}

impl ConsoleAdapter {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self::with_driver(
            ConsoleDriver::new(config.banner.as_str(), config.output_format.as_str()),
            config,
        )
    }

    pub fn with_driver<D>(driver: D, config: &ConsoleConfig) -> Self
    where
        D: Driver<Inbound = String, Outbound = String>,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel(100);
        Self {
            host: Arc::new(MemoryHost::with_outbound(outbound_tx)),
            platform_id: config.platform_id.clone(),
            driver: Some(Box::new(driver)),
            outbound_rx: Some(outbound_rx),
            inbound_rx: None,
            driver_task: None,
        }
    }

    /// The in-memory host behind this console.
    pub fn memory_host(&self) -> Arc<MemoryHost> {
        self.host.clone()
    }

    /// Apply a parsed line to the host and turn it into an event.
    fn apply(&self, command: ConsoleCommand) -> Option<HostEvent> {
        match command {
            ConsoleCommand::Start => Some(HostEvent::Started),
            ConsoleCommand::Help => {
                println!("{HELP}");
                None
            }
            ConsoleCommand::Load { plugin, commands } => {
                let descriptors = commands
                    .into_iter()
                    .map(|node| CommandDescriptor::new(plugin.as_str(), node))
                    .collect();
                let meta = self
                    .host
                    .install(PluginMetadata::new(plugin.as_str()), descriptors);
                Some(HostEvent::PluginLoaded(meta))
            }
            ConsoleCommand::Unload { plugin } => match self.host.uninstall(&plugin) {
                Some(meta) => Some(HostEvent::PluginUnloaded(meta)),
                None => {
                    warn!("Unknown plugin: {}", plugin);
                    None
                }
            },
            ConsoleCommand::Group { group_id, text } => Some(HostEvent::Message(
                MessageEvent::group(self.platform_id.as_str(), group_id)
                    .sender_id(CONSOLE_USER)
                    .message(text),
            )),
            ConsoleCommand::Private { user_id, text } => Some(HostEvent::Message(
                MessageEvent::private(self.platform_id.as_str(), user_id).message(text),
            )),
        }
    }
}

#[async_trait]
impl Adapter for ConsoleAdapter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn host(&self) -> Arc<dyn Host> {
        self.host.clone()
    }

    fn start(&mut self) -> Result<()> {
        let driver = self
            .driver
            .take()
            .ok_or_else(|| anyhow!("console adapter already started"))?;
        let outbound_rx = self
            .outbound_rx
            .take()
            .ok_or_else(|| anyhow!("console adapter already started"))?;

        let (inbound_tx, inbound_rx) = mpsc::channel(100);
        self.inbound_rx = Some(inbound_rx);

        self.driver_task = Some(tokio::spawn(async move {
            if let Err(e) = driver.run(inbound_tx, outbound_rx).await {
                error!("Console driver error: {:#}", e);
            }
        }));

        info!("Console adapter started");
        Ok(())
    }

    async fn next_event(&mut self) -> Option<HostEvent> {
        loop {
            let line = self.inbound_rx.as_mut()?.recv().await?;
            match parse_line(&line) {
                Ok(command) => {
                    if let Some(event) = self.apply(command) {
                        return Some(event);
                    }
                }
                Err(ParseError::Empty) => {}
                Err(e) => warn!("{}", e),
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        // the driver drains outbound until every sender is gone
        self.host.close_outbound();
        self.inbound_rx = None;

        if let Some(task) = self.driver_task.take() {
            task.await
                .map_err(|e| anyhow!("console driver task failed: {}", e))?;
        }
        info!("Console adapter stopped");
        Ok(())
    }
}
