use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::event::HostEvent;
use crate::core::host::Host;

/// Adapter trait for host abstraction
///
/// An adapter encapsulates:
/// - Transport layer (driver)
/// - Protocol parsing into host events
/// - The host API plugins call back into
#[async_trait]
pub trait Adapter: Send + 'static {
    /// Adapter name (e.g., "console")
    fn name(&self) -> &'static str;

    /// The host plugins talk to
    fn host(&self) -> Arc<dyn Host>;

    /// Start the transport. Called once, before the first `next_event`.
    fn start(&mut self) -> Result<()>;

    /// Next host event, or `None` once the transport is closed.
    ///
    /// The runtime only asks for the next event after the previous one has
    /// been fully dispatched, so an adapter may update host state here.
    async fn next_event(&mut self) -> Option<HostEvent>;

    /// Flush pending output and stop the transport. Called once, after every
    /// plugin has been terminated.
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
