use tokio::sync::mpsc;

/// Driver trait for transport layer abstraction.
///
/// Implementors only move raw packets: inbound packets go to `inbound_tx`,
/// packets received on `outbound_rx` are written out.
#[async_trait::async_trait]
pub trait Driver: Send + Sync + 'static {
    type Inbound: Send + 'static;
    type Outbound: Send + 'static;

    async fn run(
        self: Box<Self>,
        inbound_tx: mpsc::Sender<Self::Inbound>,
        outbound_rx: mpsc::Receiver<Self::Outbound>,
    ) -> anyhow::Result<()>;
}
