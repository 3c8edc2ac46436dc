use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::core::driver::Driver;

/// In-memory driver for tests.
///
/// It pushes predefined inbound packets, then records outbound packets
/// until the outbound side closes.
pub struct MockDriver<I, O> {
    inbound_packets: Vec<I>,
    outbound: Arc<Mutex<Vec<O>>>,
}

impl<I, O> MockDriver<I, O> {
    pub fn new(inbound_packets: Vec<I>) -> Self {
        Self {
            inbound_packets,
            outbound: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of everything written out so far.
    pub fn outbound(&self) -> Arc<Mutex<Vec<O>>> {
        self.outbound.clone()
    }
}

#[async_trait::async_trait]
impl<I, O> Driver for MockDriver<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    type Inbound = I;
    type Outbound = O;

    async fn run(
        self: Box<Self>,
        inbound_tx: mpsc::Sender<Self::Inbound>,
        mut outbound_rx: mpsc::Receiver<Self::Outbound>,
    ) -> anyhow::Result<()> {
        let Self {
            inbound_packets,
            outbound,
        } = *self;

        for packet in inbound_packets {
            if inbound_tx.send(packet).await.is_err() {
                break;
            }
        }
        drop(inbound_tx);

        while let Some(packet) = outbound_rx.recv().await {
            outbound.lock().push(packet);
        }
        Ok(())
    }
}
