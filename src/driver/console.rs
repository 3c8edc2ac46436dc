use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::driver::Driver;

/// Reads lines from stdin and prints outgoing packets.
pub struct ConsoleDriver {
    banner: String,
    output_format: String,
}

impl ConsoleDriver {
    pub fn new(banner: impl Into<String>, output_format: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            output_format: output_format.into(),
        }
    }

    fn render(&self, content: &str) -> String {
        self.output_format.replace("{}", content)
    }
}

#[async_trait::async_trait]
impl Driver for ConsoleDriver {
    type Inbound = String;
    type Outbound = String;

    async fn run(
        self: Box<Self>,
        inbound_tx: mpsc::Sender<Self::Inbound>,
        mut outbound_rx: mpsc::Receiver<Self::Outbound>,
    ) -> Result<()> {
        if !self.banner.is_empty() {
            println!("{}", self.banner);
        }

        let mut reader = io::BufReader::new(io::stdin()).lines();

        loop {
            tokio::select! {
                line = reader.next_line() => {
                    match line? {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => {
                            if inbound_tx.send(line).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Some(out) = outbound_rx.recv() => {
                    println!("{}", self.render(&out));
                }
            }
        }

        info!("Console input closed");
        // still print whatever the last events produce
        drop(inbound_tx);
        while let Some(out) = outbound_rx.recv().await {
            println!("{}", self.render(&out));
        }
        debug!("Console output closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_wraps_content() {
        let driver = ConsoleDriver::new("", "> {}");
        assert_eq!(driver.render("hello"), "> hello");
    }
}
