use std::path::Path;
use std::sync::Arc;

use alteration_notifier::prelude::*;
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Load config
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let store = if Path::new(&path).exists() {
        ConfigStore::from_file(&path)?
    } else {
        warn!("Config file {} not found, using defaults", path);
        ConfigStore::empty()
    };

    // 3. Build the notifier and the console host it lives in
    let notifier = Arc::new(AlterationNotifier::from_store(&store)?);
    let console_config: ConsoleConfig = store.get()?;
    let adapter = ConsoleAdapter::new(&console_config);
    adapter.memory_host().install(notifier.meta(), Vec::new());

    info!(
        "Notifier {} ready, exclude_mode = {}",
        notifier.config().self_name,
        notifier.config().role_range.exclude_mode
    );

    // 4. Run until stdin closes
    Runtime::new().plugin_arc(notifier).run(adapter).await
}
