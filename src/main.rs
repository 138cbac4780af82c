use anyhow::Result;
use tracing::info;

use tessera_uci::UciEngine;

fn main() -> Result<()> {
    // Stdout carries the UCI protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    info!("tessera starting");
    UciEngine::new().run()?;
    Ok(())
}
