//! Oficio API server entry point
//!
//! Configuration comes from environment variables; a `.env` file is honored
//! in development.

use anyhow::Context;
use oficio_common::{try_init_tracing, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let config = AppConfig::from_env().context("loading configuration")?;
    info!(
        env = ?config.app.env,
        port = config.api.port,
        "Starting Oficio API server"
    );

    oficio_api::run(config).await.context("running server")?;

    Ok(())
}
