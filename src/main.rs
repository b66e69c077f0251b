//! Record Keeper service entry point
//!
//! Loads `.env`, sets up logging, reads the service configuration and serves
//! the patient and student APIs until Ctrl-C.

use anyhow::Result;
use record_keeper::{server, utils, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    utils::init_tracing()?;

    let config = ServiceConfig::from_env()?;
    info!("Record keeper v{}", env!("CARGO_PKG_VERSION"));

    server::run_server(config).await
}
