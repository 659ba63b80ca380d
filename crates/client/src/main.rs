use anyhow::Result;
use clap::Parser;

use velithra_client::cli::{self, Cli};
use velithra_client::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    velithra_observability::init();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    tracing::debug!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "client configured");

    let app = AppState::new(config)?;
    app.hydrate();

    cli::run(cli.command, &app).await
}
