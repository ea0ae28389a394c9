use std::sync::Arc;

use anyhow::{Error, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use whatsapp_notifier::{api::run_api_server, clients::rules::FileRuleRepository, config::Config};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let repository = Arc::new(FileRuleRepository::load(&config.rules_path)?);

    info!(
        enabled = config.whatsapp_enabled,
        rules_path = %config.rules_path,
        "Configuration validated. Notifier is ready to start."
    );

    run_api_server(config, repository).await
}
