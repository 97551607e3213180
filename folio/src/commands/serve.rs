use anyhow::Context;
use folio_config::Config;
use folio_di::Provide;
use folio_email_contracts::EmailService;
use tracing::{error, info};

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email)?;
    email
        .ping()
        .await
        .context("Failed to connect to SMTP server")?;

    let config_provider = ConfigProvider::new(&config)?;
    let mut provider = Provider::new(config_provider, email);
    let server: RestServer = provider.provide();
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve(shutdown_signal()).await?;
    info!("Http server stopped");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(err) => {
            error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending().await
        }
    }
}
