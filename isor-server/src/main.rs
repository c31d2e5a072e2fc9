use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use isor_server::config::ServerConfig;
use isor_server::domain::PaintSchemes;
use isor_server::portal::PortalClient;
use isor_server::tracker::Tracker;
use isor_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let paint = match &config.colors_path {
        Some(path) => PaintSchemes::load(path)?,
        None => PaintSchemes::empty(),
    };
    info!(schemes = paint.len(), "loaded paint schemes");

    // Fail fast if the portal rejects the account
    info!(base_url = %config.portal.base_url, "logging in to portal");
    let portal = PortalClient::connect(config.portal.clone()).await?;

    let tracker = Tracker::new(portal, &config.limits, paint);
    let app = create_router(AppState::new(tracker, config.basic_auth.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "locomotive tracker listening");
    info!("  GET  /health");
    info!("  GET  /loco/{{number}}");
    info!("  POST /loco/{{number}}/refresh");
    info!("  GET  /train/{{number}}");
    info!("  POST /fleet");

    axum::serve(listener, app).await?;
    Ok(())
}
