use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use server::{AdmissionService, ServiceConfig, http};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ServiceConfig::from_env()?;
    let service =
        AdmissionService::from_config(&config).context("cannot set up authentication")?;

    if !service.model_loaded() {
        warn!("inference is disabled until a valid model is deployed");
    }

    let app = http::router(Arc::new(service), config.request_timeout());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    info!("listening at {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;

    info!("wrapping up, bye");
    Ok(())
}

async fn shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received SIGINT, draining connections"),
        Err(e) => {
            warn!("cannot listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    }
}
