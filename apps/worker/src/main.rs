// [apps/worker/src/main.rs]
use clap::Parser;
use zakuro_worker::prelude::{WorkerConfig, WorkerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::parse();
    zakuro_telemetry::init_tracing("zakuro-worker");

    let name = config.resolved_name();
    let host = config.host.clone();
    let port = config.port;

    let state = WorkerState::new(config);
    let app = zakuro_worker::router(state);

    let bind_address = format!("{host}:{port}");
    tracing::info!(worker = name, address = bind_address, "worker node starting");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
