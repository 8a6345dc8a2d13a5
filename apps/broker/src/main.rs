// [apps/broker/src/main.rs]
use clap::Parser;
use zakuro_broker::prelude::{BrokerConfig, BrokerKernel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = BrokerConfig::parse();
    zakuro_telemetry::init_tracing("zakuro-broker");

    let kernel = BrokerKernel::ignite(config).await?;
    kernel.launch_mesh_operations().await
}
