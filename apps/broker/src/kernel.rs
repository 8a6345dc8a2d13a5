// [apps/broker/src/kernel.rs]
//! Composition root for the broker process: connects state, spawns the
//! background daemons, then serves the HTTP façade. Mirrors the
//! teacher's `ignite` + `launch` sequencing.

use std::time::Duration;

use tracing::info;

use crate::config::BrokerConfig;
use crate::routes::build_router;
use crate::services::{spawn_affinity_janitor, spawn_discovery_loop, spawn_registry_reaper};
use crate::state::AppState;

pub struct BrokerKernel {
    port: u16,
    state: AppState,
}

impl BrokerKernel {
    pub async fn ignite(config: BrokerConfig) -> anyhow::Result<Self> {
        let port = config.port;

        if config.worker_auth_token.is_none() {
            tracing::warn!(
                "WORKER_AUTH_TOKEN not set: bearer tokens are parsed for user identity but never \
                 cryptographically verified (see spec design note (c))"
            );
        }

        let state = AppState::bootstrap(config).await?;
        info!(local_mode = state.local_mode(), "broker state bootstrapped");

        Ok(Self { port, state })
    }

    pub async fn launch_mesh_operations(self) -> anyhow::Result<()> {
        spawn_discovery_loop(self.state.clone());
        spawn_registry_reaper(self.state.clone());
        spawn_affinity_janitor(self.state.clone());
        zakuro_ledger::sweeper::spawn_reservation_sweeper(
            self.state.ledger.clone(),
            Duration::from_secs(self.state.config.reservation_ttl_secs),
            Duration::from_secs(30),
        );

        let router = build_router(self.state.clone());
        let bind_address = format!("0.0.0.0:{}", self.port);
        info!(address = bind_address, "broker listening");

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }
}
