// [apps/broker/src/state.rs]
use std::sync::Arc;

use zakuro_affinity::AffinityTable;
use zakuro_ledger::CreditLedger;
use zakuro_ledger_store::SqlLedgerStore;
use zakuro_registry::WorkerRegistry;
use zakuro_selector::RoundRobinCounter;
use zakuro_worker_transport::WorkerTransport;

use crate::config::BrokerConfig;

/// The broker's full in-process state, wired once at startup and cloned
/// (cheaply, via `Arc`) into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BrokerConfig>,
    pub registry: Arc<WorkerRegistry>,
    pub ledger: Arc<CreditLedger>,
    pub affinity: Arc<AffinityTable>,
    pub transport: Arc<WorkerTransport>,
    pub round_robin: Arc<RoundRobinCounter>,
    pub store: Option<Arc<SqlLedgerStore>>,
}

impl AppState {
    pub async fn bootstrap(config: BrokerConfig) -> anyhow::Result<Self> {
        let store = match &config.database_url {
            Some(url) => {
                let store =
                    SqlLedgerStore::connect(url, config.turso_auth_token.as_deref()).await?;
                Some(Arc::new(store))
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(WorkerRegistry::new()),
            ledger: Arc::new(CreditLedger::new()),
            affinity: Arc::new(AffinityTable::new()),
            transport: Arc::new(WorkerTransport::new()),
            round_robin: Arc::new(RoundRobinCounter::new()),
            store,
        })
    }

    pub fn local_mode(&self) -> bool {
        self.store.is_none()
    }
}
