// [apps/broker/src/config.rs]
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "zakuro-broker")]
pub struct BrokerConfig {
    #[arg(long, env = "PORT", default_value_t = 9000)]
    pub port: u16,

    #[arg(long, env = "ZAKURO_PEERS", default_value = "")]
    pub peers: String,

    #[arg(long, env = "ZAKURO_P2P", default_value_t = false)]
    pub p2p_enabled: bool,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "TURSO_AUTH_TOKEN")]
    pub turso_auth_token: Option<String>,

    #[arg(long, env = "WORKER_AUTH_TOKEN")]
    pub worker_auth_token: Option<String>,

    #[arg(long, env = "ZAKURO_DISCOVERY_INTERVAL_SECS", default_value_t = 5)]
    pub discovery_interval_secs: u64,

    #[arg(long, env = "ZAKURO_RESERVATION_TTL_SECS", default_value_t = 300)]
    pub reservation_ttl_secs: u64,

    #[arg(long, env = "ZAKURO_INSTANCE_TTL_SECS", default_value_t = 1800)]
    pub instance_ttl_secs: u64,

    #[arg(long, env = "ZAKURO_WORKER_EXPIRE_SECS", default_value_t = 300)]
    pub worker_expire_secs: u64,
}

impl BrokerConfig {
    pub fn peer_list(&self) -> Vec<String> {
        self.peers
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
