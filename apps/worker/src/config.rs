// [apps/worker/src/config.rs]
use clap::Parser;

/// Worker configuration, sourced from `ZAKURO_*` environment variables
/// with the same names and defaults as the original worker process.
#[derive(Parser, Debug, Clone)]
#[command(name = "zakuro-worker")]
pub struct WorkerConfig {
    #[arg(long, env = "ZAKURO_WORKER_NAME")]
    pub worker_name: Option<String>,

    #[arg(long, env = "ZAKURO_WORKER_TYPE", default_value = "cpu")]
    pub worker_type: String,

    #[arg(long, env = "ZAKURO_CPU_PRICE", default_value = "0.001")]
    pub cpu_price: f64,

    #[arg(long, env = "ZAKURO_MEMORY_PRICE", default_value = "0.0001")]
    pub memory_price: f64,

    #[arg(long, env = "ZAKURO_GPU_PRICE", default_value = "0.01")]
    pub gpu_price: f64,

    #[arg(long, env = "ZAKURO_MIN_CHARGE", default_value = "0.0001")]
    pub min_charge: f64,

    #[arg(long, env = "ZAKURO_WORKER_TAGS", default_value = "")]
    pub worker_tags: String,

    #[arg(long, env = "ZAKURO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "ZAKURO_PORT", default_value_t = 3960)]
    pub port: u16,
}

impl WorkerConfig {
    pub fn resolved_name(&self) -> String {
        self.worker_name.clone().unwrap_or_else(|| {
            let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
            format!("worker-{hostname}")
        })
    }

    pub fn tags(&self) -> Vec<String> {
        self.worker_tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}
