// [libs/infra/worker-transport/src/lib.rs]
//! The broker's only outbound HTTP client: probes worker `/info` and
//! `/health`, and forwards opaque `/execute` blobs while preserving
//! content-type and measuring wall-clock duration for settlement.

mod errors;
mod wire;

pub use errors::TransportError;
pub use wire::{WireHardware, WirePricing, WireResources, WorkerInfoResponse};

use std::time::{Duration, Instant};

use reqwest::Client;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const EXECUTE_READ_TIMEOUT: Duration = Duration::from_secs(300);
const EXECUTE_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WorkerTransport {
    client: Client,
}

impl Default for WorkerTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("zakuro-broker/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(EXECUTE_CONNECT_TIMEOUT)
            .build()
            .expect("static client configuration is always valid");
        Self { client }
    }

    /// Probes `/info`; returns the decoded body and the observed
    /// round-trip time, used to update the registry's EWMA latency.
    pub async fn probe_info(
        &self,
        endpoint: &str,
    ) -> Result<(WorkerInfoResponse, Duration), TransportError> {
        let url = format!("http://{endpoint}/info");
        let start = Instant::now();
        let response = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let body = response.json::<WorkerInfoResponse>().await?;
        Ok((body, start.elapsed()))
    }

    pub async fn probe_health(&self, endpoint: &str) -> Result<(), TransportError> {
        let url = format!("http://{endpoint}/health");
        self.client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Forwards the opaque blob unchanged and returns the worker's bytes
    /// plus the wall-clock duration the broker observed — the
    /// authoritative duration for settlement (spec resolves the source's
    /// ambiguity in favor of broker-observed timing).
    pub async fn forward_execute(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(Vec<u8>, Duration), TransportError> {
        let url = format!("http://{endpoint}/execute");
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .timeout(EXECUTE_READ_TIMEOUT)
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let duration = start.elapsed();

        if !status.is_success() {
            return Err(TransportError::WorkerRejected(status.as_u16()));
        }

        Ok((bytes.to_vec(), duration))
    }
}
