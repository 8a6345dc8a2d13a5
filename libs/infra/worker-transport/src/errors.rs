// [libs/infra/worker-transport/src/errors.rs]
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("worker request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("worker rejected the call with status {0}")]
    WorkerRejected(u16),
}
