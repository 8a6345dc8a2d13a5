// [libs/infra/ledger-store/src/errors.rs]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connect(#[source] libsql::Error),
    #[error("query failed: {0}")]
    Query(#[source] libsql::Error),
}
