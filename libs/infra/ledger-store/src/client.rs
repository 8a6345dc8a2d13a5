// [libs/infra/ledger-store/src/client.rs]
use libsql::{Builder, Database};
use tracing::info;

use crate::errors::StoreError;
use crate::schema::apply_schema;

/// Wraps a libSQL database handle, remote (Turso) or local file, applying
/// the schema once on connect — mirrors the teacher's `TursoClient`
/// remote/local/memory detection.
pub struct SqlLedgerStore {
    database: Database,
}

impl SqlLedgerStore {
    pub async fn connect(database_url: &str, auth_token: Option<&str>) -> Result<Self, StoreError> {
        let database = if database_url.starts_with("libsql://") || database_url.starts_with("https://") {
            info!(url = database_url, "connecting to remote ledger store");
            Builder::new_remote(database_url.to_string(), auth_token.unwrap_or_default().to_string())
                .build()
                .await
                .map_err(StoreError::Connect)?
        } else if database_url == ":memory:" {
            info!("connecting to in-memory ledger store");
            Builder::new_local(":memory:")
                .build()
                .await
                .map_err(StoreError::Connect)?
        } else {
            info!(path = database_url, "connecting to local ledger store");
            Builder::new_local(database_url)
                .build()
                .await
                .map_err(StoreError::Connect)?
        };

        let store = Self { database };
        let conn = store.database.connect().map_err(StoreError::Connect)?;
        apply_schema(&conn).await?;
        Ok(store)
    }

    pub fn connection(&self) -> Result<libsql::Connection, StoreError> {
        self.database.connect().map_err(StoreError::Connect)
    }
}
