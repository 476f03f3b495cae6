//! Shared Redis connection construction.

use redis::aio::ConnectionManager;
use redis::Client;

use crate::domain::error::StoreError;
use crate::domain::models::config::StoreConfig;

/// Builds a `ConnectionManager` from worker `StoreConfig`, shared by the
/// job queue and result store adapters so both ride one reconnecting
/// connection rather than opening a socket each.
pub async fn connect(config: &StoreConfig) -> Result<ConnectionManager, StoreError> {
    let url = connection_url(config);
    let client =
        Client::open(url).map_err(|err| StoreError::Unreachable(err.to_string()))?;
    client
        .get_connection_manager()
        .await
        .map_err(|err| StoreError::Unreachable(err.to_string()))
}

fn connection_url(config: &StoreConfig) -> String {
    if let Some(socket) = &config.socket {
        return format!("redis+unix://{socket}?db={}", config.db);
    }

    let auth = config
        .pass
        .as_ref()
        .map(|pass| format!(":{pass}@"))
        .unwrap_or_default();
    format!("redis://{auth}{}/{}", config.host, config.db)
}
