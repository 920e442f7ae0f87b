use crate::{commands::Side, error::CliError};
use connectors::adapter::Adapter;
use engine_config::settings::connection::ConnectionSettings;
use tracing::{error, info};

/// Connects to one configured database and runs `SELECT 1`.
pub async fn ping(settings: &ConnectionSettings, side: Side) -> Result<(), CliError> {
    let kind = settings.kind()?;
    info!("Pinging {kind} {side} database");

    let mut adapter = Adapter::connect(kind, &settings.connect_options())
        .await
        .map_err(|e| {
            error!("{kind} connection to {side} database failed: {e}");
            e
        })?;

    let result = adapter.ping().await;
    adapter.close().await;

    match result {
        Ok(()) => {
            info!("{kind} ping to {side} database succeeded");
            Ok(())
        }
        Err(e) => {
            error!("{kind} ping query on {side} database failed: {e}");
            Err(e.into())
        }
    }
}
