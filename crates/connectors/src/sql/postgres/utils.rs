use crate::sql::base::{adapter::ConnectOptions, error::ConnectorError};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode};
use tracing::{error, warn};

pub(crate) async fn connect_client(options: &ConnectOptions) -> Result<Client, ConnectorError> {
    let config = build_config(options)?;
    let ssl_mode = config.get_ssl_mode();

    match ssl_mode {
        SslMode::Disable => connect_without_tls(config).await,
        SslMode::Require => connect_with_tls(config).await,
        SslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

/// Parses the URL and lays explicit credentials over the ones it carries.
pub(crate) fn build_config(options: &ConnectOptions) -> Result<Config, ConnectorError> {
    let mut config = options
        .url
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

    if let Some(user) = options.username.as_deref() {
        config.user(user);
    }
    if let Some(password) = options.password.as_deref() {
        config.password(password);
    }

    Ok(config)
}

pub(crate) async fn connect_with_tls(config: Config) -> Result<Client, ConnectorError> {
    let connector = TlsConnector::builder().build()?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

pub(crate) async fn connect_without_tls(config: Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

/// Server-side cursors cannot be declared over a statement that ends in `;`.
pub(crate) fn strip_statement_terminator(query: &str) -> &str {
    query.trim().trim_end_matches(';').trim_end()
}
