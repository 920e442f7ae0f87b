use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    PgError(#[from] tokio_postgres::Error),

    /// MySQL driver error.
    #[error("MySQL error: {0}")]
    MySqlError(#[from] mysql_async::Error),

    /// A result column has a type the reader does not know how to carry.
    #[error("Unsupported type '{type_name}' for column '{column}'")]
    UnsupportedType { column: String, type_name: String },

    /// A value could not be bound to the target column's parameter type.
    #[error("Cannot convert {kind} value at position {index} to {target}")]
    Conversion {
        index: usize,
        kind: &'static str,
        target: String,
    },

    /// A row does not carry one value per statement parameter.
    #[error("Statement expects {expected} parameters but the row has {actual} values")]
    ParameterCount { expected: usize, actual: usize },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("PostgreSQL connection failed: {0}")]
    Connection(#[from] tokio_postgres::Error),

    #[error("MySQL connection failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] native_tls::Error),
}

/// Server-reported error details, independent of the driver that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerErrorInfo {
    /// Five-character SQLSTATE, when the server sent one.
    pub sql_state: Option<String>,
    /// Vendor error number (MySQL only).
    pub code: Option<u16>,
    pub message: String,
}

impl DbError {
    /// Extracts the server-side error code, if this error came from the server
    /// rather than from the client, the network or a conversion.
    pub fn server_error(&self) -> Option<ServerErrorInfo> {
        match self {
            DbError::PgError(err) => err.as_db_error().map(|db| ServerErrorInfo {
                sql_state: Some(db.code().code().to_string()),
                code: None,
                message: db.message().to_string(),
            }),
            DbError::MySqlError(mysql_async::Error::Server(server)) => Some(ServerErrorInfo {
                sql_state: Some(server.state.clone()),
                code: Some(server.code),
                message: server.message.clone(),
            }),
            _ => None,
        }
    }
}
