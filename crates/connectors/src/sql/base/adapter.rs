use crate::sql::base::error::{ConnectorError, DbError};
use async_trait::async_trait;
use planner::query::dialect::{self, Dialect};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
}

impl DatabaseKind {
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DatabaseKind::MySql => &dialect::MySql,
            DatabaseKind::Postgres => &dialect::Postgres,
        }
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseKind::MySql),
            "pg" | "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            other => Err(format!("Unknown database driver: {other}")),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::MySql => write!(f, "mysql"),
            DatabaseKind::Postgres => write!(f, "postgres"),
        }
    }
}

/// Where and as whom to connect. Credentials given here take precedence over
/// any embedded in the URL.
#[derive(Clone, Default)]
pub struct ConnectOptions {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
pub trait SqlAdapter: Send {
    async fn connect(options: &ConnectOptions) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    /// Runs a statement that returns no rows.
    async fn exec(&mut self, sql: &str) -> Result<(), DbError>;

    /// Round-trips `SELECT 1`.
    async fn ping(&mut self) -> Result<(), DbError>;

    fn kind(&self) -> DatabaseKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_names() {
        assert_eq!("MySQL".parse::<DatabaseKind>(), Ok(DatabaseKind::MySql));
        assert_eq!("mariadb".parse::<DatabaseKind>(), Ok(DatabaseKind::MySql));
        assert_eq!("pg".parse::<DatabaseKind>(), Ok(DatabaseKind::Postgres));
        assert_eq!(
            " postgresql ".parse::<DatabaseKind>(),
            Ok(DatabaseKind::Postgres)
        );
        assert!("oracle".parse::<DatabaseKind>().is_err());
    }

    #[test]
    fn test_dialect_per_kind() {
        assert_eq!(DatabaseKind::MySql.dialect().name(), "MySQL");
        assert_eq!(DatabaseKind::Postgres.dialect().name(), "PostgreSQL");
    }

    #[test]
    fn test_connect_options_debug_hides_password() {
        let options = ConnectOptions {
            url: "postgres://localhost/db".into(),
            username: Some("app".into()),
            password: Some("s3cret".into()),
        };
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("***"));
    }
}
