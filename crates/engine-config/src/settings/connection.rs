use crate::error::ConfigError;
use connectors::sql::base::adapter::{ConnectOptions, DatabaseKind};
use serde::Deserialize;
use std::fmt;

/// Connection parameters for one side of the transfer.
#[derive(Clone, Deserialize)]
pub struct ConnectionSettings {
    /// `postgres`, `mysql` and their aliases. Inferred from the URL scheme when absent.
    #[serde(default)]
    pub driver: Option<String>,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectionSettings {
    pub fn kind(&self) -> Result<DatabaseKind, ConfigError> {
        let driver = match self.driver.as_deref() {
            Some(driver) => driver,
            None => self
                .url
                .split_once("://")
                .map(|(scheme, _)| scheme)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "no driver given and no scheme in url '{}'",
                        self.url
                    ))
                })?,
        };
        driver.parse::<DatabaseKind>().map_err(ConfigError::Invalid)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
