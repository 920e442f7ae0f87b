//! The transfer job's configuration document.

pub mod connection;
pub mod transfer;

use crate::{
    env::EnvManager,
    error::ConfigError,
    settings::{connection::ConnectionSettings, transfer::TransferSettings},
    validation,
};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::path::Path;
use tracing::debug;

/// Root of the configuration file. The document may also be nested under a
/// single `data_transfer` key.
#[derive(Debug, Clone, Deserialize)]
pub struct DataTransferConfig {
    #[serde(alias = "source-db")]
    pub source_db: ConnectionSettings,
    #[serde(alias = "target-db")]
    pub target_db: ConnectionSettings,
    pub transfer: TransferSettings,
}

const ROOT_KEYS: [&str; 2] = ["data_transfer", "data-transfer"];

impl DataTransferConfig {
    /// Reads, expands and validates the configuration at `path`.
    pub fn load<P: AsRef<Path>>(path: P, env: &EnvManager) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_yaml(&content, env)
    }

    pub fn from_yaml(yaml: &str, env: &EnvManager) -> Result<Self, ConfigError> {
        let mut doc: YamlValue = serde_yaml::from_str(yaml)?;
        if let Some(inner) = ROOT_KEYS.iter().find_map(|key| doc.get(*key)).cloned() {
            doc = inner;
        }

        expand_strings(&mut doc, "", env)?;
        let config: DataTransferConfig = serde_yaml::from_value(doc)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

/// Expands `${NAME}` in every string scalar, leaving keys and non-string
/// scalars untouched.
fn expand_strings(node: &mut YamlValue, path: &str, env: &EnvManager) -> Result<(), ConfigError> {
    match node {
        YamlValue::String(s) => *s = env.expand(s, path)?,
        YamlValue::Sequence(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                expand_strings(item, &format!("{path}[{i}]"), env)?;
            }
        }
        YamlValue::Mapping(map) => {
            for (key, value) in map.iter_mut() {
                let key = key.as_str().unwrap_or("?");
                let child = if path.is_empty() {
                    key.to_string()
                } else {
                    format!("{path}.{key}")
                };
                expand_strings(value, &child, env)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::sql::base::adapter::DatabaseKind;
    use std::io::Write;

    const YAML: &str = r#"
source_db:
  driver: mysql
  url: "mysql://${SRC_HOST}:3306/crm"
  username: reader
  password: "${SRC_PASS}"
target_db:
  url: "postgres://dw:5432/warehouse"
transfer:
  select_query: "SELECT id, name FROM customers"
  target_table: "staging.customers"
  target_columns: [id, name]
  commit_size: 500
  truncate_target_table: true
"#;

    fn env() -> EnvManager {
        EnvManager::from_vars([("SRC_HOST", "crm-db"), ("SRC_PASS", "s3cret")])
    }

    #[test]
    fn test_from_yaml_expands_and_applies_defaults() {
        let config = DataTransferConfig::from_yaml(YAML, &env()).unwrap();

        assert_eq!(config.source_db.url, "mysql://crm-db:3306/crm");
        assert_eq!(config.source_db.password.as_deref(), Some("s3cret"));
        assert_eq!(config.source_db.kind().unwrap(), DatabaseKind::MySql);
        assert_eq!(config.target_db.kind().unwrap(), DatabaseKind::Postgres);

        let transfer = &config.transfer;
        assert_eq!(transfer.target_columns, vec!["id", "name"]);
        assert_eq!(transfer.fetch_size, 1000);
        assert_eq!(transfer.commit_size, 500);
        assert!(transfer.truncate_target_table);
        assert!(!transfer.drop_partition_before_insert);
        assert_eq!(transfer.partition_name_format, "p%Y%m%d");
    }

    #[test]
    fn test_from_yaml_accepts_nested_root() {
        let nested = format!(
            "data_transfer:\n{}",
            YAML.lines()
                .map(|l| format!("  {l}\n"))
                .collect::<String>()
        );
        let config = DataTransferConfig::from_yaml(&nested, &env()).unwrap();
        assert_eq!(config.transfer.target_table, "staging.customers");
    }

    #[test]
    fn test_from_yaml_missing_env_var_names_field() {
        let env = EnvManager::from_vars([("SRC_HOST", "crm-db")]);
        match DataTransferConfig::from_yaml(YAML, &env).unwrap_err() {
            ConfigError::MissingEnvVar { name, field } => {
                assert_eq!(name, "SRC_PASS");
                assert_eq!(field, "source_db.password");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_yaml_runs_validation() {
        let yaml = YAML.replace("commit_size: 500", "commit_size: 0");
        assert!(matches!(
            DataTransferConfig::from_yaml(&yaml, &env()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_yaml_rejects_missing_section() {
        let yaml = "source_db: { driver: mysql, url: 'mysql://h/db' }\n";
        assert!(matches!(
            DataTransferConfig::from_yaml(yaml, &env()),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let config = DataTransferConfig::load(file.path(), &env()).unwrap();
        assert_eq!(config.source_db.username.as_deref(), Some("reader"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            DataTransferConfig::load("/definitely/not/here.yaml", &env()),
            Err(ConfigError::Io { .. })
        ));
    }
}
