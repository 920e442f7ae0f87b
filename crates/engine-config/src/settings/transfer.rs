use planner::query::builder::drop_partition::DEFAULT_PARTITION_NAME_FORMAT;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_FETCH_SIZE: usize = 1000;
pub const DEFAULT_COMMIT_SIZE: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct TransferSettings {
    #[serde(alias = "select-query")]
    pub select_query: String,

    /// Possibly schema-qualified (`schema.table`).
    #[serde(alias = "target-table")]
    pub target_table: String,

    /// Ordered insert columns, as a YAML list or a comma-separated string.
    #[serde(alias = "target-columns", deserialize_with = "column_list")]
    pub target_columns: Vec<String>,

    #[serde(alias = "fetch-size", default = "default_fetch_size")]
    pub fetch_size: usize,

    #[serde(alias = "commit-size", default = "default_commit_size")]
    pub commit_size: usize,

    #[serde(alias = "truncate-target-table", default)]
    pub truncate_target_table: bool,

    #[serde(alias = "drop-partition-before-insert", default)]
    pub drop_partition_before_insert: bool,

    /// strftime pattern naming the processing date's partition.
    #[serde(alias = "partition-name-format", default = "default_partition_name_format")]
    pub partition_name_format: String,
}

fn default_fetch_size() -> usize {
    DEFAULT_FETCH_SIZE
}

fn default_commit_size() -> usize {
    DEFAULT_COMMIT_SIZE
}

fn default_partition_name_format() -> String {
    DEFAULT_PARTITION_NAME_FORMAT.to_string()
}

fn column_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Columns {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Columns::deserialize(deserializer)? {
        Columns::List(columns) => columns,
        Columns::Csv(raw) => raw.split(',').map(|c| c.trim().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_from_comma_separated_string() {
        let settings: TransferSettings = serde_yaml::from_str(
            "select_query: SELECT 1\ntarget_table: t\ntarget_columns: \"a, b ,c\"\n",
        )
        .unwrap();
        assert_eq!(settings.target_columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_kebab_case_keys() {
        let settings: TransferSettings = serde_yaml::from_str(
            "select-query: SELECT 1\ntarget-table: t\ntarget-columns: [a]\nfetch-size: 50\ndrop-partition-before-insert: true\n",
        )
        .unwrap();
        assert_eq!(settings.fetch_size, 50);
        assert_eq!(settings.commit_size, DEFAULT_COMMIT_SIZE);
        assert!(settings.drop_partition_before_insert);
    }

    #[test]
    fn test_negative_sizes_are_rejected() {
        let result: Result<TransferSettings, _> = serde_yaml::from_str(
            "select_query: SELECT 1\ntarget_table: t\ntarget_columns: [a]\ncommit_size: -1\n",
        );
        assert!(result.is_err());
    }
}
