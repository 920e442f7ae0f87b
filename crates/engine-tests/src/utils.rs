use crate::url_for;
use chrono::{Local, NaiveDate};
use connectors::sql::base::adapter::DatabaseKind;

/// `n` rows of `(id, name)` generated by a MySQL recursive CTE; ids start at 1.
pub fn mysql_sequence_query(n: usize) -> String {
    format!(
        "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < {n}) \
         SELECT n AS id, CONCAT('name-', n) AS name FROM seq"
    )
}

/// Same shape as [`mysql_sequence_query`], generated by PostgreSQL.
pub fn pg_sequence_query(n: usize) -> String {
    format!("SELECT n AS id, 'name-' || n AS name FROM generate_series(1, {n}) AS n")
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Name of today's partition with the default `p%Y%m%d` format.
pub fn today_partition() -> String {
    today().format("p%Y%m%d").to_string()
}

/// Builds a config document for one transfer; `transfer` holds the body of
/// the `transfer:` section, already indented by four spaces.
pub fn transfer_yaml(source: DatabaseKind, target: DatabaseKind, transfer: &str) -> String {
    format!(
        r#"
data_transfer:
  source_db:
    driver: {source}
    url: "{source_url}"
  target_db:
    driver: {target}
    url: "{target_url}"
  transfer:
{transfer}
"#,
        source_url = url_for(source),
        target_url = url_for(target),
    )
}
