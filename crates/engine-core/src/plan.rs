//! Statements a transfer run issues against the target, rendered once up front.

use chrono::NaiveDate;
use engine_config::settings::transfer::TransferSettings;
use planner::{
    error::PlanError,
    query::{
        ast::{common::TableRef, truncate::Truncate},
        builder::{drop_partition::DropPartitionBuilder, insert::InsertBuilder},
        dialect::Dialect,
        renderer::render_sql,
    },
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionPlan {
    pub name: String,
    pub date: NaiveDate,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferPlan {
    pub dialect: String,
    pub target_table: String,
    pub column_count: usize,
    /// Single-row template, executed once per row of every batch.
    pub insert_sql: String,
    pub truncate_sql: Option<String>,
    pub partition: Option<PartitionPlan>,
}

impl TransferPlan {
    pub fn build(
        settings: &TransferSettings,
        dialect: &dyn Dialect,
        processing_date: NaiveDate,
    ) -> Result<Self, PlanError> {
        let table = TableRef::parse(&settings.target_table);

        let insert = InsertBuilder::new(table.clone())
            .columns(&settings.target_columns)
            .build()?;
        let column_count = insert.columns.len();
        let insert_sql = render_sql(&insert, dialect);

        let truncate_sql = settings.truncate_target_table.then(|| {
            render_sql(
                &Truncate {
                    table: table.clone(),
                },
                dialect,
            )
        });

        let partition = if settings.drop_partition_before_insert {
            let ast = DropPartitionBuilder::new(table.clone(), processing_date)
                .name_format(&settings.partition_name_format)
                .build()?;
            Some(PartitionPlan {
                sql: render_sql(&ast, dialect),
                name: ast.partition,
                date: ast.date,
            })
        } else {
            None
        };

        Ok(TransferPlan {
            dialect: dialect.name(),
            target_table: table.to_string(),
            column_count,
            insert_sql,
            truncate_sql,
            partition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner::query::dialect::{MySql, Postgres};

    fn settings() -> TransferSettings {
        TransferSettings {
            select_query: "SELECT a, b FROM src".into(),
            target_table: "sales.orders".into(),
            target_columns: vec!["a".into(), "b".into()],
            fetch_size: 100,
            commit_size: 100,
            truncate_target_table: true,
            drop_partition_before_insert: true,
            partition_name_format: "p%Y%m%d".into(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_build_postgres_plan() {
        let plan = TransferPlan::build(&settings(), &Postgres, date()).unwrap();
        assert_eq!(
            plan.insert_sql,
            "INSERT INTO sales.orders (a, b) VALUES ($1, $2)"
        );
        assert_eq!(
            plan.truncate_sql.as_deref(),
            Some("TRUNCATE TABLE sales.orders")
        );
        let partition = plan.partition.unwrap();
        assert_eq!(partition.name, "p20240131");
        assert_eq!(partition.sql, "DROP TABLE sales.orders_p20240131");
        assert_eq!(plan.column_count, 2);
        assert_eq!(plan.target_table, "sales.orders");
    }

    #[test]
    fn test_build_mysql_plan() {
        let plan = TransferPlan::build(&settings(), &MySql, date()).unwrap();
        assert_eq!(
            plan.insert_sql,
            "INSERT INTO sales.orders (a, b) VALUES (?, ?)"
        );
        assert_eq!(
            plan.partition.unwrap().sql,
            "ALTER TABLE sales.orders DROP PARTITION p20240131"
        );
    }

    #[test]
    fn test_configured_names_keep_their_case() {
        let mut settings = settings();
        settings.target_table = "Sales.Orders".into();
        settings.target_columns = vec!["ID".into(), "Amount".into()];

        let plan = TransferPlan::build(&settings, &Postgres, date()).unwrap();
        assert_eq!(
            plan.insert_sql,
            "INSERT INTO Sales.Orders (ID, Amount) VALUES ($1, $2)"
        );
        assert_eq!(
            plan.partition.unwrap().sql,
            "DROP TABLE Sales.Orders_p20240131"
        );

        settings.target_table = r#""Sales"."Orders""#.into();
        let plan = TransferPlan::build(&settings, &Postgres, date()).unwrap();
        assert_eq!(
            plan.truncate_sql.as_deref(),
            Some(r#"TRUNCATE TABLE "Sales"."Orders""#)
        );
    }

    #[test]
    fn test_optional_steps_are_omitted() {
        let mut settings = settings();
        settings.truncate_target_table = false;
        settings.drop_partition_before_insert = false;
        let plan = TransferPlan::build(&settings, &MySql, date()).unwrap();
        assert!(plan.truncate_sql.is_none());
        assert!(plan.partition.is_none());
    }

    #[test]
    fn test_empty_columns_fail() {
        let mut settings = settings();
        settings.target_columns.clear();
        assert!(matches!(
            TransferPlan::build(&settings, &Postgres, date()),
            Err(PlanError::NoColumns(_))
        ));
    }
}
