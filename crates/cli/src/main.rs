use crate::{commands::Side, error::CliError, exit::ExitCode};
use chrono::{Local, NaiveDate};
use clap::Parser;
use commands::Commands;
use connectors::adapter::Adapter;
use engine_config::{env::EnvManager, settings::DataTransferConfig};
use engine_core::{plan::TransferPlan, transfer::TransferJob};
use serde::Serialize;
use tracing::{error, info};

mod commands;
mod conn;
mod error;
mod exit;
mod logger;
mod output;

#[derive(Parser)]
#[command(
    name = "db-transfer",
    version = "0.1.0",
    about = "Copies the result of a query from one database into a table of another"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Log at debug level")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match dispatch(cli.command).await {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            error!("{err}");
            err.exit_code().into()
        }
    }
}

async fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run {
            config,
            env_file,
            report,
        } => {
            let config = load_config(&config, env_file.as_deref())?;
            run_transfer(&config, report.as_deref(), Local::now().date_naive()).await
        }
        Commands::Validate {
            config,
            env_file,
            output,
        } => {
            info!("Validating transfer config: {config}");
            let config = load_config(&config, env_file.as_deref())?;
            let summary = ValidationSummary::build(&config, Local::now().date_naive())?;

            match output {
                Some(path) => output::write_json(&summary, &path).await,
                None => output::print_json(&summary),
            }
        }
        Commands::TestConn {
            config,
            env_file,
            side,
        } => {
            let config = load_config(&config, env_file.as_deref())?;
            let settings = match side {
                Side::Source => &config.source_db,
                Side::Target => &config.target_db,
            };
            conn::ping(settings, side).await
        }
    }
}

/// Process environment first, then the env file on top of it.
fn load_config(path: &str, env_file: Option<&str>) -> Result<DataTransferConfig, CliError> {
    let mut env = EnvManager::from_process();
    if let Some(env_file) = env_file {
        env.load_from_file(env_file)?;
    }
    Ok(DataTransferConfig::load(path, &env)?)
}

async fn run_transfer(
    config: &DataTransferConfig,
    report_path: Option<&str>,
    processing_date: NaiveDate,
) -> Result<(), CliError> {
    let source_kind = config.source_db.kind()?;
    let target_kind = config.target_db.kind()?;
    info!(
        source = %source_kind,
        target = %target_kind,
        table = %config.transfer.target_table,
        "Data transfer application started."
    );

    let mut source = Adapter::connect(source_kind, &config.source_db.connect_options()).await?;
    let mut target =
        match Adapter::connect(target_kind, &config.target_db.connect_options()).await {
            Ok(target) => target,
            Err(err) => {
                source.close().await;
                return Err(err.into());
            }
        };

    let outcome = match TransferJob::new(
        &mut source,
        &mut target,
        &config.transfer,
        processing_date,
    ) {
        Ok(job) => job.run().await,
        Err(err) => Err(err),
    };

    source.close().await;
    target.close().await;

    let report = outcome?;
    if let Some(path) = report_path {
        output::write_json(&report, path).await?;
        info!("Report written to {path}");
    }

    Ok(())
}

/// What `validate` prints: the resolved drivers and every statement a run
/// would issue against the target today.
#[derive(Debug, Serialize)]
struct ValidationSummary {
    source_driver: String,
    target_driver: String,
    fetch_size: usize,
    commit_size: usize,
    plan: TransferPlan,
}

impl ValidationSummary {
    fn build(config: &DataTransferConfig, processing_date: NaiveDate) -> Result<Self, CliError> {
        let source_driver = config.source_db.kind()?;
        let target_driver = config.target_db.kind()?;
        let plan = TransferPlan::build(&config.transfer, target_driver.dialect(), processing_date)?;

        Ok(Self {
            source_driver: source_driver.to_string(),
            target_driver: target_driver.to_string(),
            fetch_size: config.transfer.fetch_size,
            commit_size: config.transfer.commit_size,
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
source_db:
  url: mysql://reader@src-host/sales
target_db:
  url: postgres://writer@dst-host/warehouse
  password: ${TARGET_PASSWORD}
transfer:
  select_query: SELECT id, amount FROM orders
  target_table: staging.orders
  target_columns: [id, amount]
  commit_size: 500
  truncate_target_table: true
"#;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::parse_from([
            "db-transfer",
            "run",
            "--config",
            "transfer.yaml",
            "--report",
            "out.json",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                config,
                env_file,
                report,
            } => {
                assert_eq!(config, "transfer.yaml");
                assert_eq!(env_file, None);
                assert_eq!(report.as_deref(), Some("out.json"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_parses_test_conn_side() {
        let cli = Cli::parse_from([
            "db-transfer",
            "test-conn",
            "--config",
            "transfer.yaml",
            "--side",
            "target",
        ]);
        match cli.command {
            Commands::TestConn { side, .. } => assert_eq!(side, Side::Target),
            _ => panic!("expected test-conn"),
        }
    }

    #[test]
    fn test_load_config_with_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "transfer.yaml", CONFIG);
        let env_file = write_file(&dir, ".env", "TARGET_PASSWORD=from-file\n");

        let config = load_config(&config, Some(&env_file)).unwrap();
        assert_eq!(config.target_db.password.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_config_maps_to_config_exit_code() {
        let err = load_config("/definitely/not/here.yaml", None).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), ExitCode::ConfigError);
    }

    #[test]
    fn test_validation_summary_uses_target_dialect() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "transfer.yaml", CONFIG);
        let env_file = write_file(&dir, ".env", "TARGET_PASSWORD=x\n");
        let config = load_config(&config, Some(&env_file)).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let summary = ValidationSummary::build(&config, date).unwrap();

        assert_eq!(summary.source_driver, "mysql");
        assert_eq!(summary.target_driver, "postgres");
        assert_eq!(summary.commit_size, 500);
        assert_eq!(
            summary.plan.insert_sql,
            "INSERT INTO staging.orders (id, amount) VALUES ($1, $2)"
        );
        assert_eq!(
            summary.plan.truncate_sql.as_deref(),
            Some("TRUNCATE TABLE staging.orders")
        );
    }
}
