//! Profit-sharing check run CLI.
//!
//! Generates print files from a JSON request and manages the run workflow
//! for a profit year.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use checkrun_core::{
    CheckBatchGenerator, CheckPrintRequest, CheckRunPolicy, RunWorkflowManager, SystemClock,
};
use checkrun_db::{collaborators, connect_with};
use checkrun_shared::{AppConfig, AppError, AppResult, CheckRunId};

#[derive(Debug, Parser)]
#[command(name = "checkrun", version, about = "Profit-sharing check runs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue checks for a request and write the print file.
    Generate {
        /// JSON file holding the print request.
        #[arg(long)]
        request: PathBuf,
        /// Directory the print file is written to.
        #[arg(long, env = "CHECKRUN_OUTPUT_DIR", default_value = ".")]
        output_dir: PathBuf,
    },
    /// Show the active run for a profit year.
    Current {
        #[arg(long)]
        profit_year: i32,
    },
    /// Record completion of a workflow step.
    CompleteStep {
        #[arg(long)]
        run_id: Uuid,
        #[arg(long)]
        step: i32,
        #[arg(long, env = "USER")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkrun=info,checkrun_core=info,checkrun_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let policy = CheckRunPolicy::from(&config.check_run);
    let generator = CheckBatchGenerator::new(collaborators(&db, Arc::new(SystemClock)), policy);

    match execute(cli.command, &generator).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!(
                status = err.status_code(),
                code = err.error_code(),
                "{err}"
            );
            Ok(ExitCode::from(exit_code(&err)))
        }
    }
}

/// Process exit status for a failed command, derived from the HTTP status.
fn exit_code(err: &AppError) -> u8 {
    match err.status_code() {
        400 => 2,
        404 => 3,
        409 => 4,
        _ => 1,
    }
}

async fn execute(command: Command, generator: &CheckBatchGenerator) -> AppResult<()> {
    match command {
        Command::Generate {
            request,
            output_dir,
        } => generate(generator, &request, &output_dir).await,
        Command::Current { profit_year } => {
            let run = generator.workflow().get_current_run(profit_year).await?;
            let json = serde_json::to_string_pretty(&run)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            println!("{json}");
            Ok(())
        }
        Command::CompleteStep { run_id, step, user } => {
            complete_step(generator.workflow(), CheckRunId::from_uuid(run_id), step, &user).await
        }
    }
}

fn parse_request(raw: &str) -> AppResult<CheckPrintRequest> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Malformed print request: {e}")))
}

async fn generate(
    generator: &CheckBatchGenerator,
    request_path: &Path,
    output_dir: &Path,
) -> AppResult<()> {
    let raw = tokio::fs::read_to_string(request_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read {}: {e}", request_path.display())))?;
    let request = parse_request(&raw)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling check run");
            on_interrupt.cancel();
        }
    });

    let result = generator.generate(&request, &cancel).await?;

    let path = output_dir.join(&result.file_name);
    let write_failed =
        |e: std::io::Error| AppError::Internal(format!("Failed to write {}: {e}", path.display()));
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(write_failed)?;
    tokio::fs::write(&path, result.content.as_bytes())
        .await
        .map_err(write_failed)?;

    info!(
        run_id = %result.run_id,
        check_count = result.check_count,
        path = %path.display(),
        "Print file written"
    );
    Ok(())
}

async fn complete_step(
    workflow: &RunWorkflowManager,
    run_id: CheckRunId,
    step: i32,
    user: &str,
) -> AppResult<()> {
    let run = workflow.record_step_completion(run_id, step, user).await?;
    info!(run_id = %run.id, step_number = run.step_number, "Step recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkrun_core::CheckRunError;
    use rstest::rstest;

    #[rstest]
    #[case(CheckRunError::validation("DistributionIds", "empty"), 2)]
    #[case(CheckRunError::NotFound("no run".into()), 3)]
    #[case(CheckRunError::RunAlreadyActive { profit_year: 2025 }, 4)]
    #[case(CheckRunError::UnsupportedPrinterType("Laser".into()), 1)]
    #[case(CheckRunError::Database("down".into()), 1)]
    #[case(CheckRunError::Cancelled, 1)]
    fn test_exit_code_follows_app_error(#[case] err: CheckRunError, #[case] expected: u8) {
        assert_eq!(exit_code(&AppError::from(err)), expected);
    }

    #[test]
    fn test_malformed_request_is_validation() {
        let err = parse_request("{\"distributionIds\": [1]}").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_parses_request() {
        let request = parse_request(
            r#"{"distributionIds":[3,1],"profitYear":2025,"checkRunDate":"2025-12-15",
                "userName":"ops","isReprint":true,"printerType":"XeroxDjde"}"#,
        )
        .unwrap();
        assert_eq!(request.distribution_ids, vec![3, 1]);
        assert!(request.is_reprint);
    }
}
