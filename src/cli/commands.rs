//! Command implementations for the warehouse loader CLI
//!
//! Sets up logging, dispatches the subcommand and prints the human
//! readable report.

use crate::cli::args::{Args, Commands, RunArgs, SummaryArgs};
use crate::error::{EtlError, Result};
use crate::models::RejectReason;
use crate::pipeline::{Pipeline, RunSummary};
use crate::warehouse::{TableCounts, Warehouse};
use colored::*;
use std::collections::BTreeMap;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::task;
use tracing::{debug, info, warn};

/// Drive `command` until it finishes or `shutdown` resolves.
///
/// The runtime is shut down before returning. Shutdown waits for blocking
/// work that has already started, so an interrupted run never stops a
/// commit between its renames.
pub fn run_to_completion<C, S>(runtime: Runtime, command: C, shutdown: S) -> Result<()>
where
    C: Future<Output = Result<()>>,
    S: Future<Output = ()>,
{
    let result = runtime.block_on(async {
        tokio::select! {
            result = command => result,
            _ = shutdown => {
                warn!("Interrupt received, waiting for in-flight work to finish");
                Err(EtlError::Interrupted)
            }
        }
    });
    drop(runtime);
    result
}

/// Main command runner
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Commands::Run(run_args) => run_load(run_args, args.show_progress()).await,
        Commands::Summary(summary_args) => run_summary(summary_args).await,
    }
}

async fn run_load(args: &RunArgs, show_progress: bool) -> Result<()> {
    let config = args.to_config()?;
    info!(
        "Loading warehouse {} from {}",
        config.warehouse_dir.display(),
        args.staging_dir.display()
    );

    let summary = Pipeline::new(config)
        .with_progress(show_progress)
        .run()
        .await?;

    print_run_report(&summary);
    Ok(())
}

async fn run_summary(args: &SummaryArgs) -> Result<()> {
    let dir = args.warehouse_dir.clone();
    if !dir.is_dir() {
        return Err(EtlError::Configuration {
            message: format!("No warehouse directory at {}", dir.display()),
        });
    }

    let warehouse = task::spawn_blocking(move || Warehouse::open(&dir)).await??;

    let mut by_reason: BTreeMap<RejectReason, usize> = BTreeMap::new();
    for reject in warehouse.rejects.iter() {
        *by_reason.entry(reject.reject_reason).or_default() += 1;
    }

    println!(
        "\n{} {}",
        "Warehouse".bright_green().bold(),
        args.warehouse_dir.display()
    );
    print_table_counts(&warehouse.counts());
    print_reject_reasons(&by_reason);
    Ok(())
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sales_warehouse={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn print_run_report(summary: &RunSummary) {
    let facts = &summary.report.facts;
    let dims = &summary.report.dimensions;

    println!("\n{}", "Load Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        summary.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Staged sales:".bright_cyan(),
        facts.staged.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Accepted:".bright_cyan(),
        facts.accepted.to_string().bright_white().bold()
    );
    if facts.rejected > 0 {
        println!(
            "  {} {}",
            "Rejected:".bright_red(),
            facts.rejected.to_string().bright_red().bold()
        );
    }
    if facts.already_loaded > 0 {
        println!(
            "  {} {}",
            "Already loaded:".bright_cyan(),
            facts.already_loaded.to_string().bright_white()
        );
    }
    println!(
        "  {} {}",
        "New dimension rows:".bright_cyan(),
        dims.total_inserted().to_string().bright_white()
    );
    let skipped = dims.unkeyed_rows + dims.invalid_join_dates + dims.malformed_campaigns;
    if skipped > 0 {
        println!(
            "  {} {} unkeyed rows, {} invalid join dates, {} malformed campaign ids",
            "Degraded input:".yellow(),
            dims.unkeyed_rows,
            dims.invalid_join_dates,
            dims.malformed_campaigns
        );
    }

    print_table_counts(&summary.counts);
    print_reject_reasons(&facts.by_reason);
}

fn print_table_counts(counts: &TableCounts) {
    println!("\n{}", "Tables".bright_green().bold());
    let rows = [
        ("dim_customer", counts.customers),
        ("dim_product", counts.products),
        ("dim_store", counts.stores),
        ("dim_campaign", counts.campaigns),
        ("dim_date", counts.dates),
        ("fact_sales", counts.sales),
        ("fact_sales_reject", counts.rejects),
    ];
    for (name, count) in rows {
        println!(
            "  {:<20} {}",
            name.bright_cyan(),
            count.to_string().bright_white()
        );
    }
}

fn print_reject_reasons(by_reason: &BTreeMap<RejectReason, usize>) {
    if by_reason.is_empty() {
        return;
    }
    println!("\n{}", "Rejects by reason".bright_red().bold());
    for (reason, count) in by_reason {
        println!("  {:<24} {}", reason.as_str(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_completed_command_is_returned() {
        let runtime = Runtime::new().unwrap();

        let result = run_to_completion(runtime, async { Ok(()) }, std::future::pending::<()>());

        assert!(result.is_ok());
    }

    #[test]
    fn test_interrupt_waits_for_started_blocking_work() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("committed");
        let target = marker.clone();
        let runtime = Runtime::new().unwrap();

        let command = async move {
            task::spawn_blocking(move || {
                std::thread::sleep(Duration::from_millis(200));
                std::fs::write(&target, b"done")
            })
            .await??;
            Ok::<(), EtlError>(())
        };
        let shutdown = {
            let _guard = runtime.enter();
            tokio::time::sleep(Duration::from_millis(20))
        };

        let result = run_to_completion(runtime, command, shutdown);

        assert!(matches!(result, Err(EtlError::Interrupted)));
        assert!(marker.exists());
    }
}
