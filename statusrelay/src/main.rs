//! One-shot MySQL status relay.
//!
//! Connects to MySQL, reads the catalogued global status counters, and
//! submits them to a Zabbix server as a single sender packet. Every failure
//! is fatal and makes the process exit non-zero; nothing is retried.

use clap::Parser;
use statusrelay::{Cli, format_snapshot};
use std::process::ExitCode;
use statusrelay_core::{
    CycleOptions, MetricCatalog, RelayError, Result, ZabbixSender, collect, init_logging,
    mysql::MySqlStatusSource, run_cycle,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("statusrelay: {}", e);
        return ExitCode::FAILURE;
    }

    match relay(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

/// Runs a single cycle, or a collection-only pass with `--debug`.
async fn relay(cli: &Cli) -> Result<()> {
    let (db_config, credentials) = cli.database_settings()?;
    // Resolve the destination before touching the database so a bad flag
    // fails without any network activity.
    let sender = if cli.debug {
        None
    } else {
        Some(ZabbixSender::new(cli.sender_settings()?)?)
    };

    let catalog = MetricCatalog::mysql_default();
    let source = MySqlStatusSource::connect(&db_config, &credentials).await?;
    drop(credentials);

    let Some(sender) = sender else {
        let snapshot = collect(&source, &catalog, cli.status_source).await;
        source.close().await;
        print!("{}", format_snapshot(&snapshot?));
        return Ok(());
    };

    let options = CycleOptions::now(cli.zabbix.host_name.clone(), cli.status_source);
    let result = run_cycle(&source, &sender, &catalog, &options).await;
    source.close().await;
    let report = result?;

    info!(
        "✓ Sent {} metrics for host '{}' to {}",
        report.sent,
        options.host,
        sender.config().address()
    );
    println!("{}", report.acknowledgement.info);

    Ok(())
}

/// Logs a fatal error with the category an operator needs to act on it.
fn report_failure(err: &RelayError) {
    match err {
        RelayError::Configuration { .. } => error!("Configuration error: {}", err),
        RelayError::Connection { .. } | RelayError::Collection { .. } => {
            error!("Database error, nothing was sent: {}", err);
        }
        RelayError::Rejected { .. } => error!("Zabbix server rejected the data: {}", err),
        _ if err.is_transport() => error!("Failed to deliver metrics to Zabbix: {}", err),
        _ => error!("{}", err),
    }
}
