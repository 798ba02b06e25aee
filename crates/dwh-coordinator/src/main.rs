//! dwh-coordinator: Redshift warehouse provisioning and ELT
//!
//! Brings up the cluster described in `dwh.cfg`, tears it down again, and
//! loads the song-play star schema from S3.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dwh_common::defaults::DEFAULT_CONFIG_PATH;
use dwh_coordinator::aws::AwsError;
use dwh_coordinator::orchestrator::{self, LogReporter, TeardownReport};
use dwh_coordinator::{config, etl};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dwh-coordinator")]
#[command(about = "Redshift warehouse provisioning and song-play ELT")]
#[command(version)]
struct Args {
    /// Path to the warehouse config
    #[arg(short, long, global = true, env = "DWH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the IAM role and cluster, open the port, write the endpoint to the config
    Provision,

    /// Delete the cluster and role, then reset the config placeholders
    Teardown,

    /// Show the cluster as Redshift reports it
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Put the placeholder tokens back into the config
    ResetConfig,

    /// Drop and recreate every table
    CreateTables,

    /// Load the staging tables from S3 and fill the star schema
    Etl,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    let suggestion = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
        .and_then(AwsError::suggestion);
    if let Some(hint) = suggestion {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_tracing() {
    // The SDK stays quiet unless RUST_LOG says otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,aws_config=warn,aws_smithy_runtime=warn,sqlx=warn")
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Cancel the token on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping");
            child.cancel();
        }
    });
    token
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let path = args.config.as_path();
    let reporter = LogReporter::new();

    match args.command {
        Command::Provision => {
            let cancel = cancel_on_interrupt();
            let outcome = orchestrator::run_provision(path, &reporter, Some(&cancel)).await?;
            println!("Cluster endpoint: {}", outcome.endpoint);
            println!("IAM role ARN:     {}", outcome.role_arn);
        }

        Command::Teardown => {
            let report = orchestrator::run_teardown(path, &reporter).await?;
            print_report(&report);
        }

        Command::Status { json } => {
            let descriptor = orchestrator::run_status(path).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            } else {
                println!("{}", orchestrator::cluster_table(&descriptor));
            }
        }

        Command::ResetConfig => {
            config::reset_placeholders(path)?;
            info!(path = %path.display(), "Config placeholders reset");
        }

        Command::CreateTables => {
            etl::run_create_tables(path).await?;
            println!("Tables created");
        }

        Command::Etl => {
            let rows = etl::run_etl(path).await?;
            println!("ELT finished, {rows} rows affected");
        }
    }

    Ok(())
}

fn print_report(report: &TeardownReport) {
    println!("{}", orchestrator::teardown_table(report));
    if !report.is_clean() {
        println!("\nSome resources may remain; check the AWS console.");
    }
}
