//! Schema management and the S3 → staging → star schema load
//!
//! Statements run strictly in order, each committed on its own. The first
//! failure stops the run; earlier statements stay committed.

pub mod executor;
pub mod statements;

pub use executor::{PgExecutor, StatementExecutor};
pub use statements::{
    Statement, copy_statements, create_statements, drop_statements, insert_statements,
};

use crate::aws::{AwsContext, FromAwsContext, S3Client, S3Operations, parse_s3_uri};
use crate::config::{
    AwsSettings, ConfigDocument, ConfigError, ConnectionSettings, EltSettings, S3Sources,
};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum EltError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("failed to connect to the warehouse")]
    Connect(#[source] anyhow::Error),

    #[error("statement {index} ({name}) failed")]
    Statement {
        index: usize,
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Execute statements in order, stopping at the first failure.
///
/// Returns the total affected row count.
pub async fn run_statements<X: StatementExecutor>(
    executor: &X,
    statements: &[Statement],
) -> Result<u64, EltError> {
    let mut total = 0;
    for (index, statement) in statements.iter().enumerate() {
        let started = Instant::now();
        let rows = executor
            .execute(statement)
            .await
            .map_err(|source| EltError::Statement {
                index,
                name: statement.name,
                source,
            })?;
        info!(
            table = statement.name,
            rows,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Statement committed"
        );
        total += rows;
    }
    Ok(total)
}

/// Drop every table, then create them again
pub async fn create_tables<X: StatementExecutor>(executor: &X) -> Result<(), EltError> {
    info!("Dropping tables");
    run_statements(executor, &drop_statements()).await?;
    info!("Creating tables");
    run_statements(executor, &create_statements()).await?;
    Ok(())
}

/// Check that every S3 source has objects.
///
/// Only warns: COPY reports the authoritative error.
pub async fn preflight_sources<S: S3Operations>(s3: &S, sources: &S3Sources) -> usize {
    let mut missing = 0;
    for uri in [&sources.log_data, &sources.log_jsonpath, &sources.song_data] {
        let location = match parse_s3_uri(uri) {
            Ok(location) => location,
            Err(e) => {
                warn!(source = %uri, error = %e, "Skipping preflight for source");
                missing += 1;
                continue;
            }
        };
        match s3.has_objects(&location).await {
            Ok(true) => info!(source = %location, "Source found"),
            Ok(false) => {
                warn!(source = %location, "Source has no objects, COPY will likely fail");
                missing += 1;
            }
            Err(e) => {
                warn!(source = %location, error = %format!("{e:#}"), "Could not check source");
                missing += 1;
            }
        }
    }
    missing
}

/// Load staging tables from S3, then fill the star schema
pub async fn load_and_transform<X: StatementExecutor>(
    executor: &X,
    settings: &EltSettings,
) -> Result<u64, EltError> {
    info!("Loading staging tables");
    run_statements(
        executor,
        &copy_statements(&settings.sources, &settings.role_arn, &settings.region),
    )
    .await?;
    info!("Inserting into analytics tables");
    run_statements(executor, &insert_statements()).await
}

/// `create-tables` against the cluster in the config at `path`
#[instrument(skip_all, fields(config = %path.display()))]
pub async fn run_create_tables(path: &Path) -> Result<(), EltError> {
    let connection = ConnectionSettings::from_document(&ConfigDocument::load(path)?)?;
    let executor = PgExecutor::connect(&connection)
        .await
        .map_err(EltError::Connect)?;

    let result = create_tables(&executor).await;
    executor.close().await;
    result
}

/// `etl` against the cluster in the config at `path`
#[instrument(skip_all, fields(config = %path.display()))]
pub async fn run_etl(path: &Path) -> Result<u64, EltError> {
    let doc = ConfigDocument::load(path)?;
    let settings = EltSettings::from_document(&doc)?;
    let aws = AwsSettings::from_document(&doc)?;

    let ctx = AwsContext::from_settings(&aws).await;
    preflight_sources(&S3Client::from_context(&ctx), &settings.sources).await;

    let executor = PgExecutor::connect(&settings.connection)
        .await
        .map_err(EltError::Connect)?;
    let result = load_and_transform(&executor, &settings).await;
    executor.close().await;

    if let Ok(rows) = &result {
        info!(rows, "ELT finished");
    }
    result
}
