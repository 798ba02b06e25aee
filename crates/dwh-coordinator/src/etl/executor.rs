//! Statement execution against the warehouse

use super::statements::Statement;
use crate::config::ConnectionSettings;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

/// Trait for executing SQL that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait StatementExecutor: Send + Sync {
    /// Run one statement in its own transaction and return the affected row
    /// count
    async fn execute(&self, statement: &Statement) -> Result<u64>;
}

/// Executes statements over a Postgres-protocol connection to the cluster
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    fn connect_options(settings: &ConnectionSettings) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.db_name)
            .username(&settings.user)
            .password(&settings.password)
    }

    /// Connect to the cluster named in `[CLUSTER]`
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(Self::connect_options(settings))
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to {}:{}/{}",
                    settings.host, settings.port, settings.db_name
                )
            })?;

        debug!(host = %settings.host, db = %settings.db_name, "Connected to warehouse");
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

impl StatementExecutor for PgExecutor {
    async fn execute(&self, statement: &Statement) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        // Simple query protocol: COPY and multi-line DDL are sent as-is
        let result = sqlx::raw_sql(&statement.sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Statement for {} failed", statement.name))?;

        tx.commit()
            .await
            .with_context(|| format!("Failed to commit {}", statement.name))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_use_cluster_section() {
        let settings = ConnectionSettings {
            host: "dwhcluster.abc123.us-west-2.redshift.amazonaws.com".to_string(),
            db_name: "dwh".to_string(),
            user: "dwhuser".to_string(),
            password: "Passw0rd".to_string(),
            port: 5439,
        };
        let options = PgExecutor::connect_options(&settings);

        assert_eq!(options.get_host(), settings.host);
        assert_eq!(options.get_port(), 5439);
        assert_eq!(options.get_database(), Some("dwh"));
        assert_eq!(options.get_username(), "dwhuser");
    }
}
