//! Fixed-interval polling with cancellation support.
//!
//! Long-running managed-service operations (cluster creation) are tracked by
//! repeatedly describing the resource until it reaches the wanted state.
//! [`poll_until`] owns the loop: delay schedule, optional attempt and time
//! limits, transient-error tolerance and Ctrl-C cancellation.

use backon::{BackoffBuilder, ConstantBuilder};
use dwh_common::defaults::default_poll_interval;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Limits and cadence for a poll loop.
///
/// The default polls every 30 seconds with no attempt or time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between checks
    pub interval: Duration,
    /// Give up after this many checks
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since the first check
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: None,
            timeout: None,
        }
    }
}

impl From<crate::config::PollSettings> for PollConfig {
    fn from(settings: crate::config::PollSettings) -> Self {
        Self {
            interval: settings.interval,
            max_attempts: settings.max_attempts,
            timeout: settings.timeout,
        }
    }
}

/// Why a poll loop stopped without a result
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("wait for {resource} cancelled")]
    Cancelled { resource: String },

    #[error("timed out waiting for {resource} after {elapsed:?} ({attempts} attempts)")]
    Timeout {
        resource: String,
        elapsed: Duration,
        attempts: u32,
    },

    #[error("{resource} not ready after {attempts} attempts")]
    AttemptsExhausted { resource: String, attempts: u32 },

    #[error("checking {resource} failed")]
    Check {
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Poll `check` until it yields `Some(value)`.
///
/// `check` receives the 1-based attempt number. It returns `Ok(None)` while
/// the resource is not ready. Errors for which `is_transient` returns true
/// are logged and treated like `Ok(None)`; any other error ends the loop.
///
/// The first check runs immediately, and each later check follows one
/// `interval` delay.
pub async fn poll_until<T, F, Fut, P>(
    config: &PollConfig,
    cancel: Option<&CancellationToken>,
    resource_name: &str,
    is_transient: P,
    mut check: F,
) -> Result<T, WaitError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = anyhow::Result<Option<T>>>,
    P: Fn(&anyhow::Error) -> bool,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    let mut delays = ConstantBuilder::default()
        .with_delay(config.interval)
        .without_max_times()
        .build();

    let cancelled = || WaitError::Cancelled {
        resource: resource_name.to_string(),
    };

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(cancelled());
        }

        if config.timeout.is_some_and(|timeout| start.elapsed() >= timeout) {
            return Err(WaitError::Timeout {
                resource: resource_name.to_string(),
                elapsed: start.elapsed(),
                attempts,
            });
        }

        attempts += 1;
        match check(attempts).await {
            Ok(Some(value)) => {
                debug!(resource = %resource_name, attempts, "Resource ready");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) if is_transient(&e) => {
                debug!(resource = %resource_name, attempt = attempts, error = %e, "Transient error, still waiting");
            }
            Err(e) => {
                warn!(resource = %resource_name, error = ?e, "Resource check failed");
                return Err(WaitError::Check {
                    resource: resource_name.to_string(),
                    source: e,
                });
            }
        }

        if config.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(WaitError::AttemptsExhausted {
                resource: resource_name.to_string(),
                attempts,
            });
        }

        let mut delay = delays.next().unwrap_or(config.interval);
        if let Some(timeout) = config.timeout {
            delay = delay.min(timeout.saturating_sub(start.elapsed()));
        }
        debug!(
            resource = %resource_name,
            attempt = attempts,
            delay_secs = delay.as_secs(),
            "Resource not ready, retrying"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = async {
                match cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                return Err(cancelled());
            }
        }
    }
}
