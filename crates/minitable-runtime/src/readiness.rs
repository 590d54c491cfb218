//! Bounded readiness waits.
//!
//! Every blocking or polling step in the startup sequence runs under a
//! caller-supplied deadline, so a service that never becomes ready fails
//! the startup with a distinct readiness-timeout error instead of hanging
//! the caller forever.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ClusterError;

/// Deadline and poll cadence for startup readiness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Delay between readiness probes.
    pub poll_interval: Duration,
    /// Budget for each readiness wait during startup.
    pub startup_timeout: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(25),
            startup_timeout: Duration::from_secs(60),
        }
    }
}

/// Poll `probe` until it holds, or fail with a readiness timeout naming
/// `stage`.
pub async fn wait_until(
    stage: &'static str,
    readiness: &ReadinessConfig,
    mut probe: impl FnMut() -> bool,
) -> Result<(), ClusterError> {
    let deadline = Instant::now() + readiness.startup_timeout;
    loop {
        if probe() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ClusterError::ReadinessTimeout {
                stage,
                timeout: readiness.startup_timeout,
            });
        }
        tokio::time::sleep(readiness.poll_interval).await;
    }
}

/// Await `future` under the startup deadline, mapping expiry to a
/// readiness timeout naming `stage`.
pub(crate) async fn bounded<T, E, F>(
    stage: &'static str,
    readiness: &ReadinessConfig,
    future: F,
) -> Result<T, ClusterError>
where
    F: Future<Output = Result<T, E>>,
    ClusterError: From<E>,
{
    match tokio::time::timeout(readiness.startup_timeout, future).await {
        Ok(result) => result.map_err(ClusterError::from),
        Err(_) => Err(ClusterError::ReadinessTimeout {
            stage,
            timeout: readiness.startup_timeout,
        }),
    }
}
