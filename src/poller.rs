//! Fixed-cadence status polling.
//!
//! The loop is owned by the caller's task and torn down by returning, so
//! every terminal path cancels the cadence deterministically. There is no
//! process-wide timer state.

use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::{
    client::Client,
    errors::{Error, Result},
    types::{PlanStatus, TaskHandle},
    DEFAULT_POLL_INTERVAL,
};

/// Polling cadence and optional bounds.
///
/// Both bounds default to `None`, matching the upstream platform contract of
/// polling until a terminal status arrives. CI environments that want a hard
/// stop can set either; whichever trips first ends the loop with
/// [`Error::Poll`].
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Maximum number of status checks before giving up.
    pub max_attempts: Option<u32>,
    /// Wall-clock budget for the whole poll phase.
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

/// Polls plan status every `config.interval` until a terminal status.
///
/// Returns `Ok(())` only for a completed plan (code 12). Codes 11 and 15,
/// unknown codes, and a missing status all fail with [`Error::Poll`]; codes 1
/// and 2 log progress and continue. The first check happens one interval
/// after entry, mirroring the platform's expectation that a fresh plan needs
/// time to enter the queue.
pub async fn poll_until_terminal(
    client: &Client,
    handle: &TaskHandle,
    config: &PollConfig,
) -> Result<()> {
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        if let Some(max) = config.max_attempts {
            if attempt >= max {
                return Err(Error::Poll("polling attempts exhausted".to_string()));
            }
        }
        if let Some(deadline) = config.deadline {
            if started.elapsed() >= deadline {
                return Err(Error::Poll("polling deadline exceeded".to_string()));
            }
        }

        sleep(config.interval).await;
        attempt += 1;

        match client.plan_status(handle).await? {
            PlanStatus::Queued => {
                tracing::info!(plan_id = %handle.plan_id, attempt, "test job in the queue");
            }
            PlanStatus::Running => {
                tracing::info!(plan_id = %handle.plan_id, attempt, "test job running");
            }
            PlanStatus::Completed => {
                tracing::info!(plan_id = %handle.plan_id, attempt, "test job completed");
                return Ok(());
            }
            PlanStatus::CaseNotFound => {
                return Err(Error::Poll("test case not found".to_string()));
            }
            PlanStatus::TimedOut => {
                return Err(Error::Poll("test job timed out".to_string()));
            }
            PlanStatus::Unknown(code) => {
                return Err(Error::Poll(format!("unexpected plan status {code}")));
            }
        }
    }
}
