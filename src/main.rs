use std::{env, process::ExitCode, time::Duration};

use tracing_subscriber::EnvFilter;

use minitest_cloud::{run_task, ActionInputs, ActionOutput, Config, PollConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let client_config = Config {
        base_url: env::var("MINITEST_BASE_URL").ok(),
        ..Default::default()
    };

    let mut poll_config = PollConfig::default();
    if let Some(secs) = env_u64("MINITEST_POLL_INTERVAL_SECS") {
        poll_config.interval = Duration::from_secs(secs);
    }
    if let Some(max) = env_u64("MINITEST_MAX_ATTEMPTS") {
        poll_config.max_attempts = Some(max as u32);
    }
    if let Some(secs) = env_u64("MINITEST_DEADLINE_SECS") {
        poll_config.deadline = Some(Duration::from_secs(secs));
    }

    match run_task(&ActionInputs, &ActionOutput, client_config, poll_config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn env_u64(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, raw = %raw, "ignoring unparsable override");
            None
        }
    }
}
