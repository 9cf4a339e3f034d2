//! Sequences submit → poll → fetch and reports the outcome to the CI host.

use std::{
    env,
    fs::OpenOptions,
    io::Write,
    sync::Mutex,
};

use crate::{
    client::{Client, Config},
    errors::Result,
    inputs::InputSource,
    poller::{poll_until_terminal, PollConfig},
    types::{TaskRequest, TaskReport},
};

/// Host-facing side effects: the named output and the terminal failure
/// signal. The library never talks to the CI host directly.
pub trait OutputSink {
    fn set_output(&self, name: &str, value: &str);
    fn set_failed(&self, message: &str);
}

/// GitHub Actions output sink.
///
/// Outputs are appended as `name=value` lines to the file named by
/// `$GITHUB_OUTPUT`; failures are emitted as `::error::` workflow commands on
/// stdout, which the runner renders as annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionOutput;

impl OutputSink for ActionOutput {
    fn set_output(&self, name: &str, value: &str) {
        let Ok(path) = env::var("GITHUB_OUTPUT") else {
            tracing::warn!(name, "GITHUB_OUTPUT not set; output not recorded");
            return;
        };
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{name}={value}"));
        if let Err(err) = appended {
            tracing::warn!(name, error = %err, "failed to write output");
        }
    }

    fn set_failed(&self, message: &str) {
        println!("::error::{message}");
    }
}

/// In-memory sink recording outputs and failures, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: Mutex<Vec<(String, String)>>,
    failures: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl OutputSink for MemorySink {
    fn set_output(&self, name: &str, value: &str) {
        self.outputs
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
    }

    fn set_failed(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

/// Runs the whole workflow: validate inputs, submit the plan, poll until a
/// terminal status, fetch the report link.
///
/// On success the link is published as the `report_link` output and logged.
/// On any stage failure the message is signaled through the sink exactly
/// once and the error is returned; completed stages are never retried.
pub async fn run_task(
    source: &dyn InputSource,
    sink: &dyn OutputSink,
    client_config: Config,
    poll_config: PollConfig,
) -> Result<TaskReport> {
    match execute(source, client_config, poll_config).await {
        Ok(report) => {
            tracing::info!("report link: {}", report.download_url);
            sink.set_output("report_link", &report.download_url);
            Ok(report)
        }
        Err(err) => {
            tracing::error!(error = %err, "cloud test failed");
            sink.set_failed(&err.to_string());
            Err(err)
        }
    }
}

async fn execute(
    source: &dyn InputSource,
    client_config: Config,
    poll_config: PollConfig,
) -> Result<TaskReport> {
    let request = TaskRequest::from_source(source)?;
    let client = Client::new(client_config)?;

    let handle = client.create_plan(&request).await?;
    tracing::info!(plan_id = %handle.plan_id, "test plan submitted");

    poll_until_terminal(&client, &handle, &poll_config).await?;
    client.fetch_report(&handle).await
}
