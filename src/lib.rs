//! CI client for the WeChat mini-program cloud testing platform.
//!
//! Submits a test plan to the minitest third-party API, polls plan status on a
//! fixed cadence until a terminal state, and surfaces the downloadable report
//! link to the CI host.

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://minitest.weixin.qq.com";

/// Default connection timeout (5 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Default request timeout (60 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Default delay between status checks (20 seconds).
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(20);

mod client;
mod errors;
mod inputs;
mod orchestrator;
mod poller;
mod types;

pub use client::{Client, Config};
pub use errors::{APIError, Error, Result, TransportError, TransportErrorKind};
pub use inputs::{ActionInputs, InputSource, MapInputs};
pub use orchestrator::{run_task, ActionOutput, MemorySink, OutputSink};
pub use poller::{poll_until_terminal, PollConfig};
pub use types::{PlanStatus, TaskHandle, TaskReport, TaskRequest};
