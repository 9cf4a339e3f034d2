use std::{sync::Arc, time::Duration};

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::{
    errors::{APIError, Error, Result, TransportError, TransportErrorKind},
    types::{
        PlanCreateResponse, PlanStatus, PlanStatusResponse, ReportResponse, TaskHandle, TaskReport,
        TaskRequest,
    },
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub http_client: Option<reqwest::Client>,
    /// Override the connect timeout (defaults to 5s).
    pub connect_timeout: Option<Duration>,
    /// Override the request timeout (defaults to 60s).
    pub timeout: Option<Duration>,
}

/// Client for the minitest third-party API.
///
/// Cheap to clone; all clones share one HTTP connection pool. Authentication
/// is carried in the request payload and query strings, not in headers.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: reqwest::Url,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl Client {
    pub fn new(cfg: Config) -> Result<Self> {
        let base = cfg
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let base_url = reqwest::Url::parse(&base)
            .map_err(|err| Error::Config(format!("invalid base url: {err}")))?;

        let connect_timeout = cfg.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let request_timeout = cfg.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http = match cfg.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .map_err(|err| TransportError {
                    kind: TransportErrorKind::Connect,
                    message: "failed to build http client".to_string(),
                    source: Some(err),
                })?,
        };

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                http,
                request_timeout,
            }),
        })
    }

    /// Submits the test plan. Fails with [`Error::Submit`] when the response
    /// carries no plan id, [`Error::Api`] on non-2xx, [`Error::Transport`] on
    /// connection-level failures.
    pub async fn create_plan(&self, request: &TaskRequest) -> Result<TaskHandle> {
        let builder = self
            .inner
            .request(Method::POST, "/thirdapi/plan")?
            .json(request);
        let payload: PlanCreateResponse = self.inner.execute_json(builder).await?;

        let plan_id = payload
            .data
            .and_then(|data| data.plan_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Submit("start task failed".to_string()))?;

        tracing::debug!(plan_id = %plan_id, "plan created");
        Ok(TaskHandle {
            plan_id,
            token: request.token.clone(),
            group_id: request.group_id.clone(),
        })
    }

    /// Queries current plan status. A response without a usable status code
    /// fails with [`Error::Poll`]; status 0 is indistinguishable from absent
    /// on the upstream side and gets the same treatment.
    pub async fn plan_status(&self, handle: &TaskHandle) -> Result<PlanStatus> {
        let builder = self
            .inner
            .request(Method::GET, "/thirdapi/plan")?
            .query(&handle.query());
        let payload: PlanStatusResponse = self.inner.execute_json(builder).await?;

        match payload.data.and_then(|data| data.status).filter(|&s| s != 0) {
            Some(code) => Ok(PlanStatus::from_code(code)),
            None => Err(Error::Poll("check task status failed".to_string())),
        }
    }

    /// Retrieves the report link for a completed plan. The URL is returned
    /// verbatim, with no reachability or well-formedness check.
    pub async fn fetch_report(&self, handle: &TaskHandle) -> Result<TaskReport> {
        let builder = self
            .inner
            .request(Method::GET, "/thirdapi/report/static_resource")?
            .query(&handle.query());
        let payload: ReportResponse = self.inner.execute_json(builder).await?;

        let download_url = payload
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Report("report link missing from response".to_string()))?;
        Ok(TaskReport { download_url })
    }
}

impl TaskHandle {
    fn query(&self) -> [(&'static str, &str); 3] {
        [
            ("token", self.token.as_str()),
            ("group_en_id", self.group_id.as_str()),
            ("plan_id", self.plan_id.as_str()),
        ]
    }
}

impl ClientInner {
    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| Error::Config(format!("invalid path: {err}")))?;
        tracing::debug!(method = %method, url = %url, "minitest api request");
        Ok(self.http.request(method, url))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let resp = builder
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(to_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api(APIError::from_body(status.as_u16(), body)));
        }

        let bytes = resp.bytes().await.map_err(to_transport_error)?;
        serde_json::from_slice::<T>(&bytes).map_err(Error::Serialization)
    }
}

fn to_transport_error(err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_request() {
        TransportErrorKind::Request
    } else {
        TransportErrorKind::Other
    };

    TransportError {
        kind,
        message: err.to_string(),
        source: Some(err),
    }
    .into()
}
