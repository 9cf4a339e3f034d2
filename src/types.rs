use std::fmt;

use serde::{Deserialize, Serialize};

/// Validated configuration bundle posted to create a test plan.
///
/// Optional fields carry explicit present/absent state and are omitted from
/// the payload entirely when absent, never sent as null or empty. Integer
/// zero is a legitimate value and survives serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRequest {
    pub token: String,
    #[serde(rename = "enId")]
    pub group_id: String,
    #[serde(rename = "testType")]
    pub test_type: i64,
    #[serde(rename = "wxVersion")]
    pub wx_version: i64,
    pub platforms: String,
    #[serde(rename = "selectedAndroidNum", skip_serializing_if = "Option::is_none")]
    pub selected_android_num: Option<i64>,
    #[serde(rename = "selectedIosNum", skip_serializing_if = "Option::is_none")]
    pub selected_ios_num: Option<i64>,
    #[serde(rename = "wxId", skip_serializing_if = "Option::is_none")]
    pub wx_id: Option<String>,
    #[serde(rename = "testPlanId", skip_serializing_if = "Option::is_none")]
    pub test_plan_id: Option<String>,
    #[serde(rename = "taskRunTime", skip_serializing_if = "Option::is_none")]
    pub task_run_time: Option<i64>,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "miniumConfig", skip_serializing_if = "Option::is_none")]
    pub minium_config: Option<String>,
    #[serde(rename = "devAccountNo", skip_serializing_if = "Option::is_none")]
    pub dev_account_no: Option<i64>,
    #[serde(rename = "virtualAccounts", skip_serializing_if = "Option::is_none")]
    pub virtual_accounts: Option<String>,
    #[serde(rename = "runMode", skip_serializing_if = "Option::is_none")]
    pub run_mode: Option<i64>,
    #[serde(rename = "specialCloud", skip_serializing_if = "Option::is_none")]
    pub special_cloud: Option<String>,
    #[serde(rename = "deviceIds", skip_serializing_if = "Option::is_none")]
    pub device_ids: Option<String>,
}

/// Identifies a submitted test plan for follow-up status and report calls.
///
/// The token and group id are echoed from the request because the status and
/// report endpoints authenticate per query string rather than per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub plan_id: String,
    pub token: String,
    pub group_id: String,
}

/// Final artifact reference: a downloadable report URL, returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub download_url: String,
}

/// Remote plan state, derived fresh from each status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Code 1: waiting for a device.
    Queued,
    /// Code 2: test run in progress.
    Running,
    /// Code 11: the platform found no test case to run.
    CaseNotFound,
    /// Code 12: finished, report available.
    Completed,
    /// Code 15: the platform gave up on the run.
    TimedOut,
    /// Any other code the platform may emit.
    Unknown(i64),
}

impl PlanStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => PlanStatus::Queued,
            2 => PlanStatus::Running,
            11 => PlanStatus::CaseNotFound,
            12 => PlanStatus::Completed,
            15 => PlanStatus::TimedOut,
            other => PlanStatus::Unknown(other),
        }
    }

    /// Whether this status stops the poll loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlanStatus::Queued | PlanStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Queued => "queued",
            PlanStatus::Running => "running",
            PlanStatus::CaseNotFound => "case_not_found",
            PlanStatus::Completed => "completed",
            PlanStatus::TimedOut => "timed_out",
            PlanStatus::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Unknown(code) => write!(f, "unknown({code})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Response of `POST /thirdapi/plan`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanCreateResponse {
    #[serde(default)]
    pub data: Option<PlanCreateData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanCreateData {
    #[serde(default)]
    pub plan_id: Option<String>,
}

/// Response of `GET /thirdapi/plan`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanStatusResponse {
    #[serde(default)]
    pub data: Option<PlanStatusData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanStatusData {
    #[serde(default)]
    pub status: Option<i64>,
}

/// Response of `GET /thirdapi/report/static_resource`.
///
/// Unlike the plan endpoints this one has no `data` wrapper; the upstream API
/// is asymmetric here and the shape must not be "normalized".
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReportResponse {
    #[serde(default)]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_request() -> TaskRequest {
        TaskRequest {
            token: "tok".into(),
            group_id: "grp".into(),
            test_type: 1,
            wx_version: 2,
            platforms: "1;2".into(),
            selected_android_num: None,
            selected_ios_num: None,
            wx_id: None,
            test_plan_id: None,
            task_run_time: None,
            description: None,
            minium_config: None,
            dev_account_no: None,
            virtual_accounts: None,
            run_mode: None,
            special_cloud: None,
            device_ids: None,
        }
    }

    #[test]
    fn absent_optionals_are_omitted_from_payload() {
        let value = serde_json::to_value(minimal_request()).unwrap();
        assert_eq!(
            value,
            json!({
                "token": "tok",
                "enId": "grp",
                "testType": 1,
                "wxVersion": 2,
                "platforms": "1;2",
            })
        );
    }

    #[test]
    fn zero_valued_optionals_are_kept() {
        let mut req = minimal_request();
        req.selected_android_num = Some(0);
        req.run_mode = Some(0);
        let value = serde_json::to_value(req).unwrap();
        assert_eq!(value["selectedAndroidNum"], json!(0));
        assert_eq!(value["runMode"], json!(0));
    }

    #[test]
    fn payload_uses_wire_field_names() {
        let mut req = minimal_request();
        req.description = Some("nightly".into());
        req.dev_account_no = Some(7);
        req.device_ids = Some("a;b".into());
        let value = serde_json::to_value(req).unwrap();
        assert_eq!(value["desc"], json!("nightly"));
        assert_eq!(value["devAccountNo"], json!(7));
        assert_eq!(value["deviceIds"], json!("a;b"));
        assert!(value.get("description").is_none());
    }

    #[test]
    fn status_codes_map_to_variants() {
        assert_eq!(PlanStatus::from_code(1), PlanStatus::Queued);
        assert_eq!(PlanStatus::from_code(2), PlanStatus::Running);
        assert_eq!(PlanStatus::from_code(11), PlanStatus::CaseNotFound);
        assert_eq!(PlanStatus::from_code(12), PlanStatus::Completed);
        assert_eq!(PlanStatus::from_code(15), PlanStatus::TimedOut);
        assert_eq!(PlanStatus::from_code(42), PlanStatus::Unknown(42));
    }

    #[test]
    fn only_queued_and_running_continue_polling() {
        assert!(!PlanStatus::Queued.is_terminal());
        assert!(!PlanStatus::Running.is_terminal());
        assert!(PlanStatus::CaseNotFound.is_terminal());
        assert!(PlanStatus::Completed.is_terminal());
        assert!(PlanStatus::TimedOut.is_terminal());
        assert!(PlanStatus::Unknown(0).is_terminal());
    }

    #[test]
    fn report_response_has_no_data_wrapper() {
        let parsed: ReportResponse =
            serde_json::from_value(json!({ "download_url": "https://x/y.zip" })).unwrap();
        assert_eq!(parsed.download_url.as_deref(), Some("https://x/y.zip"));

        // A wrapped body must NOT yield a link.
        let wrapped: ReportResponse =
            serde_json::from_value(json!({ "data": { "download_url": "https://x/y.zip" } }))
                .unwrap();
        assert!(wrapped.download_url.is_none());
    }
}
