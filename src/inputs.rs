//! Input validation at the CI host boundary.
//!
//! The host exposes named string lookups (on GitHub Actions, `INPUT_*`
//! environment variables); this module coerces them into a [`TaskRequest`]
//! before any network activity happens.

use std::collections::HashMap;
use std::env;

use crate::{
    errors::{Error, Result},
    types::TaskRequest,
};

/// Named string lookups provided by the CI host.
///
/// An unset input and an empty-string input are equivalent: GitHub Actions
/// materializes unset inputs as empty strings.
pub trait InputSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads inputs from `INPUT_<KEY>` environment variables, the GitHub Actions
/// convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionInputs;

impl InputSource for ActionInputs {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("INPUT_{}", key.to_uppercase())).ok()
    }
}

/// In-memory input source for tests.
#[derive(Debug, Clone, Default)]
pub struct MapInputs(HashMap<String, String>);

impl MapInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl InputSource for MapInputs {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

fn raw(source: &dyn InputSource, key: &str) -> Option<String> {
    source.get(key).filter(|v| !v.trim().is_empty())
}

fn required_string(source: &dyn InputSource, key: &str) -> Result<String> {
    raw(source, key).ok_or_else(|| Error::Config(format!("{key} required")))
}

fn optional_string(source: &dyn InputSource, key: &str) -> Option<String> {
    raw(source, key)
}

fn parse_int(key: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{key} not valid")))
}

fn required_int(source: &dyn InputSource, key: &str) -> Result<i64> {
    let value = required_string(source, key)?;
    parse_int(key, &value)
}

/// Absent is fine; present-but-unparsable is still an error. Silently
/// dropping a malformed value would submit a plan the caller did not ask for.
fn optional_int(source: &dyn InputSource, key: &str) -> Result<Option<i64>> {
    match raw(source, key) {
        Some(value) => parse_int(key, &value).map(Some),
        None => Ok(None),
    }
}

impl TaskRequest {
    /// Builds the validated request payload from host inputs.
    ///
    /// Fails with [`Error::Config`] naming the offending key; no network call
    /// is made here or before this succeeds.
    pub fn from_source(source: &dyn InputSource) -> Result<Self> {
        Ok(TaskRequest {
            token: required_string(source, "token")?,
            group_id: required_string(source, "group_en_id")?,
            test_type: required_int(source, "test_type")?,
            wx_version: required_int(source, "wx_version")?,
            platforms: required_string(source, "platforms")?,
            selected_android_num: optional_int(source, "selected_android_num")?,
            selected_ios_num: optional_int(source, "selected_ios_num")?,
            wx_id: optional_string(source, "wx_id"),
            test_plan_id: optional_string(source, "test_plan_id"),
            task_run_time: optional_int(source, "task_run_time")?,
            description: optional_string(source, "desc"),
            minium_config: optional_string(source, "minium_config"),
            dev_account_no: optional_int(source, "dev_account_no")?,
            virtual_accounts: optional_string(source, "virtual_accounts"),
            run_mode: optional_int(source, "run_mode")?,
            special_cloud: optional_string(source, "special_cloud"),
            device_ids: optional_string(source, "device_ids"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_inputs() -> MapInputs {
        MapInputs::new()
            .set("token", "tok")
            .set("group_en_id", "grp")
            .set("test_type", "1")
            .set("wx_version", "2")
            .set("platforms", "1;2")
    }

    #[test]
    fn builds_request_from_required_inputs_only() {
        let req = TaskRequest::from_source(&valid_inputs()).unwrap();
        assert_eq!(req.token, "tok");
        assert_eq!(req.group_id, "grp");
        assert_eq!(req.test_type, 1);
        assert_eq!(req.wx_version, 2);
        assert_eq!(req.platforms, "1;2");
        assert!(req.selected_android_num.is_none());
        assert!(req.wx_id.is_none());
    }

    #[test]
    fn each_missing_required_key_is_reported() {
        for key in ["token", "group_en_id", "test_type", "wx_version", "platforms"] {
            let mut inputs = valid_inputs();
            inputs.0.remove(key);
            let err = TaskRequest::from_source(&inputs).unwrap_err();
            assert!(
                matches!(&err, Error::Config(msg) if msg == &format!("{key} required")),
                "unexpected error for {key}: {err}"
            );
        }
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let inputs = valid_inputs().set("token", "  ");
        let err = TaskRequest::from_source(&inputs).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg == "token required"));
    }

    #[test]
    fn malformed_required_integer_fails() {
        let inputs = valid_inputs().set("test_type", "abc");
        let err = TaskRequest::from_source(&inputs).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg == "test_type not valid"));
    }

    #[test]
    fn malformed_optional_integer_fails_rather_than_dropping() {
        let inputs = valid_inputs().set("run_mode", "fast");
        let err = TaskRequest::from_source(&inputs).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg == "run_mode not valid"));
    }

    #[test]
    fn optional_zero_is_preserved() {
        let inputs = valid_inputs().set("selected_android_num", "0");
        let req = TaskRequest::from_source(&inputs).unwrap();
        assert_eq!(req.selected_android_num, Some(0));
    }

    #[test]
    fn optional_strings_pass_through() {
        let inputs = valid_inputs()
            .set("desc", "nightly run")
            .set("device_ids", "d1;d2");
        let req = TaskRequest::from_source(&inputs).unwrap();
        assert_eq!(req.description.as_deref(), Some("nightly run"));
        assert_eq!(req.device_ids.as_deref(), Some("d1;d2"));
    }
}
