//! Remote log configuration.
//!
//! Loaded in layers (later wins):
//!   1. Built-in defaults.
//!   2. Optional TOML file pointed to by `REMOTELOG_CONFIG_PATH`.
//!   3. `REMOTELOG_*` environment variables (`REMOTELOG_LOG_GROUP=...`).
//!
//! ```toml
//! base_log_folder = "/var/log/tasks"
//! remote_base_log_folder = "s3://bucket/remote/log/location"
//! log_group = "arn:aws:logs:us-west-2:11111111:log-group:task_logs"
//! log_filename_template = "{workflow_id}/{task_id}/{execution_date}/{try_number}.log"
//! ```

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ConfigError, DEFAULT_LOG_FILENAME_TEMPLATE, LogFilenameTemplate, RemoteUrl, StoreError,
};

pub const CONFIG_PATH_ENV: &str = "REMOTELOG_CONFIG_PATH";
pub const ENV_PREFIX: &str = "REMOTELOG_";

/// Upper bound on events per `put_events` call.
pub const DEFAULT_MAX_BATCH_EVENTS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteLogConfig {
    /// Local folder the handlers write task logs into before uploading.
    pub base_log_folder: PathBuf,
    /// `scheme://bucket/prefix` for the object-store handler.
    pub remote_base_log_folder: Option<String>,
    /// Log group name or log-group ARN for the stream handler.
    pub log_group: Option<String>,
    pub log_filename_template: String,
    pub max_batch_events: usize,
    /// Delivery stream for record ingestion.
    pub delivery_stream: Option<String>,
    /// Remove the local log file once it has been uploaded.
    pub delete_local_copy: bool,
}

impl Default for RemoteLogConfig {
    fn default() -> Self {
        Self {
            base_log_folder: std::env::temp_dir().join("remotelog"),
            remote_base_log_folder: None,
            log_group: None,
            log_filename_template: DEFAULT_LOG_FILENAME_TEMPLATE.to_string(),
            max_batch_events: DEFAULT_MAX_BATCH_EVENTS,
            delivery_stream: None,
            delete_local_copy: false,
        }
    }
}

impl RemoteLogConfig {
    /// Defaults, then the TOML file from `REMOTELOG_CONFIG_PATH` (if set), then env.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        // テンプレートは読み込み時に検証しておく
        config.filename_template()?;
        Ok(config)
    }

    pub fn filename_template(&self) -> Result<LogFilenameTemplate, ConfigError> {
        LogFilenameTemplate::parse(&self.log_filename_template)
    }

    pub fn remote_base(&self) -> Option<Result<RemoteUrl, StoreError>> {
        self.remote_base_log_folder.as_deref().map(RemoteUrl::parse)
    }

    pub fn log_group_name(&self) -> Option<Result<String, ConfigError>> {
        self.log_group.as_deref().map(parse_log_group)
    }
}

/// Accepts a plain group name or
/// `arn:<partition>:logs:<region>:<account>:log-group:<name>[:*]`.
pub fn parse_log_group(value: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidLogGroup(value.to_string());
    if !value.starts_with("arn:") {
        if value.is_empty() {
            return Err(invalid());
        }
        return Ok(value.to_string());
    }
    let parts: Vec<&str> = value.split(':').collect();
    match parts.as_slice() {
        ["arn", _, "logs", _, _, "log-group", name, rest @ ..]
            if !name.is_empty() && (rest.is_empty() || rest == ["*"]) =>
        {
            Ok((*name).to_string())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(RemoteLogConfig::default())).merge(
            Toml::string(
                r#"
                base_log_folder = "/tmp/tasks"
                remote_base_log_folder = "s3://bucket/remote/log/location"
                log_filename_template = "{try_number}.log"
                "#,
            ),
        );
        let config = RemoteLogConfig::from_figment(figment).unwrap();

        assert_eq!(config.base_log_folder, PathBuf::from("/tmp/tasks"));
        assert_eq!(config.log_filename_template, "{try_number}.log");
        assert_eq!(config.max_batch_events, DEFAULT_MAX_BATCH_EVENTS);
        assert_eq!(
            config.remote_base().unwrap().unwrap().to_string(),
            "s3://bucket/remote/log/location"
        );
        assert!(config.log_group_name().is_none());
    }

    #[test]
    fn invalid_template_fails_at_load() {
        let figment = Figment::from(Serialized::defaults(RemoteLogConfig::default()))
            .merge(Toml::string(r#"log_filename_template = "{nope}.log""#));
        assert!(matches!(
            RemoteLogConfig::from_figment(figment),
            Err(ConfigError::UnknownPlaceholder(name)) if name == "nope"
        ));
    }

    #[rstest]
    #[case::plain("log_group_name", "log_group_name")]
    #[case::arn("arn:aws:logs:us-west-2:11111111:log-group:log_group_name", "log_group_name")]
    #[case::arn_wildcard("arn:aws:logs:us-west-2:11111111:log-group:task_logs:*", "task_logs")]
    fn log_group_forms(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(parse_log_group(value).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::wrong_service("arn:aws:s3:us-west-2:11111111:log-group:x")]
    #[case::missing_name("arn:aws:logs:us-west-2:11111111:log-group:")]
    #[case::trailing_junk("arn:aws:logs:us-west-2:11111111:log-group:x:y")]
    fn log_group_rejects(#[case] value: &str) {
        assert!(parse_log_group(value).is_err());
    }
}
