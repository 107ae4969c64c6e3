use crate::constants::TASK_UNDEFINED_STATUS;
use crate::error::{self, Result};
use crate::resource::FromPayload;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fmt::{Display, Formatter};

/// Where a task is in its lifecycle, derived from its build id and completion flag.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TaskState {
    /// Declared in an application's configuration but never started.
    Unstarted,
    /// Started and not yet reported as completed.
    Running,
    /// Reported as completed by the server.
    Completed,
}

/// One execution (build) of a task declared in an application's configuration.
///
/// A task built from an application's task list has no `build` until it is started. Starting and
/// refreshing only ever overwrite the execution fields (`build`, `status`, `completed`,
/// `start_time`, `stop_time`, `exit_error`); the identity fields and configuration stay as they
/// were. Fields the client does not know about are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppTask {
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "build_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub build: Option<String>,
    #[serde(default = "undefined_status", deserialize_with = "status")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub completed: bool,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub stop_time: Option<String>,
    #[serde(default, rename = "exitError")]
    pub exit_error: Option<String>,
    /// The task's own configuration as a YAML document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    /// The owning application's full configuration as a YAML document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_config: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn undefined_status() -> String {
    TASK_UNDEFINED_STATUS.to_string()
}

fn status<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(undefined_status))
}

fn null_as_false<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Build ids arrive as strings from some endpoints and as numbers from others.
fn build_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("invalid build id: {}", other))),
    }
}

impl AppTask {
    /// A task that has not been started yet.
    pub fn new<S1, S2, S3>(workspace: S1, app: S2, name: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            workspace: workspace.into(),
            app: app.into(),
            name: name.into(),
            build: None,
            status: undefined_status(),
            completed: false,
            start_time: None,
            stop_time: None,
            exit_error: None,
            config: None,
            app_config: None,
            extra: Map::new(),
        }
    }

    pub fn with_config(mut self, config: Option<String>, app_config: Option<String>) -> Self {
        self.config = config;
        self.app_config = app_config;
        self
    }

    pub fn state(&self) -> TaskState {
        match (&self.build, self.completed) {
            (None, _) => TaskState::Unstarted,
            (Some(_), false) => TaskState::Running,
            (Some(_), true) => TaskState::Completed,
        }
    }

    /// `true` if the task completed with a non-empty exit error.
    pub fn failed(&self) -> bool {
        self.completed && self.exit_error.as_deref().map_or(false, |e| !e.is_empty())
    }

    /// The task's configuration parsed from YAML.
    pub fn parsed_config(&self) -> Result<Option<Value>> {
        parse_yaml(self.config.as_deref(), "parse task config")
    }

    /// The owning application's configuration parsed from YAML.
    pub fn parsed_app_config(&self) -> Result<Option<Value>> {
        parse_yaml(self.app_config.as_deref(), "parse application config")
    }

    /// Overwrite the execution fields with those of `other`. A snapshot without a build carries no
    /// execution state and is ignored.
    pub fn merge_execution(&mut self, other: AppTask) -> &mut Self {
        if other.build.is_some() {
            self.build = other.build;
            self.status = other.status;
            self.completed = other.completed;
            self.start_time = other.start_time;
            self.stop_time = other.stop_time;
            self.exit_error = other.exit_error;
        }
        self
    }
}

fn parse_yaml(raw: Option<&str>, action: &str) -> Result<Option<Value>> {
    raw.map(|raw| serde_yaml::from_str(raw).context(error::YamlSnafu { action }))
        .transpose()
}

impl FromPayload for AppTask {
    fn from_payload(kind: &'static str, payload: Value) -> Result<Self> {
        serde_json::from_value(payload).context(error::DeserializeSnafu { what: kind })
    }
}

impl Display for AppTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Task name={} build={} status={}",
            self.name,
            self.build.as_deref().unwrap_or("None"),
            self.status
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_for_missing_fields() {
        let task = AppTask::from_payload("AppTask", json!({"name": "prepare-data"})).unwrap();
        assert_eq!(task.status, "undefined");
        assert_eq!(task.build, None);
        assert!(!task.completed);
        assert_eq!(task.state(), TaskState::Unstarted);
        assert_eq!(
            task.to_string(),
            "Task name=prepare-data build=None status=undefined"
        );
    }

    #[test]
    fn server_payload() {
        let task = AppTask::from_payload(
            "AppTask",
            json!({
                "app": "21-styles-set",
                "build": 7,
                "completed": true,
                "config": "name: prepare-data\nresources: []\n",
                "name": "prepare-data",
                "serve": null,
                "start_time": "2017-10-19T13:06:01.543311498Z",
                "status": "Succeeded",
                "stop_time": null,
                "exitError": ""
            }),
        )
        .unwrap();
        assert_eq!(task.build.as_deref(), Some("7"));
        assert_eq!(task.state(), TaskState::Completed);
        assert!(!task.failed());
        assert_eq!(task.extra.get("serve"), Some(&Value::Null));
        assert_eq!(
            task.parsed_config().unwrap(),
            Some(json!({"name": "prepare-data", "resources": []}))
        );
        assert_eq!(task.parsed_app_config().unwrap(), None);
    }

    #[test]
    fn null_status_is_undefined() {
        let task = AppTask::from_payload("AppTask", json!({"status": null, "completed": null}))
            .unwrap();
        assert_eq!(task.status, "undefined");
        assert!(!task.completed);
    }

    #[test]
    fn merge_keeps_identity() {
        let mut task = AppTask::new("demo", "styles-set", "prepare-data")
            .with_config(Some("name: prepare-data\n".into()), None);
        let snapshot = AppTask::from_payload(
            "AppTask",
            json!({"build": "2", "status": "Failed", "completed": true, "exitError": "oom",
                   "name": "other"}),
        )
        .unwrap();
        task.merge_execution(snapshot);
        assert_eq!(task.name, "prepare-data");
        assert_eq!(task.build.as_deref(), Some("2"));
        assert!(task.failed());
        assert!(task.config.is_some());

        let before = task.clone();
        task.merge_execution(AppTask::new("x", "y", "z"));
        assert_eq!(task, before);
    }
}
