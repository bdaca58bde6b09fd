//! GA4GH Workflow Execution Service (WES) schema.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::fields::{Fields, Schema, REQUIRED};
use crate::state::State;

/// The request a workflow run was started with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    /// Run parameterization, including input and output locations.
    pub workflow_params: Map<String, Value>,

    /// Descriptor type, e.g. `CWL` or `WDL`.
    pub workflow_type: String,

    pub workflow_type_version: String,

    pub workflow_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_engine_parameters: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_engine: Option<String>,

    /// Requires `workflow_engine`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_engine_version: Option<String>,
}

impl RunRequest {
    /// String-valued entries of `workflow_params`, in key order.
    pub fn string_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.workflow_params
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }
}

impl Schema for RunRequest {
    fn read(f: &mut Fields<'_>) -> Self {
        let request = Self {
            workflow_params: f.required_object("workflow_params"),
            workflow_type: f.required_str("workflow_type"),
            workflow_type_version: f.required_str("workflow_type_version"),
            workflow_url: f.required_str("workflow_url"),
            tags: f.optional_string_map("tags"),
            workflow_engine_parameters: f.optional_string_map("workflow_engine_parameters"),
            workflow_engine: f.optional_str("workflow_engine"),
            workflow_engine_version: f.optional_str("workflow_engine_version"),
        };

        if request.workflow_engine_version.is_some()
            && request.workflow_engine.is_none()
            && !f.has("workflow_engine")
        {
            f.error(
                "workflow_engine",
                "workflow_engine required when workflow_engine_version is set",
            );
        }
        request
    }
}

/// Log of a workflow run or one of its tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    /// URL of the stdout log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    /// URL of the stderr log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_logs: Option<Vec<String>>,
}

impl Schema for RunLog {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            name: f.optional_str("name"),
            cmd: f.optional_string_list("cmd"),
            start_time: f.optional_datetime("start_time"),
            end_time: f.optional_datetime("end_time"),
            stdout: f.optional_str("stdout"),
            stderr: f.optional_str("stderr"),
            exit_code: f.optional_i64("exit_code"),
            system_logs: f.optional_string_list("system_logs"),
        }
    }
}

/// Log of one task inside a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskLog {
    pub id: String,

    /// Link to an extended TES task definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tes_uri: Option<String>,

    #[serde(flatten)]
    pub log: RunLog,
}

impl Schema for TaskLog {
    fn read(f: &mut Fields<'_>) -> Self {
        let id = f.required_str("id");
        let tes_uri = f.optional_str("tes_uri");
        let log = RunLog::read(f);
        if !f.has("name") {
            f.error("name", REQUIRED);
        }
        Self { id, tes_uri, log }
    }
}

/// An entry of the deprecated `task_logs` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskLogEntry {
    Task(TaskLog),
    Run(RunLog),
}

impl Schema for TaskLogEntry {
    fn read(f: &mut Fields<'_>) -> Self {
        if f.has("id") {
            Self::Task(TaskLog::read(f))
        } else {
            Self::Run(RunLog::read(f))
        }
    }
}

/// A named output location of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WesOutput {
    pub location: String,
    pub name: String,
}

impl WesOutput {
    pub fn new(location: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            name: name.into(),
        }
    }
}

impl Schema for WesOutput {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            location: f.required_str("location"),
            name: f.required_str("name"),
        }
    }
}

/// A WES workflow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WesRun {
    pub run_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RunRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_log: Option<RunLog>,

    /// Paginated task log listing; supersedes `task_logs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_logs_url: Option<String>,

    /// Deprecated in favour of `task_logs_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_logs: Option<Vec<TaskLogEntry>>,

    pub outputs: Vec<WesOutput>,
}

impl WesRun {
    /// Create a run with only an identifier.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            request: None,
            state: None,
            run_log: None,
            task_logs_url: None,
            task_logs: None,
            outputs: Vec::new(),
        }
    }

    /// Deprecated fields present on this run, with their replacements.
    pub fn deprecated_fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut fields = Vec::new();
        if self.task_logs.is_some() {
            fields.push(("task_logs", "task_logs_url"));
        }
        fields
    }
}

impl Schema for WesRun {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            run_id: f.required_str("run_id"),
            request: f.object("request", RunRequest::read),
            state: f.optional_enum("state"),
            run_log: f.object("run_log", RunLog::read),
            task_logs_url: f.optional_str("task_logs_url"),
            task_logs: f.list("task_logs", TaskLogEntry::read),
            outputs: f.list("outputs", WesOutput::read).unwrap_or_default(),
        }
    }
}
