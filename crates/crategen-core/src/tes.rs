//! GA4GH Task Execution Service (TES) schema.
//!
//! Field names follow the TES wire format. Every record implements
//! [`Schema`] and is validated out of a parsed JSON object.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fields::{is_absolute_url, is_blank, Fields, Schema};
use crate::path::is_absolute;
use crate::state::State;

/// Characters that make an output path a glob pattern.
pub const WILDCARD_CHARS: [char; 4] = ['*', '?', '[', ']'];

/// Returns true if `path` contains any of [`WILDCARD_CHARS`].
pub fn has_wildcard(path: &str) -> bool {
    path.contains(WILDCARD_CHARS)
}

/// The directory part of a glob `path` ahead of its first wildcard.
///
/// `/out/*.txt` gives `/out`, `/*.txt` gives `/`. A path without
/// wildcards gives its parent directory.
pub fn wildcard_prefix(path: &str) -> String {
    let head = path.find(WILDCARD_CHARS).map_or(path, |i| &path[..i]);
    match head.rfind(['/', '\\']) {
        Some(0) => "/".to_string(),
        Some(i) => head[..i].to_string(),
        None => head.to_string(),
    }
}

/// Whether an input or output is a single file or a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    #[default]
    File,
    Directory,
}

/// A single containerized command invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TesExecutor {
    /// Container image name.
    pub image: String,

    /// Program arguments; the first is the program to run.
    pub command: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,

    /// Absolute path piped to stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,

    /// Absolute path receiving stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_error: Option<bool>,
}

impl TesExecutor {
    /// Create an executor with an image and no command.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            command: Vec::new(),
            workdir: None,
            stdin: None,
            stdout: None,
            stderr: None,
            env: None,
            ignore_error: None,
        }
    }
}

impl Schema for TesExecutor {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            image: f.required_str("image"),
            command: f.required_string_list("command"),
            workdir: f.optional_str("workdir"),
            stdin: f.optional_absolute_path("stdin"),
            stdout: f.optional_absolute_path("stdout"),
            stderr: f.optional_str("stderr"),
            env: f.optional_string_map("env"),
            ignore_error: f.optional_bool("ignore_error"),
        }
    }
}

/// Compute resources requested by a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TesResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preemptible: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_gb: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_gb: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_parameters: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_parameters_strict: Option<bool>,
}

impl Schema for TesResources {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            cpu_cores: f.optional_i64("cpu_cores"),
            preemptible: f.optional_bool("preemptible"),
            ram_gb: f.optional_f64("ram_gb"),
            disk_gb: f.optional_f64("disk_gb"),
            zones: f.optional_string_list("zones"),
            backend_parameters: f.optional_string_map("backend_parameters"),
            backend_parameters_strict: f.optional_bool("backend_parameters_strict"),
        }
    }
}

/// A file staged into the container before the executors run.
///
/// Exactly one of `url` and `content` survives validation: non-blank
/// `content` clears `url`, and a missing `content` makes `url` mandatory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TesInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Absolute path inside the container.
    pub path: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub streamable: Option<bool>,
}

impl TesInput {
    /// Create an input fetched from `url`.
    pub fn from_url(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: None,
            description: None,
            url: Some(url.into()),
            path: path.into(),
            file_type: None,
            content: None,
            streamable: None,
        }
    }

    /// Create an input whose content is given inline.
    pub fn from_content(content: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: None,
            content: Some(content.into()),
            ..Self::from_url(String::new(), path)
        }
    }
}

impl Schema for TesInput {
    fn read(f: &mut Fields<'_>) -> Self {
        let mut input = Self {
            name: f.optional_str("name"),
            description: f.optional_str("description"),
            url: f.optional_str("url"),
            path: f.required_absolute_path("path"),
            file_type: f.optional_enum("type"),
            content: f.optional_str("content"),
            streamable: f.optional_bool("streamable"),
        };

        if !is_blank(input.content.as_deref()) {
            input.url = None;
        } else if is_blank(input.url.as_deref()) {
            f.error("url", "url required when content is empty");
        } else if let Some(url) = &input.url {
            if !is_absolute_url(url) {
                f.error("url", "must be an absolute URL");
            }
        }
        input
    }
}

/// A file uploaded from the container after the executors finish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Destination in long-term storage.
    pub url: String,

    /// Absolute path inside the container; may be a glob.
    pub path: String,

    /// Prefix stripped from glob matches; required when `path` is a glob.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
}

impl TesOutput {
    /// Create an output uploaded to `url`.
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: None,
            description: None,
            url: url.into(),
            path: path.into(),
            path_prefix: None,
            file_type: None,
        }
    }
}

impl Schema for TesOutput {
    fn read(f: &mut Fields<'_>) -> Self {
        let output = Self {
            name: f.optional_str("name"),
            description: f.optional_str("description"),
            url: f.required_str("url"),
            path: f.required_absolute_path("path"),
            path_prefix: f.optional_str("path_prefix"),
            file_type: f.optional_enum("type"),
        };

        if !output.url.is_empty() && !is_absolute_url(&output.url) {
            f.error("url", "must be an absolute URL");
        }
        if has_wildcard(&output.path) && is_blank(output.path_prefix.as_deref()) {
            f.error("path_prefix", "path_prefix required when path contains wildcards");
        }
        output
    }
}

/// Log of a single executor run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TesExecutorLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,

    pub exit_code: i64,
}

impl Schema for TesExecutorLog {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            start_time: f.optional_datetime("start_time"),
            end_time: f.optional_datetime("end_time"),
            stdout: f.optional_str("stdout"),
            stderr: f.optional_str("stderr"),
            exit_code: f.required_i64("exit_code"),
        }
    }
}

/// A file actually uploaded by the task. Directory outputs are flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TesOutputFileLog {
    pub url: String,
    pub path: String,
    /// Size in bytes, as a string since JSON has no int64.
    pub size_bytes: String,
}

impl Schema for TesOutputFileLog {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            url: f.required_str("url"),
            path: f.required_absolute_path("path"),
            size_bytes: f.required_str("size_bytes"),
        }
    }
}

/// One attempt at running a task. Retries append further entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TesTaskLog {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<TesExecutorLog>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<TesOutputFileLog>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_logs: Option<Vec<String>>,
}

impl Schema for TesTaskLog {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            logs: f.list("logs", TesExecutorLog::read).unwrap_or_default(),
            metadata: f.optional_string_map("metadata"),
            start_time: f.optional_datetime("start_time"),
            end_time: f.optional_datetime("end_time"),
            outputs: f.list("outputs", TesOutputFileLog::read).unwrap_or_default(),
            system_logs: f.optional_string_list("system_logs"),
        }
    }
}

/// A TES task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TesTask {
    /// Server-assigned task identifier.
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,

    pub inputs: Vec<TesInput>,

    pub outputs: Vec<TesOutput>,

    /// Executors, run in order. At least one.
    pub executors: Vec<TesExecutor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<TesResources>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<TesTaskLog>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

impl TesTask {
    /// Create a task with a single executor.
    pub fn new(id: impl Into<String>, executor: TesExecutor) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            creation_time: None,
            state: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            executors: vec![executor],
            resources: None,
            volumes: None,
            logs: None,
            tags: None,
        }
    }

    /// Builder method to set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to add an input.
    pub fn with_input(mut self, input: TesInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Builder method to add an output.
    pub fn with_output(mut self, output: TesOutput) -> Self {
        self.outputs.push(output);
        self
    }

    /// The first task log, if any.
    pub fn first_log(&self) -> Option<&TesTaskLog> {
        self.logs.as_deref().and_then(<[_]>::first)
    }
}

impl Schema for TesTask {
    fn read(f: &mut Fields<'_>) -> Self {
        let task = Self {
            id: f.required_str("id"),
            name: f.optional_str("name"),
            description: f.optional_str("description"),
            creation_time: f.optional_datetime("creation_time"),
            state: f.optional_enum("state"),
            inputs: f.list("inputs", TesInput::read).unwrap_or_default(),
            outputs: f.list("outputs", TesOutput::read).unwrap_or_default(),
            executors: f.required_list("executors", TesExecutor::read),
            resources: f.object("resources", TesResources::read),
            volumes: f.optional_string_list("volumes"),
            logs: f.list("logs", TesTaskLog::read),
            tags: f.optional_string_map("tags"),
        };

        if task.executors.is_empty() && f.has("executors") {
            f.error("executors", "at least one executor is required");
        }
        for (i, volume) in task.volumes.iter().flatten().enumerate() {
            if !is_absolute(volume) {
                f.error(&format!("volumes[{i}]"), "must be an absolute path");
            }
        }
        task
    }
}
