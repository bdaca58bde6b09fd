//! WES run <-> WRROC Workflow conversion.
//!
//! WRROC keeps the descriptor type and version but not the descriptor URL,
//! so a run rebuilt from WRROC carries [`WORKFLOW_URL_PLACEHOLDER`] in
//! `request.workflow_url` and a matching [`Notice::Synthesized`]. A run
//! without a request goes out with [`WORKFLOW_TYPE_PLACEHOLDER`] and
//! [`WORKFLOW_VERSION_PLACEHOLDER`] so that it can come back.

use std::collections::HashSet;

use crategen_core::{
    normalize, resolve_wrroc, resolve_wrroc_for_wes, EntityRef, RunLog, RunRequest, Schema,
    Vocabulary, WesOutput, WesRun, WrrocWesView,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::converter::{Converted, Converter};
use crate::error::ConvertError;
use crate::notice::{push_dropped, Notice};

/// Stand-in for the workflow descriptor URL, which WRROC does not retain.
pub const WORKFLOW_URL_PLACEHOLDER: &str = "WORKFLOW_URL_PLACEHOLDER";

/// Stand-in for `workflowType` when the run has no request.
pub const WORKFLOW_TYPE_PLACEHOLDER: &str = "WORKFLOW_TYPE_PLACEHOLDER";

/// Stand-in for `workflowVersion` when the run has no request.
pub const WORKFLOW_VERSION_PLACEHOLDER: &str = "WORKFLOW_VERSION_PLACEHOLDER";

/// Converts WES runs to and from WRROC.
#[derive(Debug, Clone, Copy, Default)]
pub struct WesConverter {
    config: Config,
}

impl WesConverter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Map a validated run onto the WRROC WES view.
    pub fn run_to_view(run: &WesRun) -> WrrocWesView {
        let log = run.run_log.as_ref();
        let request = run.request.as_ref();
        WrrocWesView {
            id: run.run_id.clone(),
            name: log.and_then(|l| l.name.clone()).unwrap_or_default(),
            status: run.state,
            start_time: log.and_then(|l| normalize(l.start_time.as_deref())),
            end_time: log.and_then(|l| normalize(l.end_time.as_deref())),
            workflow_type: Some(or_placeholder(
                request.map(|r| r.workflow_type.as_str()),
                WORKFLOW_TYPE_PLACEHOLDER,
            )),
            workflow_version: Some(or_placeholder(
                request.map(|r| r.workflow_type_version.as_str()),
                WORKFLOW_VERSION_PLACEHOLDER,
            )),
            object: request
                .map(|r| {
                    r.string_params()
                        .map(|(name, location)| EntityRef::new(location, name))
                        .collect()
                })
                .unwrap_or_default(),
            result: run
                .outputs
                .iter()
                .map(|output| EntityRef::new(&output.location, &output.name))
                .collect(),
            extra: Map::new(),
        }
    }

    /// Rebuild a run from the WRROC WES view.
    ///
    /// When two `object` entries share a name the first one wins.
    pub fn view_to_run(view: WrrocWesView) -> WesRun {
        let mut workflow_params = Map::new();
        for entry in view.object {
            if !workflow_params.contains_key(&entry.name) {
                workflow_params.insert(entry.name, Value::String(entry.id));
            }
        }

        let mut run = WesRun::new(view.id);
        run.state = view.status;
        run.request = Some(RunRequest {
            workflow_params,
            workflow_type: view.workflow_type.unwrap_or_default(),
            workflow_type_version: view.workflow_version.unwrap_or_default(),
            workflow_url: WORKFLOW_URL_PLACEHOLDER.to_string(),
            tags: None,
            workflow_engine_parameters: None,
            workflow_engine: None,
            workflow_engine_version: None,
        });
        run.run_log = Some(RunLog {
            name: Some(view.name).filter(|s| !s.is_empty()),
            start_time: view.start_time,
            end_time: view.end_time,
            ..RunLog::default()
        });
        run.outputs = view
            .result
            .into_iter()
            .map(|entry| WesOutput::new(entry.id, entry.name))
            .collect();
        run
    }
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

fn normalizes(raw: Option<&str>) -> bool {
    raw.is_none() || normalize(raw).is_some()
}

/// Run fields that do not survive the trip into WRROC, and what had to be
/// filled in.
fn run_notices(run: &WesRun) -> Vec<Notice> {
    let mut notices: Vec<Notice> = run
        .deprecated_fields()
        .into_iter()
        .map(|(field, replacement)| Notice::deprecated(field, replacement))
        .collect();

    let request = run.request.as_ref();
    if let Some(r) = request {
        notices.push(Notice::dropped("request.workflow_url"));
        for (key, value) in &r.workflow_params {
            if !value.is_string() {
                notices.push(Notice::dropped(format!("request.workflow_params.{key}")));
            }
        }
        push_dropped(
            &mut notices,
            "request.",
            &[
                ("tags", r.tags.is_some()),
                ("workflow_engine_parameters", r.workflow_engine_parameters.is_some()),
                ("workflow_engine", r.workflow_engine.is_some()),
                ("workflow_engine_version", r.workflow_engine_version.is_some()),
            ],
        );
    }
    if request.map_or(true, |r| r.workflow_type.trim().is_empty()) {
        notices.push(Notice::synthesized("workflowType", WORKFLOW_TYPE_PLACEHOLDER));
    }
    if request.map_or(true, |r| r.workflow_type_version.trim().is_empty()) {
        notices.push(Notice::synthesized(
            "workflowVersion",
            WORKFLOW_VERSION_PLACEHOLDER,
        ));
    }

    if let Some(log) = &run.run_log {
        push_dropped(
            &mut notices,
            "run_log.",
            &[
                ("cmd", log.cmd.is_some()),
                ("start_time", !normalizes(log.start_time.as_deref())),
                ("end_time", !normalizes(log.end_time.as_deref())),
                ("stdout", log.stdout.is_some()),
                ("stderr", log.stderr.is_some()),
                ("exit_code", log.exit_code.is_some()),
                ("system_logs", log.system_logs.is_some()),
            ],
        );
    }
    if run.task_logs_url.is_some() {
        notices.push(Notice::dropped("task_logs_url"));
    }
    notices
}

/// What the WRROC side carries that a run cannot hold, and what had to be
/// filled in.
fn view_notices(view: &WrrocWesView) -> Vec<Notice> {
    let mut notices = vec![Notice::synthesized(
        "request.workflow_url",
        WORKFLOW_URL_PLACEHOLDER,
    )];
    let mut names = HashSet::new();
    for (i, entry) in view.object.iter().enumerate() {
        if !names.insert(entry.name.as_str()) {
            notices.push(Notice::dropped(format!("object[{i}]")));
        } else if entry.text.is_some() {
            notices.push(Notice::dropped(format!("object[{i}].text")));
        }
    }
    for (i, entry) in view.result.iter().enumerate() {
        if entry.text.is_some() {
            notices.push(Notice::dropped(format!("result[{i}].text")));
        }
    }
    for key in view.extra.keys() {
        notices.push(Notice::dropped(key.as_str()));
    }
    notices
}

impl Converter for WesConverter {
    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Wes
    }

    fn to_wrroc(&self, data: &Value) -> Result<Converted, ConvertError> {
        let run = WesRun::from_value_with(data, self.config.strictness)
            .map_err(ConvertError::source_error(Vocabulary::Wes))?;
        debug!(run_id = %run.run_id, "Converting WES run to WRROC");

        let notices = run_notices(&run);
        let data = serde_json::to_value(Self::run_to_view(&run))?;

        if self.config.revalidate_output {
            resolve_wrroc(&data).map_err(ConvertError::output_error(Vocabulary::Wrroc))?;
        }
        Ok(Converted::new(data, notices))
    }

    fn from_wrroc(&self, data: &Value) -> Result<Converted, ConvertError> {
        let (profile, view) = resolve_wrroc_for_wes(data, self.config.strictness)
            .map_err(ConvertError::source_error(Vocabulary::Wrroc))?;
        debug!(%profile, id = %view.id, "Converting WRROC entity to WES");

        let notices = view_notices(&view);
        let data = serde_json::to_value(Self::view_to_run(view))?;

        if self.config.revalidate_output {
            WesRun::from_value_with(&data, self.config.strictness)
                .map_err(ConvertError::output_error(Vocabulary::Wes))?;
        }
        Ok(Converted::new(data, notices))
    }
}
