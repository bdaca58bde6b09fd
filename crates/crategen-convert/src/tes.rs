//! TES task <-> WRROC Process conversion.
//!
//! The mapping is lossy in both directions. WRROC has no place for the
//! executor command, resources, volumes, tags, or any log beyond the end
//! time of the first attempt; converting back yields a single executor with
//! an empty command and a single log entry. Inline input content travels as
//! the `text` of the object entry.

use crategen_core::tes::{has_wildcard, wildcard_prefix};
use crategen_core::{
    normalize, resolve_wrroc, resolve_wrroc_for_tes, EntityRef, Schema, TesExecutor, TesInput,
    TesOutput, TesTask, TesTaskLog, Vocabulary, WrrocTesView,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::converter::{Converted, Converter};
use crate::error::ConvertError;
use crate::notice::{push_dropped, Notice};

/// Converts TES tasks to and from WRROC.
#[derive(Debug, Clone, Copy, Default)]
pub struct TesConverter {
    config: Config,
}

impl TesConverter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Map a validated task onto the WRROC TES view.
    pub fn task_to_view(task: &TesTask) -> WrrocTesView {
        WrrocTesView {
            id: task.id.clone(),
            name: task.name.clone().unwrap_or_default(),
            description: task.description.clone().unwrap_or_default(),
            instrument: task.executors.first().map(|e| e.image.clone()),
            object: task.inputs.iter().map(input_ref).collect(),
            result: task
                .outputs
                .iter()
                .map(|output| EntityRef::new(&output.url, &output.path))
                .collect(),
            start_time: normalize(task.creation_time.as_deref()),
            end_time: task
                .first_log()
                .and_then(|log| normalize(log.end_time.as_deref())),
            extra: Map::new(),
        }
    }

    /// Rebuild a task from the WRROC TES view.
    ///
    /// Wildcard output paths get a `path_prefix` derived from the path.
    pub fn view_to_task(view: WrrocTesView) -> TesTask {
        let executor = TesExecutor::new(view.instrument.unwrap_or_default());
        let mut task = TesTask::new(view.id, executor);
        if !view.name.is_empty() {
            task = task.with_name(view.name);
        }
        task.description = Some(view.description).filter(|s| !s.is_empty());
        task.creation_time = view.start_time;
        for entry in view.object {
            let input = match entry.text {
                Some(text) if !text.trim().is_empty() => TesInput::from_content(text, entry.name),
                _ => TesInput::from_url(entry.id, entry.name),
            };
            task = task.with_input(input);
        }
        for entry in view.result {
            let mut output = TesOutput::new(entry.id, entry.name);
            if has_wildcard(&output.path) {
                output.path_prefix = Some(wildcard_prefix(&output.path));
            }
            task = task.with_output(output);
        }
        task.logs = Some(vec![TesTaskLog {
            end_time: view.end_time,
            ..TesTaskLog::default()
        }]);
        task
    }
}

fn input_ref(input: &TesInput) -> EntityRef {
    let entry = EntityRef::new(input.url.clone().unwrap_or_default(), &input.path);
    match &input.content {
        Some(content) => entry.with_text(content),
        None => entry,
    }
}

/// Task fields that do not survive the trip into WRROC.
fn dropped_fields(task: &TesTask) -> Vec<Notice> {
    let mut notices = Vec::new();
    push_dropped(
        &mut notices,
        "",
        &[
            ("state", task.state.is_some()),
            (
                "creation_time",
                task.creation_time.is_some() && normalize(task.creation_time.as_deref()).is_none(),
            ),
        ],
    );
    if let Some(e) = task.executors.first() {
        push_dropped(
            &mut notices,
            "executors[0].",
            &[
                ("command", !e.command.is_empty()),
                ("workdir", e.workdir.is_some()),
                ("stdin", e.stdin.is_some()),
                ("stdout", e.stdout.is_some()),
                ("stderr", e.stderr.is_some()),
                ("env", e.env.is_some()),
                ("ignore_error", e.ignore_error.is_some()),
            ],
        );
    }
    for i in 1..task.executors.len() {
        notices.push(Notice::dropped(format!("executors[{i}]")));
    }
    for (i, input) in task.inputs.iter().enumerate() {
        push_dropped(
            &mut notices,
            &format!("inputs[{i}]."),
            &[
                ("name", input.name.is_some()),
                ("description", input.description.is_some()),
                ("type", input.file_type.is_some()),
                ("streamable", input.streamable.is_some()),
            ],
        );
    }
    for (i, output) in task.outputs.iter().enumerate() {
        push_dropped(
            &mut notices,
            &format!("outputs[{i}]."),
            &[
                ("name", output.name.is_some()),
                ("description", output.description.is_some()),
                ("type", output.file_type.is_some()),
                ("path_prefix", output.path_prefix.is_some()),
            ],
        );
    }
    push_dropped(
        &mut notices,
        "",
        &[
            ("resources", task.resources.is_some()),
            ("volumes", task.volumes.is_some()),
            ("tags", task.tags.is_some()),
        ],
    );
    if let Some(log) = task.first_log() {
        push_dropped(
            &mut notices,
            "logs[0].",
            &[
                (
                    "end_time",
                    log.end_time.is_some() && normalize(log.end_time.as_deref()).is_none(),
                ),
                ("start_time", log.start_time.is_some()),
                ("logs", !log.logs.is_empty()),
                ("metadata", log.metadata.is_some()),
                ("outputs", !log.outputs.is_empty()),
                ("system_logs", log.system_logs.is_some()),
            ],
        );
    }
    for i in 1..task.logs.as_ref().map_or(0, Vec::len) {
        notices.push(Notice::dropped(format!("logs[{i}]")));
    }
    notices
}

/// What the WRROC side carries that a task cannot hold, and what had to be
/// filled in.
fn view_notices(view: &WrrocTesView) -> Vec<Notice> {
    let mut notices = vec![Notice::synthesized("executors[0].command", "[]")];
    for (i, entry) in view.object.iter().enumerate() {
        // inline content wins over the URL, as in TesInput
        let has_text = entry.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if has_text && !entry.id.is_empty() {
            notices.push(Notice::dropped(format!("object[{i}].@id")));
        }
    }
    for (i, entry) in view.result.iter().enumerate() {
        if entry.text.is_some() {
            notices.push(Notice::dropped(format!("result[{i}].text")));
        }
        if has_wildcard(&entry.name) {
            notices.push(Notice::synthesized(
                format!("outputs[{i}].path_prefix"),
                wildcard_prefix(&entry.name),
            ));
        }
    }
    for key in view.extra.keys() {
        notices.push(Notice::dropped(key.as_str()));
    }
    notices
}

impl Converter for TesConverter {
    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Tes
    }

    fn to_wrroc(&self, data: &Value) -> Result<Converted, ConvertError> {
        let task = TesTask::from_value_with(data, self.config.strictness)
            .map_err(ConvertError::source_error(Vocabulary::Tes))?;
        debug!(task_id = %task.id, "Converting TES task to WRROC");

        let notices = dropped_fields(&task);
        let data = serde_json::to_value(Self::task_to_view(&task))?;

        if self.config.revalidate_output {
            resolve_wrroc(&data).map_err(ConvertError::output_error(Vocabulary::Wrroc))?;
        }
        Ok(Converted::new(data, notices))
    }

    fn from_wrroc(&self, data: &Value) -> Result<Converted, ConvertError> {
        let (profile, view) = resolve_wrroc_for_tes(data, self.config.strictness)
            .map_err(ConvertError::source_error(Vocabulary::Wrroc))?;
        debug!(%profile, id = %view.id, "Converting WRROC entity to TES");

        let notices = view_notices(&view);
        let data = serde_json::to_value(Self::view_to_task(view))?;

        if self.config.revalidate_output {
            TesTask::from_value_with(&data, self.config.strictness)
                .map_err(ConvertError::output_error(Vocabulary::Tes))?;
        }
        Ok(Converted::new(data, notices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crategen_core::{CoreError, Strictness};
    use proptest::prelude::*;
    use serde_json::json;

    fn converter() -> TesConverter {
        TesConverter::default()
    }

    #[test]
    fn test_scenario_task_to_wrroc() {
        let task = json!({
            "id": "t1",
            "name": "n",
            "executors": [{"image": "img", "command": []}],
            "inputs": [{"url": "http://e/i", "path": "/in/i"}],
            "outputs": [{"url": "http://e/o", "path": "/out/o"}],
            "creation_time": "2024-01-01T00:00:00Z"
        });

        let converted = converter().to_wrroc(&task).unwrap();

        assert_eq!(
            converted.data,
            json!({
                "@id": "t1",
                "name": "n",
                "description": "",
                "instrument": "img",
                "object": [{"@id": "http://e/i", "name": "/in/i"}],
                "result": [{"@id": "http://e/o", "name": "/out/o"}],
                "startTime": "2024-01-01T00:00:00Z",
                "endTime": null
            })
        );
        assert!(converted.notices.is_empty());
    }

    #[test]
    fn test_timestamps_are_normalized() {
        let task = json!({
            "id": "t1",
            "executors": [{"image": "img", "command": ["echo"]}],
            "creation_time": "2024-10-15T18:14:34.948996Z",
            "logs": [
                {"end_time": "2024-10-15T20:00:00.1+02:00"},
                {"end_time": "2024-10-16T00:00:00Z"}
            ]
        });

        let converted = converter().to_wrroc(&task).unwrap();

        assert_eq!(converted.data["startTime"], "2024-10-15T18:14:34Z");
        assert_eq!(converted.data["endTime"], "2024-10-15T18:00:00Z");
        assert_eq!(
            converted.notices,
            vec![
                Notice::dropped("executors[0].command"),
                Notice::dropped("logs[1]"),
            ]
        );
    }

    #[test]
    fn test_lossy_fields_are_reported() {
        let task = json!({
            "id": "t1",
            "state": "COMPLETE",
            "creation_time": "2024-10-15T18:14:34+05:30",
            "executors": [
                {
                    "image": "a",
                    "command": ["run"],
                    "workdir": "/work",
                    "stdout": "/work/out.log",
                    "env": {"K": "v"}
                },
                {"image": "b", "command": []}
            ],
            "inputs": [{"name": "in", "url": "http://e/i", "path": "/in/i", "type": "DIRECTORY"}],
            "outputs": [{
                "description": "d",
                "url": "http://e/o",
                "path": "/out/*.txt",
                "path_prefix": "/out"
            }],
            "resources": {"cpu_cores": 2},
            "volumes": ["/scratch"],
            "tags": {"team": "x"},
            "logs": [{"start_time": "2024-01-01T00:00:00Z", "system_logs": ["oom"]}]
        });

        let converted = converter().to_wrroc(&task).unwrap();

        assert_eq!(converted.data["instrument"], "a");
        let fields: Vec<&str> = converted.notices.iter().map(Notice::field).collect();
        assert_eq!(
            fields,
            vec![
                "state",
                "executors[0].command",
                "executors[0].workdir",
                "executors[0].stdout",
                "executors[0].env",
                "executors[1]",
                "inputs[0].name",
                "inputs[0].type",
                "outputs[0].description",
                "outputs[0].path_prefix",
                "resources",
                "volumes",
                "tags",
                "logs[0].start_time",
                "logs[0].system_logs",
            ]
        );
        assert_eq!(converted.data["startTime"], "2024-10-15T12:44:34Z");
    }

    #[test]
    fn test_unnormalizable_timestamps_are_reported() {
        let mut task = TesTask::new("t1", TesExecutor::new("img"));
        task.creation_time = Some("2024-10-15 18:14:34".to_string());
        task.logs = Some(vec![TesTaskLog {
            end_time: Some("yesterday".to_string()),
            ..TesTaskLog::default()
        }]);

        assert_eq!(
            dropped_fields(&task),
            vec![
                Notice::dropped("creation_time"),
                Notice::dropped("logs[0].end_time"),
            ]
        );
    }

    #[test]
    fn test_invalid_task_propagates_field_errors() {
        let task = json!({
            "id": "t1",
            "executors": [{"image": "img", "command": [], "stdout": "out.txt"}],
            "outputs": [{"url": "http://e/a", "path": "/out/*.txt"}]
        });

        let err = converter().to_wrroc(&task).unwrap_err();

        assert!(matches!(
            err,
            ConvertError::InvalidSource {
                vocabulary: Vocabulary::Tes,
                source: CoreError::Structural(_)
            }
        ));
        let errors = err.field_errors().unwrap();
        assert!(errors.contains_path("executors[0].stdout"));
        assert!(errors.contains_path("outputs[0].path_prefix"));
    }

    #[test]
    fn test_wrroc_to_task() {
        let wrroc = json!({
            "@context": "https://w3id.org/ro/crate/1.1/context",
            "@id": "t1",
            "name": "n",
            "instrument": "img",
            "object": [{"@id": "http://e/i", "name": "/in/i"}],
            "result": [{"@id": "http://e/o", "name": "/out/o"}],
            "startTime": "2024-01-01T00:00:00Z",
            "endTime": "2024-01-01T01:00:00Z"
        });

        let converted = converter().from_wrroc(&wrroc).unwrap();

        assert_eq!(
            converted.data,
            json!({
                "id": "t1",
                "name": "n",
                "creation_time": "2024-01-01T00:00:00Z",
                "inputs": [{"url": "http://e/i", "path": "/in/i"}],
                "outputs": [{"url": "http://e/o", "path": "/out/o"}],
                "executors": [{"image": "img", "command": []}],
                "logs": [{"end_time": "2024-01-01T01:00:00Z"}]
            })
        );
        assert_eq!(
            converted.notices,
            vec![Notice::synthesized("executors[0].command", "[]")]
        );
    }

    #[test]
    fn test_wildcard_output_round_trip() {
        let task = json!({
            "id": "t1",
            "executors": [{"image": "img", "command": []}],
            "inputs": [{"url": "http://e/i", "path": "/in/i"}],
            "outputs": [{"url": "http://e/o", "path": "/out/*.txt", "path_prefix": "/out"}]
        });

        let wrroc = converter().to_wrroc(&task).unwrap();
        assert!(wrroc.notices.contains(&Notice::dropped("outputs[0].path_prefix")));

        let back = converter().from_wrroc(&wrroc.data).unwrap();
        assert_eq!(back.data["outputs"], task["outputs"]);
        assert!(back
            .notices
            .contains(&Notice::synthesized("outputs[0].path_prefix", "/out")));
    }

    #[test]
    fn test_inline_content_round_trip() {
        let task = json!({
            "id": "t1",
            "executors": [{"image": "img", "command": []}],
            "inputs": [{"content": "hello", "path": "/in/i"}],
            "outputs": [{"url": "http://e/o", "path": "/out/o"}]
        });

        let wrroc = converter().to_wrroc(&task).unwrap();
        assert_eq!(
            wrroc.data["object"],
            json!([{"@id": "", "name": "/in/i", "text": "hello"}])
        );
        assert!(wrroc.notices.is_empty());

        let back = converter().from_wrroc(&wrroc.data).unwrap();
        assert_eq!(back.data["inputs"], task["inputs"]);
    }

    #[test]
    fn test_wrroc_only_fields_are_reported() {
        let wrroc = json!({
            "@context": "https://w3id.org/ro/crate/1.1/context",
            "@type": "CreateAction",
            "@id": "t1",
            "name": "n",
            "instrument": "img",
            "agent": {"@id": "https://orcid.org/0000-0000"},
            "object": [{"@id": "http://e/i", "name": "/in/i", "text": "hi"}],
            "result": [{"@id": "http://e/o", "name": "/out/o", "text": "done"}]
        });

        let converted = converter().from_wrroc(&wrroc).unwrap();

        assert_eq!(
            converted.notices,
            vec![
                Notice::synthesized("executors[0].command", "[]"),
                Notice::dropped("object[0].@id"),
                Notice::dropped("result[0].text"),
                Notice::dropped("agent"),
            ]
        );
        assert_eq!(converted.data["inputs"], json!([{"path": "/in/i", "content": "hi"}]));
    }

    #[test]
    fn test_wrroc_without_outputs_cannot_become_task() {
        let wrroc = json!({
            "@id": "t1",
            "name": "n",
            "instrument": "img",
            "object": [{"@id": "http://e/i", "name": "/in/i"}]
        });

        let err = converter().from_wrroc(&wrroc).unwrap_err();

        let Some(CoreError::ConversionField { target, errors }) = err.core() else {
            panic!("expected conversion field error, got {err}");
        };
        assert_eq!(*target, Vocabulary::Tes);
        assert!(errors.contains_path("result"));
    }

    #[test]
    fn test_output_revalidation_catches_bad_paths() {
        let wrroc = json!({
            "@id": "t1",
            "name": "n",
            "instrument": "img",
            "object": [{"@id": "http://e/i", "name": "relative/in"}],
            "result": [{"@id": "http://e/o", "name": "/out/o"}]
        });

        let err = converter().from_wrroc(&wrroc).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidOutput {
                vocabulary: Vocabulary::Tes,
                ..
            }
        ));
        assert!(err.field_errors().unwrap().contains_path("inputs[0].path"));

        let lax = TesConverter::new(Config::default().with_revalidate_output(false));
        assert!(lax.from_wrroc(&wrroc).is_ok());
    }

    #[test]
    fn test_strict_rejects_unknown_task_fields() {
        let task = json!({
            "id": "t1",
            "executors": [{"image": "img", "command": [], "gpu": true}]
        });
        let strict = TesConverter::new(Config::default().with_strictness(Strictness::Strict));

        assert!(converter().to_wrroc(&task).is_ok());
        let err = strict.to_wrroc(&task).unwrap_err();
        assert!(err.field_errors().unwrap().contains_path("executors[0].gpu"));
    }

    fn file_pair(dir: &'static str) -> impl Strategy<Value = (String, String)> {
        ("[a-z]{1,8}", "[a-z]{1,8}\\.[a-z]{2,3}").prop_map(move |(host, file)| {
            (format!("https://{host}.org/{file}"), format!("/{dir}/{file}"))
        })
    }

    proptest! {
        #[test]
        fn test_round_trip_preserves_core_fields(
            id in "[a-z0-9-]{1,16}",
            name in proptest::option::of("[a-zA-Z0-9 ]{1,16}"),
            description in proptest::option::of("[a-zA-Z0-9 ]{1,32}"),
            image in "[a-z]{1,10}(:[0-9]{1,2})?",
            inputs in proptest::collection::vec(file_pair("in"), 1..4),
            outputs in proptest::collection::vec(file_pair("out"), 1..4),
        ) {
            let mut task = TesTask::new(id, TesExecutor::new(image));
            task.name = name;
            task.description = description;
            task.inputs = inputs.iter().map(|(u, p)| TesInput::from_url(u, p)).collect();
            task.outputs = outputs.iter().map(|(u, p)| TesOutput::new(u, p)).collect();

            let converter = TesConverter::default();
            let wrroc = converter.to_wrroc(&serde_json::to_value(&task).unwrap()).unwrap();
            let back = converter.from_wrroc(&wrroc.data).unwrap();
            let back = TesTask::from_value(&back.data).unwrap();

            prop_assert_eq!(&back.id, &task.id);
            prop_assert_eq!(&back.name, &task.name);
            prop_assert_eq!(&back.description, &task.description);
            prop_assert_eq!(&back.executors[0].image, &task.executors[0].image);
            prop_assert_eq!(&back.inputs, &task.inputs);
            prop_assert_eq!(&back.outputs, &task.outputs);
        }
    }
}
