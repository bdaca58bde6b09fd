//! Workflow Run RO-Crate (WRROC) profile tiers and conversion views.
//!
//! The three tiers are explicit field sets rather than a type hierarchy:
//!
//! | Tier | Adds |
//! |---|---|
//! | Process | `@id`, `name`, `description`, `startTime`, `endTime`, `object`, `profiles` |
//! | Workflow | `workflowType`, `workflowVersion`, `result`, `hasPart` |
//! | Provenance | `provenanceData`, `agents`, `activity`, `generatedBy`, `used` |
//!
//! Each tier's required fields include the tier below it, so a payload that
//! satisfies a tier also satisfies every lower tier.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FieldErrors;
use crate::fields::{Fields, Schema, Strictness};
use crate::profile::WrrocProfile;
use crate::state::State;

/// Required keys of the Process tier.
pub const PROCESS_REQUIRED: &[&str] = &["@id", "name"];

/// Required keys of the Workflow tier.
pub const WORKFLOW_REQUIRED: &[&str] = &["@id", "name", "workflowType"];

/// Required keys of the Provenance tier.
pub const PROVENANCE_REQUIRED: &[&str] = &["@id", "name", "workflowType", "provenanceData"];

/// JSON-LD keys every view tolerates even in strict mode.
const JSON_LD_KEYS: [&str; 2] = ["@context", "@type"];

/// Reference to an input or output file, as used by the TES and WES views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    /// Inline file content, for inputs that have no URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            text: None,
        }
    }

    /// Builder method to set inline content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl Schema for EntityRef {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            id: f.required_str_any(&["@id", "id"]),
            name: f.required_str("name"),
            text: f.optional_str("text"),
        }
    }
}

/// A tier-level reference: any flat string map, usually `{"@id": ...}`.
pub type EntityMap = HashMap<String, String>;

/// Process tier fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessFields {
    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    pub description: String,

    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    /// Inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Vec<EntityMap>>,

    /// RO-Crate profile URIs the payload conforms to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
}

impl ProcessFields {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            id: f.required_str_any(&["@id", "id"]),
            name: f.required_str("name"),
            description: f.optional_str("description").unwrap_or_default(),
            start_time: f.optional_datetime("startTime"),
            end_time: f.optional_datetime("endTime"),
            object: f.optional_string_map_list("object"),
            profiles: f.optional_url_list("profiles"),
        }
    }
}

/// Fields the Workflow tier adds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowFields {
    #[serde(rename = "workflowType")]
    pub workflow_type: String,

    #[serde(rename = "workflowVersion", skip_serializing_if = "Option::is_none")]
    pub workflow_version: Option<String>,

    /// Outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<EntityMap>>,

    /// Steps of the workflow.
    #[serde(rename = "hasPart", skip_serializing_if = "Option::is_none")]
    pub has_part: Option<Vec<String>>,
}

impl WorkflowFields {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            workflow_type: f.required_str("workflowType"),
            workflow_version: f.optional_str("workflowVersion"),
            result: f.optional_string_map_list("result"),
            has_part: f.optional_url_list("hasPart"),
        }
    }
}

/// Fields the Provenance tier adds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceFields {
    #[serde(rename = "provenanceData")]
    pub provenance_data: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<EntityMap>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Vec<EntityMap>>,

    #[serde(rename = "generatedBy", skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<Vec<String>>,
}

impl ProvenanceFields {
    fn read(f: &mut Fields<'_>) -> Self {
        Self {
            provenance_data: f.required_str("provenanceData"),
            agents: f.optional_string_map_list("agents"),
            activity: f.optional_string_map_list("activity"),
            generated_by: f.optional_url_list("generatedBy"),
            used: f.optional_url_list("used"),
        }
    }
}

/// Payload validated against the Process tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrrocProcess {
    #[serde(flatten)]
    pub process: ProcessFields,

    /// Keys outside the tier's field set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload validated against the Workflow tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrrocWorkflow {
    #[serde(flatten)]
    pub process: ProcessFields,

    #[serde(flatten)]
    pub workflow: WorkflowFields,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload validated against the Provenance tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrrocProvenance {
    #[serde(flatten)]
    pub process: ProcessFields,

    #[serde(flatten)]
    pub workflow: WorkflowFields,

    #[serde(flatten)]
    pub provenance: ProvenanceFields,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A WRROC payload validated against one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WrrocEntity {
    Process(WrrocProcess),
    Workflow(WrrocWorkflow),
    Provenance(WrrocProvenance),
}

impl WrrocEntity {
    /// Validate `value` against exactly one tier. Tiers never reject
    /// unknown keys.
    pub fn read_tier(profile: WrrocProfile, value: &Value) -> Result<Self, FieldErrors> {
        Fields::record(value, "", Strictness::Lenient, |f| match profile {
            WrrocProfile::Process => {
                let process = ProcessFields::read(f);
                Self::Process(WrrocProcess {
                    process,
                    extra: f.remaining(),
                })
            }
            WrrocProfile::Workflow => {
                let process = ProcessFields::read(f);
                let workflow = WorkflowFields::read(f);
                Self::Workflow(WrrocWorkflow {
                    process,
                    workflow,
                    extra: f.remaining(),
                })
            }
            WrrocProfile::Provenance => {
                let process = ProcessFields::read(f);
                let workflow = WorkflowFields::read(f);
                let provenance = ProvenanceFields::read(f);
                Self::Provenance(WrrocProvenance {
                    process,
                    workflow,
                    provenance,
                    extra: f.remaining(),
                })
            }
        })
    }

    /// Fields shared by every tier.
    pub fn process(&self) -> &ProcessFields {
        match self {
            Self::Process(e) => &e.process,
            Self::Workflow(e) => &e.process,
            Self::Provenance(e) => &e.process,
        }
    }
}

/// The WRROC fields a TES task maps to. Also the shape TES converts into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrrocTesView {
    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    pub description: String,

    /// Container image of the first executor.
    pub instrument: Option<String>,

    pub object: Vec<EntityRef>,

    pub result: Vec<EntityRef>,

    #[serde(rename = "startTime")]
    pub start_time: Option<String>,

    #[serde(rename = "endTime")]
    pub end_time: Option<String>,

    /// Keys with no TES counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema for WrrocTesView {
    fn read(f: &mut Fields<'_>) -> Self {
        for key in JSON_LD_KEYS {
            f.ignore(key);
        }
        Self {
            id: f.required_str_any(&["@id", "id"]),
            name: f.required_str("name"),
            description: f.optional_str("description").unwrap_or_default(),
            instrument: f.optional_str("instrument"),
            object: f.list("object", EntityRef::read).unwrap_or_default(),
            result: f.list("result", EntityRef::read).unwrap_or_default(),
            start_time: f.optional_datetime("startTime"),
            end_time: f.optional_datetime("endTime"),
            extra: f.remaining(),
        }
    }
}

/// The WRROC fields a WES run maps to. Also the shape WES converts into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrrocWesView {
    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    pub status: Option<State>,

    #[serde(rename = "startTime")]
    pub start_time: Option<String>,

    #[serde(rename = "endTime")]
    pub end_time: Option<String>,

    #[serde(rename = "workflowType")]
    pub workflow_type: Option<String>,

    #[serde(rename = "workflowVersion")]
    pub workflow_version: Option<String>,

    pub object: Vec<EntityRef>,

    pub result: Vec<EntityRef>,

    /// Keys with no WES counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema for WrrocWesView {
    fn read(f: &mut Fields<'_>) -> Self {
        for key in JSON_LD_KEYS {
            f.ignore(key);
        }
        Self {
            id: f.required_str_any(&["@id", "id"]),
            name: f.required_str("name"),
            status: f.optional_enum("status"),
            start_time: f.optional_datetime("startTime"),
            end_time: f.optional_datetime("endTime"),
            workflow_type: f.optional_str("workflowType"),
            workflow_version: f.optional_str("workflowVersion"),
            object: f.list("object", EntityRef::read).unwrap_or_default(),
            result: f.list("result", EntityRef::read).unwrap_or_default(),
            extra: f.remaining(),
        }
    }
}
