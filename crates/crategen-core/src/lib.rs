//! CrateGen Core Schema Types
//!
//! This crate contains the three vocabularies CrateGen translates between,
//! with no dependencies on:
//! - Filesystem or network I/O
//! - JSON text parsing
//! - Runtime specifics
//!
//! Payloads come in as parsed `serde_json::Value` trees and are validated
//! into typed records. Every validator reports all field errors it finds
//! instead of stopping at the first one.

pub mod error;
pub mod fields;
pub mod path;
pub mod profile;
pub mod state;
pub mod tes;
pub mod timestamp;
pub mod wes;
pub mod wrroc;

// Re-export commonly used types
pub use error::{CoreError, FieldError, FieldErrors, Vocabulary};
pub use fields::{Schema, Strictness};
pub use path::is_absolute;
pub use profile::{resolve_wrroc, resolve_wrroc_for_tes, resolve_wrroc_for_wes, WrrocProfile};
pub use state::State;
pub use tes::{
    FileType, TesExecutor, TesExecutorLog, TesInput, TesOutput, TesOutputFileLog, TesResources,
    TesTask, TesTaskLog,
};
pub use timestamp::normalize;
pub use wes::{RunLog, RunRequest, TaskLog, WesOutput, WesRun};
pub use wrroc::{
    EntityMap, EntityRef, ProcessFields, ProvenanceFields, WorkflowFields, WrrocEntity,
    WrrocProcess, WrrocProvenance, WrrocTesView, WrrocWesView, WrrocWorkflow,
};
