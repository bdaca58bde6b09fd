//! WRROC profile resolution.
//!
//! A payload is tried against each tier from the most specific down, and the
//! first tier that validates wins. Trial failures are plain values; only the
//! exhausted search surfaces as a [`CoreError`].

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, FieldErrors, Vocabulary};
use crate::fields::{is_absolute_url, is_blank, Fields, Schema, Strictness, REQUIRED};
use crate::wrroc::{EntityRef, WrrocEntity, WrrocTesView, WrrocWesView};

const NOT_EMPTY: &str = "must not be empty";

/// A WRROC profile tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrrocProfile {
    Process,
    Workflow,
    Provenance,
}

impl WrrocProfile {
    /// Tiers in the order they are tried.
    pub const RESOLUTION_ORDER: [WrrocProfile; 3] = [
        WrrocProfile::Provenance,
        WrrocProfile::Workflow,
        WrrocProfile::Process,
    ];

    /// Validate `value` against this tier only.
    pub fn validate(self, value: &Value) -> Result<WrrocEntity, FieldErrors> {
        WrrocEntity::read_tier(self, value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "Process",
            Self::Workflow => "Workflow",
            Self::Provenance => "Provenance",
        }
    }
}

impl fmt::Display for WrrocProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the most specific tier `value` satisfies.
///
/// Fails with [`CoreError::ProfileResolution`] carrying the de-duplicated
/// union of every tier's errors when no tier matches.
pub fn resolve_wrroc(value: &Value) -> Result<(WrrocProfile, WrrocEntity), CoreError> {
    let mut errors = FieldErrors::new();
    for profile in WrrocProfile::RESOLUTION_ORDER {
        match profile.validate(value) {
            Ok(entity) => {
                debug!(profile = %profile, id = %entity.process().id, "Resolved WRROC profile");
                return Ok((profile, entity));
            }
            Err(tier_errors) => errors.union(tier_errors),
        }
    }
    Err(CoreError::ProfileResolution(errors))
}

/// Resolve `value` and check it carries what a TES task needs.
pub fn resolve_wrroc_for_tes(
    value: &Value,
    strictness: Strictness,
) -> Result<(WrrocProfile, WrrocTesView), CoreError> {
    let (profile, _) = resolve_wrroc(value)?;
    let view = read_view(value, strictness, Vocabulary::Tes, |view: &WrrocTesView, errors| {
        if is_blank(view.instrument.as_deref()) {
            errors.push("instrument", REQUIRED);
        }
        if view.object.is_empty() {
            errors.push("object", NOT_EMPTY);
        }
        for (i, entry) in view.object.iter().enumerate() {
            if entry.id.trim().is_empty() && is_blank(entry.text.as_deref()) {
                errors.push(format!("object[{i}].@id"), "required when text is empty");
            }
        }
        check_results(&view.result, errors);
    })?;
    Ok((profile, view))
}

/// Resolve `value` and check it carries what a WES run needs.
pub fn resolve_wrroc_for_wes(
    value: &Value,
    strictness: Strictness,
) -> Result<(WrrocProfile, WrrocWesView), CoreError> {
    let (profile, _) = resolve_wrroc(value)?;
    let view = read_view(value, strictness, Vocabulary::Wes, |view: &WrrocWesView, errors| {
        if is_blank(view.workflow_type.as_deref()) {
            errors.push("workflowType", REQUIRED);
        }
        if is_blank(view.workflow_version.as_deref()) {
            errors.push("workflowVersion", REQUIRED);
        }
        check_results(&view.result, errors);
    })?;
    Ok((profile, view))
}

fn read_view<T: Schema>(
    value: &Value,
    strictness: Strictness,
    target: Vocabulary,
    check: impl FnOnce(&T, &mut FieldErrors),
) -> Result<T, CoreError> {
    let view = Fields::record(value, "", strictness, T::read)
        .map_err(|errors| CoreError::ConversionField { target, errors })?;
    let mut errors = FieldErrors::new();
    check(&view, &mut errors);
    match errors.into_result() {
        Ok(()) => Ok(view),
        Err(errors) => Err(CoreError::ConversionField { target, errors }),
    }
}

fn check_results(result: &[EntityRef], errors: &mut FieldErrors) {
    if result.is_empty() {
        errors.push("result", NOT_EMPTY);
    }
    for (i, entry) in result.iter().enumerate() {
        if !is_absolute_url(&entry.id) {
            errors.push(format!("result[{i}].@id"), "must be an absolute URL");
        }
    }
}
