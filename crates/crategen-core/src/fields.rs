//! Field-by-field reader used by every schema validator.
//!
//! A [`Fields`] wraps one JSON object and records a [`FieldErrors`] entry for
//! each problem it finds, so a validator reports every bad field in one pass.
//! `null` is treated the same as an absent key.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{CoreError, FieldErrors};
use crate::path::is_absolute;
use crate::timestamp::is_rfc3339;

/// How unknown keys are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Unknown keys are accepted (forward-compatible).
    #[default]
    Lenient,
    /// Unknown keys are reported as errors.
    Strict,
}

pub(crate) const REQUIRED: &str = "field is required";

pub(crate) fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn index(prefix: &str, i: usize) -> String {
    format!("{prefix}[{i}]")
}

/// Returns true if `value` is absent or only whitespace.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Returns true if `raw` parses as a URL with a scheme and an authority.
pub fn is_absolute_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| url.has_host())
}

/// A record type that can be validated out of a JSON object.
pub trait Schema: Sized {
    /// Read this record's fields, recording every problem in `fields`.
    fn read(fields: &mut Fields<'_>) -> Self;

    /// Validate `value` with unknown fields allowed.
    fn from_value(value: &Value) -> Result<Self, CoreError> {
        Self::from_value_with(value, Strictness::Lenient)
    }

    /// Validate `value`.
    fn from_value_with(value: &Value, strictness: Strictness) -> Result<Self, CoreError> {
        Fields::record(value, "", strictness, Self::read).map_err(CoreError::Structural)
    }
}

/// Reader over one JSON object.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    prefix: String,
    strictness: Strictness,
    seen: HashSet<&'static str>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    /// Start reading `value`, which must be a JSON object.
    pub fn new(
        value: &'a Value,
        prefix: impl Into<String>,
        strictness: Strictness,
    ) -> Result<Self, FieldErrors> {
        let prefix = prefix.into();
        match value.as_object() {
            Some(map) => Ok(Self {
                map,
                prefix,
                strictness,
                seen: HashSet::new(),
                errors: FieldErrors::new(),
            }),
            None => {
                let mut errors = FieldErrors::new();
                errors.push(prefix, "expected an object");
                Err(errors)
            }
        }
    }

    /// Read a whole record: open `value`, run `read`, then check unknown keys.
    pub fn record<T>(
        value: &'a Value,
        prefix: &str,
        strictness: Strictness,
        read: impl FnOnce(&mut Fields<'a>) -> T,
    ) -> Result<T, FieldErrors> {
        let mut fields = Fields::new(value, prefix, strictness)?;
        let out = read(&mut fields);
        fields.finish().map(|()| out)
    }

    /// Report unknown keys (in strict mode) and return the collected errors.
    pub fn finish(mut self) -> Result<(), FieldErrors> {
        if self.strictness == Strictness::Strict {
            let unknown: Vec<String> = self
                .map
                .keys()
                .filter(|k| !self.seen.contains(k.as_str()))
                .cloned()
                .collect();
            for key in unknown {
                let path = self.path(&key);
                self.errors.push(path, "unknown field");
            }
        }
        self.errors.into_result()
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Path of `key` below this record.
    pub fn path(&self, key: &str) -> String {
        join(&self.prefix, key)
    }

    /// Record an error against `key`.
    pub fn error(&mut self, key: &str, message: impl Into<String>) {
        let path = self.path(key);
        self.errors.push(path, message);
    }

    /// Keys not consumed by any reader call so far.
    pub fn remaining(&self) -> Map<String, Value> {
        self.map
            .iter()
            .filter(|(k, _)| !self.seen.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns true if `key` is present and not null. Does not consume it.
    pub fn has(&self, key: &str) -> bool {
        self.map.get(key).is_some_and(|v| !v.is_null())
    }

    fn get(&mut self, key: &'static str) -> Option<&'a Value> {
        self.seen.insert(key);
        let map = self.map;
        map.get(key).filter(|v| !v.is_null())
    }

    fn require(&mut self, key: &'static str) -> Option<&'a Value> {
        let value = self.get(key);
        if value.is_none() {
            self.error(key, REQUIRED);
        }
        value
    }

    fn as_str(&mut self, key: &'static str, value: &'a Value) -> Option<String> {
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.error(key, "expected a string");
                None
            }
        }
    }

    pub fn optional_str(&mut self, key: &'static str) -> Option<String> {
        let value = self.get(key)?;
        self.as_str(key, value)
    }

    /// Required string; returns an empty string after recording the error.
    pub fn required_str(&mut self, key: &'static str) -> String {
        self.require(key)
            .and_then(|v| self.as_str(key, v))
            .unwrap_or_default()
    }

    /// Required string stored under the first present key of `keys`.
    /// Errors are reported against `keys[0]`.
    pub fn required_str_any(&mut self, keys: &[&'static str]) -> String {
        let primary = keys[0];
        for &key in keys {
            if let Some(value) = self.get(key) {
                return match value.as_str() {
                    Some(s) => s.to_string(),
                    None => {
                        self.error(primary, "expected a string");
                        String::new()
                    }
                };
            }
        }
        self.error(primary, REQUIRED);
        String::new()
    }

    pub fn optional_bool(&mut self, key: &'static str) -> Option<bool> {
        let value = self.get(key)?;
        let out = value.as_bool();
        if out.is_none() {
            self.error(key, "expected a boolean");
        }
        out
    }

    pub fn optional_i64(&mut self, key: &'static str) -> Option<i64> {
        let value = self.get(key)?;
        let out = value.as_i64();
        if out.is_none() {
            self.error(key, "expected an integer");
        }
        out
    }

    pub fn required_i64(&mut self, key: &'static str) -> i64 {
        match self.require(key) {
            Some(_) => self.optional_i64(key).unwrap_or_default(),
            None => 0,
        }
    }

    pub fn optional_f64(&mut self, key: &'static str) -> Option<f64> {
        let value = self.get(key)?;
        let out = value.as_f64();
        if out.is_none() {
            self.error(key, "expected a number");
        }
        out
    }

    pub fn optional_string_list(&mut self, key: &'static str) -> Option<Vec<String>> {
        let value = self.get(key)?;
        let Some(items) = value.as_array() else {
            self.error(key, "expected an array");
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => {
                    let path = index(&self.path(key), i);
                    self.errors.push(path, "expected a string");
                }
            }
        }
        Some(out)
    }

    pub fn required_string_list(&mut self, key: &'static str) -> Vec<String> {
        match self.require(key) {
            Some(_) => self.optional_string_list(key).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn optional_string_map(&mut self, key: &'static str) -> Option<HashMap<String, String>> {
        let value = self.get(key)?;
        let Some(map) = value.as_object() else {
            self.error(key, "expected an object");
            return None;
        };
        let mut out = HashMap::with_capacity(map.len());
        for (k, v) in map {
            match v.as_str() {
                Some(s) => {
                    out.insert(k.clone(), s.to_string());
                }
                None => {
                    let path = join(&self.path(key), k);
                    self.errors.push(path, "expected a string");
                }
            }
        }
        Some(out)
    }

    pub fn optional_object(&mut self, key: &'static str) -> Option<Map<String, Value>> {
        let value = self.get(key)?;
        let out = value.as_object().cloned();
        if out.is_none() {
            self.error(key, "expected an object");
        }
        out
    }

    pub fn required_object(&mut self, key: &'static str) -> Map<String, Value> {
        match self.require(key) {
            Some(_) => self.optional_object(key).unwrap_or_default(),
            None => Map::new(),
        }
    }

    /// Optional RFC 3339 timestamp, kept in its original text form.
    pub fn optional_datetime(&mut self, key: &'static str) -> Option<String> {
        let raw = self.optional_str(key)?;
        if is_rfc3339(&raw) {
            Some(raw)
        } else {
            self.error(key, "must be in the RFC 3339 format");
            None
        }
    }

    /// Optional enum decoded from its string wire form.
    pub fn optional_enum<T: DeserializeOwned>(&mut self, key: &'static str) -> Option<T> {
        let raw = self.optional_str(key)?;
        match serde_json::from_value(Value::String(raw.clone())) {
            Ok(v) => Some(v),
            Err(_) => {
                self.error(key, format!("unrecognized value '{raw}'"));
                None
            }
        }
    }

    pub fn optional_absolute_path(&mut self, key: &'static str) -> Option<String> {
        let raw = self.optional_str(key)?;
        if is_absolute(&raw) {
            Some(raw)
        } else {
            self.error(key, "must be an absolute path");
            None
        }
    }

    pub fn required_absolute_path(&mut self, key: &'static str) -> String {
        match self.require(key) {
            Some(_) => self.optional_absolute_path(key).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Optional list of absolute URLs (scheme and authority).
    pub fn optional_url_list(&mut self, key: &'static str) -> Option<Vec<String>> {
        let items = self.optional_string_list(key)?;
        let base = self.path(key);
        for (i, item) in items.iter().enumerate() {
            if !is_absolute_url(item) {
                self.errors.push(index(&base, i), "must be an absolute URL");
            }
        }
        Some(items)
    }

    /// Optional list of flat string-to-string records.
    pub fn optional_string_map_list(
        &mut self,
        key: &'static str,
    ) -> Option<Vec<HashMap<String, String>>> {
        let value = self.get(key)?;
        let base = self.path(key);
        let Some(items) = value.as_array() else {
            self.errors.push(base, "expected an array");
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = index(&base, i);
            let Some(map) = item.as_object() else {
                self.errors.push(item_path, "expected an object");
                continue;
            };
            let mut entry = HashMap::with_capacity(map.len());
            for (k, v) in map {
                match v.as_str() {
                    Some(s) => {
                        entry.insert(k.clone(), s.to_string());
                    }
                    None => self.errors.push(join(&item_path, k), "expected a string"),
                }
            }
            out.push(entry);
        }
        Some(out)
    }

    /// Mark `key` as known without reading it.
    pub fn ignore(&mut self, key: &'static str) {
        self.seen.insert(key);
    }

    /// Optional nested record.
    pub fn object<T>(
        &mut self,
        key: &'static str,
        read: impl FnOnce(&mut Fields<'a>) -> T,
    ) -> Option<T> {
        let value = self.get(key)?;
        let path = self.path(key);
        match Fields::record(value, &path, self.strictness, read) {
            Ok(v) => Some(v),
            Err(errors) => {
                self.errors.extend(errors);
                None
            }
        }
    }

    /// Optional list of nested records. Items that fail are left out and
    /// their errors recorded.
    pub fn list<T>(
        &mut self,
        key: &'static str,
        read: impl Fn(&mut Fields<'a>) -> T,
    ) -> Option<Vec<T>> {
        let value = self.get(key)?;
        let path = self.path(key);
        let Some(items) = value.as_array() else {
            self.errors.push(path, "expected an array");
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match Fields::record(item, &index(&path, i), self.strictness, &read) {
                Ok(v) => out.push(v),
                Err(errors) => self.errors.extend(errors),
            }
        }
        Some(out)
    }

    pub fn required_list<T>(
        &mut self,
        key: &'static str,
        read: impl Fn(&mut Fields<'a>) -> T,
    ) -> Vec<T> {
        if !self.has(key) {
            self.seen.insert(key);
            self.error(key, REQUIRED);
            return Vec::new();
        }
        self.list(key, read).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_every_error() {
        let value = json!({"name": 5, "count": "x"});
        let result = Fields::record(&value, "", Strictness::Lenient, |f| {
            let id = f.required_str("id");
            let name = f.optional_str("name");
            let count = f.optional_i64("count");
            (id, name, count)
        });

        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_path("id"));
        assert!(errors.contains_path("name"));
        assert!(errors.contains_path("count"));
    }

    #[test]
    fn test_null_is_absent() {
        let value = json!({"name": null});
        let name = Fields::record(&value, "", Strictness::Lenient, |f| f.optional_str("name"))
            .unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn test_nested_paths() {
        let value = json!({"items": [{"path": "/ok"}, {"path": "relative"}]});
        let errors = Fields::record(&value, "", Strictness::Lenient, |f| {
            f.list("items", |item| item.required_absolute_path("path"))
        })
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.contains_path("items[1].path"));
    }

    #[test]
    fn test_strict_rejects_unknown_keys() {
        let value = json!({"id": "a", "extra": true});

        let lenient = Fields::record(&value, "", Strictness::Lenient, |f| f.required_str("id"));
        assert_eq!(lenient.unwrap(), "a");

        let strict = Fields::record(&value, "", Strictness::Strict, |f| f.required_str("id"));
        assert!(strict.unwrap_err().contains_path("extra"));
    }

    #[test]
    fn test_remaining_keeps_unread_keys() {
        let value = json!({"id": "a", "custom": 1});
        let extra = Fields::record(&value, "", Strictness::Lenient, |f| {
            f.required_str("id");
            f.remaining()
        })
        .unwrap();

        assert_eq!(extra.len(), 1);
        assert_eq!(extra.get("custom"), Some(&json!(1)));
    }

    #[test]
    fn test_absolute_url() {
        assert!(is_absolute_url("https://example.com/a"));
        assert!(is_absolute_url("s3://bucket/key"));
        assert!(!is_absolute_url("/local/path"));
        assert!(!is_absolute_url("not a url"));
    }
}
