//! Timestamp normalization and RFC 3339 checks.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// A timestamp layout the normalizer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// UTC with a literal trailing `Z`.
    Utc(&'static str),
    /// Explicit numeric offset.
    Offset(&'static str),
}

/// Layouts tried in order by [`normalize`].
pub const ACCEPTED_LAYOUTS: &[Layout] = &[
    Layout::Utc("%Y-%m-%dT%H:%M:%S%.fZ"),
    Layout::Utc("%Y-%m-%dT%H:%M:%SZ"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.f%:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.f%z"),
];

impl Layout {
    fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::Utc(fmt) => NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|naive| naive.and_utc()),
            Self::Offset(fmt) => DateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Rewrite a timestamp as whole-second UTC with a trailing `Z`.
///
/// Returns `None` for empty input or input matching none of
/// [`ACCEPTED_LAYOUTS`]. Malformed input is never an error here; schema
/// fields use [`is_rfc3339`] for strict checks.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    ACCEPTED_LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(raw))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Strict RFC 3339 check used by schema-level datetime fields.
pub fn is_rfc3339(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_fractional_utc() {
        assert_eq!(
            normalize(Some("2024-10-15T18:14:34.948996Z")),
            Some("2024-10-15T18:14:34Z".to_string())
        );
    }

    #[test]
    fn test_normalize_whole_second_utc() {
        assert_eq!(
            normalize(Some("2024-01-01T00:00:00Z")),
            Some("2024-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_normalize_numeric_offset() {
        assert_eq!(
            normalize(Some("2024-10-15T18:14:34+02:00")),
            Some("2024-10-15T16:14:34Z".to_string())
        );
        assert_eq!(
            normalize(Some("2024-10-15T19:01:06.872464+00:00")),
            Some("2024-10-15T19:01:06Z".to_string())
        );
    }

    #[test]
    fn test_normalize_misses_silently() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("")), None);
        assert_eq!(normalize(Some("2020-10-02 16:00:00")), None);
        assert_eq!(normalize(Some("20201002T160000Z")), None);
        assert_eq!(normalize(Some("02-10-2020T16:00:00.000Z")), None);
        assert_eq!(normalize(Some("yesterday")), None);
    }

    #[test]
    fn test_rfc3339_check() {
        assert!(is_rfc3339("2020-10-02T16:00:00.000Z"));
        assert!(is_rfc3339("2024-10-15T18:14:34+00:00"));
        assert!(!is_rfc3339("2020-10-02T16:00:00"));
        assert!(!is_rfc3339("20201002T160000Z"));
        assert!(!is_rfc3339("2020-10-02T16:00:00.000 GMT"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            secs in 0i64..4_102_444_800,
            micros in 0u32..1_000_000,
            offset_min in -720i32..=840,
            layout in 0usize..4,
        ) {
            let utc = DateTime::from_timestamp(secs, micros * 1000).unwrap();
            let offset = chrono::FixedOffset::east_opt(offset_min * 60).unwrap();
            let raw = match layout {
                0 => utc.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
                1 => utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                2 => utc.with_timezone(&offset).format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
                _ => utc.with_timezone(&offset).format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string(),
            };

            let once = normalize(Some(&raw));
            prop_assert!(once.is_some());
            prop_assert_eq!(normalize(once.as_deref()), once.clone());
            prop_assert_eq!(once, Some(utc.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
    }
}
