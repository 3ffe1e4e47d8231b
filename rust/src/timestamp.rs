// Heterogeneous `createdAt` encodings and their normalization to a single instant.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde_json::Value;

/// A `createdAt` value as it arrived from the document store.
///
/// Variant order mirrors the normalization precedence: a store-native timestamp wins over a
/// bare seconds field, which wins over anything that has to be parsed.
#[derive(uniffi::Enum, Clone, Debug, PartialEq)]
pub enum RawTimestamp {
    /// Store-native timestamp (exposes a direct conversion to an instant).
    Structured { seconds: i64, nanoseconds: u32 },
    /// Object carrying only a numeric `seconds` component.
    EpochSeconds { seconds: f64 },
    /// Bare number. A generic date constructor reads numbers as milliseconds.
    EpochMillis { millis: f64 },
    /// Already-serialized date string.
    Text { value: String },
}

impl RawTimestamp {
    /// Classify a JSON `createdAt` field. Falsy values (null, "", 0, false) are absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let seconds = map.get("seconds").or_else(|| map.get("_seconds"));
                let nanos = map.get("nanoseconds").or_else(|| map.get("_nanoseconds"));
                if let (Some(s), Some(n)) = (seconds.and_then(Value::as_i64), nanos) {
                    if let Some(n) = n.as_u64().and_then(|n| u32::try_from(n).ok()) {
                        return Some(RawTimestamp::Structured {
                            seconds: s,
                            nanoseconds: n,
                        });
                    }
                }
                match seconds.and_then(Value::as_f64) {
                    Some(s) if s != 0.0 => Some(RawTimestamp::EpochSeconds { seconds: s }),
                    _ => None,
                }
            }
            Value::String(s) if !s.trim().is_empty() => {
                Some(RawTimestamp::Text { value: s.clone() })
            }
            Value::Number(n) => match n.as_f64() {
                Some(ms) if ms != 0.0 => Some(RawTimestamp::EpochMillis { millis: ms }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Resolve any supported encoding to a UTC instant. Malformed input yields `None`.
pub fn normalize_to_instant(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Structured {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(*seconds, *nanoseconds),
        RawTimestamp::EpochSeconds { seconds } => from_fractional_millis(*seconds * 1000.0),
        RawTimestamp::EpochMillis { millis } => from_fractional_millis(*millis),
        RawTimestamp::Text { value } => parse_date_string(value),
    }
}

fn from_fractional_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

// Offset-less inputs are read as UTC so results don't depend on the host timezone.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    // ISO with a colon-less offset (`+0000`).
    "%Y-%m-%dT%H:%M:%S%.f%z",
    // `Date.prototype.toString()` once the zone name is stripped.
    "%a %b %d %Y %H:%M:%S GMT%z",
];

/// Drop a trailing ` (Zone Name)` as appended by `Date.prototype.toString()`.
fn strip_zone_name(s: &str) -> &str {
    match s.rfind(" (") {
        Some(i) if s.ends_with(')') => s[..i].trim_end(),
        _ => s,
    }
}

pub fn parse_date_string(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let zoned = strip_zone_name(s);
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(zoned, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// pt-BR locale rendering (`19/10/2026, 14:05:09`) in a fixed UTC offset.
pub fn format_display(instant: &DateTime<Utc>, utc_offset_minutes: i32) -> String {
    let offset =
        FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());
    instant
        .with_timezone(&offset)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn millis(raw: &RawTimestamp) -> Option<i64> {
        normalize_to_instant(raw).map(|dt| dt.timestamp_millis())
    }

    #[test]
    fn same_moment_in_every_encoding_normalizes_equal() {
        let structured = RawTimestamp::Structured {
            seconds: 100,
            nanoseconds: 0,
        };
        let seconds = RawTimestamp::EpochSeconds { seconds: 100.0 };
        let millis_num = RawTimestamp::EpochMillis { millis: 100_000.0 };
        let text = RawTimestamp::Text {
            value: "1970-01-01T00:01:40Z".into(),
        };
        let text_offset = RawTimestamp::Text {
            value: "1969-12-31T21:01:40-03:00".into(),
        };

        let expected = Some(100_000);
        assert_eq!(millis(&structured), expected);
        assert_eq!(millis(&seconds), expected);
        assert_eq!(millis(&millis_num), expected);
        assert_eq!(millis(&text), expected);
        assert_eq!(millis(&text_offset), expected);
    }

    #[test]
    fn structured_keeps_sub_second_precision() {
        let raw = RawTimestamp::Structured {
            seconds: 1,
            nanoseconds: 250_000_000,
        };
        assert_eq!(millis(&raw), Some(1_250));
    }

    #[test]
    fn fractional_seconds_truncate_to_millis() {
        let raw = RawTimestamp::EpochSeconds { seconds: 1.2345 };
        assert_eq!(millis(&raw), Some(1_234));
    }

    #[test]
    fn malformed_values_degrade_to_none() {
        assert_eq!(
            millis(&RawTimestamp::Text {
                value: "not a date".into()
            }),
            None
        );
        assert_eq!(
            millis(&RawTimestamp::Structured {
                seconds: 0,
                nanoseconds: 2_000_000_000,
            }),
            None
        );
        assert_eq!(
            millis(&RawTimestamp::EpochSeconds {
                seconds: f64::NAN
            }),
            None
        );
        assert_eq!(
            millis(&RawTimestamp::EpochMillis {
                millis: f64::INFINITY
            }),
            None
        );
    }

    #[test]
    fn parses_common_string_shapes() {
        let at = |s: &str| parse_date_string(s).map(|dt| dt.timestamp());
        assert_eq!(at("1970-01-02"), Some(86_400));
        assert_eq!(at("1970/01/02"), Some(86_400));
        assert_eq!(at("1970-01-01T00:03:00"), Some(180));
        assert_eq!(at("1970-01-01 00:03:00.500"), Some(180));
        assert_eq!(at("1970-01-01T00:03"), Some(180));
        assert_eq!(at("Thu, 01 Jan 1970 00:03:00 +0000"), Some(180));
        assert_eq!(at("  1970-01-01T00:03:00Z  "), Some(180));
        assert_eq!(at("2024-05-01T13:00:00.000+0000"), Some(1_714_568_400));
        assert_eq!(at("2024-05-01T10:00:00-0300"), Some(1_714_568_400));
        assert_eq!(
            at("Wed May 01 2024 10:00:00 GMT-0300 (Horário Padrão de Brasília)"),
            Some(1_714_568_400)
        );
        assert_eq!(at("Wed May 01 2024 10:00:00 GMT-0300"), Some(1_714_568_400));
        assert_eq!(at("Wed, 01 May 2024 13:00:00 GMT"), Some(1_714_568_400));
        assert_eq!(at(""), None);
        assert_eq!(at("31/12/2024"), None);
    }

    #[test]
    fn json_classification_follows_precedence() {
        assert_eq!(
            RawTimestamp::from_json(&json!({"seconds": 10, "nanoseconds": 5})),
            Some(RawTimestamp::Structured {
                seconds: 10,
                nanoseconds: 5
            })
        );
        assert_eq!(
            RawTimestamp::from_json(&json!({"_seconds": 10, "_nanoseconds": 0})),
            Some(RawTimestamp::Structured {
                seconds: 10,
                nanoseconds: 0
            })
        );
        assert_eq!(
            RawTimestamp::from_json(&json!({"seconds": 10})),
            Some(RawTimestamp::EpochSeconds { seconds: 10.0 })
        );
        assert_eq!(
            RawTimestamp::from_json(&json!("2024-05-01")),
            Some(RawTimestamp::Text {
                value: "2024-05-01".into()
            })
        );
        assert_eq!(
            RawTimestamp::from_json(&json!(1500)),
            Some(RawTimestamp::EpochMillis { millis: 1500.0 })
        );
    }

    #[test]
    fn json_falsy_values_are_absent() {
        for v in [
            json!(null),
            json!(""),
            json!("   "),
            json!(0),
            json!(false),
            json!(true),
            json!({"seconds": 0}),
            json!({"other": 1}),
            json!([1, 2]),
        ] {
            assert_eq!(RawTimestamp::from_json(&v), None, "{v}");
        }
    }

    #[test]
    fn display_uses_pt_br_layout_and_offset() {
        let dt = DateTime::from_timestamp(1_760_889_909, 0).unwrap();
        // 2025-10-19T16:05:09Z
        assert_eq!(format_display(&dt, 0), "19/10/2025, 16:05:09");
        assert_eq!(format_display(&dt, -180), "19/10/2025, 13:05:09");
    }
}
