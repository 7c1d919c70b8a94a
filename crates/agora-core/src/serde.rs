// Module name shadows the `serde` crate — use `::serde` for the external crate.
use ::serde::{Deserialize, Deserializer, Serializer};
use chrono::{DateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 with millisecond precision — the
/// wire format for every timestamp field in API responses.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Same, for optional timestamps (`null` when absent).
pub fn opt_to_rfc3339_ms<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => to_rfc3339_ms(dt, s),
        None => s.serialize_none(),
    }
}

/// Deserialize into `Option<Option<T>>` so a PATCH body can distinguish an
/// absent field (outer `None`, via `#[serde(default)]`) from an explicit
/// `null` (inner `None`, meaning "clear").
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use chrono::{SecondsFormat, TimeZone, Utc};

    #[test]
    fn should_format_datetime_with_millis() {
        let dt = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
        assert_eq!(
            dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            "2026-08-01T09:30:00.000Z"
        );
    }

    #[test]
    fn should_distinguish_absent_from_null() {
        #[derive(::serde::Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "super::double_option")]
            field: Option<Option<u32>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.field, None);

        let cleared: Patch = serde_json::from_str(r#"{"field": null}"#).unwrap();
        assert_eq!(cleared.field, Some(None));

        let set: Patch = serde_json::from_str(r#"{"field": 7}"#).unwrap();
        assert_eq!(set.field, Some(Some(7)));
    }
}
