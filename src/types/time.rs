//! Timestamp and date conversion
//!
//! Strings are parsed with a fixed set of layouts, numbers are read as unix
//! seconds in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::{DataType, TypeError, TypeResult};
use crate::executor::datum::Datum;

/// Layouts accepted for TIMESTAMP strings, tried in order
pub const TIMESTAMP_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Layout accepted for DATE strings
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Convert a non-null datum to a timestamp
pub fn to_timestamp(value: &Datum) -> TypeResult<NaiveDateTime> {
    match value {
        Datum::Timestamp(ts) => Ok(*ts),
        Datum::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        Datum::String(s) => parse_timestamp(s.trim())
            .ok_or_else(|| DataType::Timestamp.conversion_error(value)),
        Datum::Int(_) | Datum::Float(_) => from_unix_seconds(value, DataType::Timestamp),
        _ => Err(DataType::Timestamp.conversion_error(value)),
    }
}

/// Convert a non-null datum to a date
pub fn to_date(value: &Datum) -> TypeResult<NaiveDate> {
    match value {
        Datum::Date(d) => Ok(*d),
        Datum::Timestamp(ts) => Ok(ts.date()),
        Datum::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_LAYOUT)
            .map_err(|_| DataType::Date.conversion_error(value)),
        Datum::Int(_) | Datum::Float(_) => {
            from_unix_seconds(value, DataType::Date).map(|ts| ts.date())
        }
        _ => Err(DataType::Date.conversion_error(value)),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    for layout in TIMESTAMP_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|ts| ts.naive_utc())
}

fn from_unix_seconds(value: &Datum, target: DataType) -> TypeResult<NaiveDateTime> {
    let secs = match value {
        Datum::Int(i) => *i,
        Datum::Float(f) if f.is_finite() => f.trunc() as i64,
        _ => return Err(target.conversion_error(value)),
    };
    DateTime::from_timestamp(secs, 0)
        .map(|ts| ts.naive_utc())
        .ok_or_else(|| TypeError::OutOfRange {
            value: value.to_string(),
            target,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_timestamp_layouts() {
        let expected = ts("2024-03-15 10:20:30");
        for input in [
            "2024-03-15 10:20:30",
            "2024-03-15T10:20:30",
            "2024-03-15T10:20:30Z",
            "2024-03-15T11:20:30+01:00",
        ] {
            let got = to_timestamp(&Datum::String(input.to_string())).unwrap();
            assert_eq!(got, expected, "layout {}", input);
        }
    }

    #[test]
    fn test_timestamp_fraction() {
        let got = to_timestamp(&Datum::String("2024-03-15 10:20:30.250".to_string())).unwrap();
        assert_eq!(got.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_date_only_string_is_not_a_timestamp() {
        assert!(to_timestamp(&Datum::String("2024-03-15".to_string())).is_err());
        let d = to_date(&Datum::String("2024-03-15".to_string())).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_unix_seconds() {
        let got = to_timestamp(&Datum::Int(86_400 + 3_600)).unwrap();
        assert_eq!(got, ts("1970-01-02 01:00:00"));

        let d = to_date(&Datum::Float(86_400.9)).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());

        assert!(matches!(
            to_timestamp(&Datum::Int(i64::MAX)),
            Err(TypeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_date_to_timestamp_is_midnight() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(to_timestamp(&Datum::Date(d)).unwrap(), ts("2024-02-29 00:00:00"));
    }

    #[test]
    fn test_garbage_fails() {
        let garbage = Datum::String("not a date".to_string());
        assert!(to_timestamp(&garbage).is_err());
        assert!(to_date(&garbage).is_err());
        assert!(to_timestamp(&Datum::Bool(true)).is_err());
    }
}
