//! ISO-8601 date-times with an explicit numeric offset.
//!
//! The service renders dates as `2021-06-30T00:00:00+02:00`. Parsing is
//! strict: exactly `YYYY-MM-DDTHH:MM:SS` followed by `±HH:MM` or `±HHMM`.
//! No fractional seconds, no `Z`, no trailing data.

use chrono::{DateTime, FixedOffset, Local, SubsecRound};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::config::DATE_FORMAT;

/// Shape of the date-time part; `d` stands for an ASCII digit.
const DATE_TIME_SHAPE: &[u8] = b"dddd-dd-ddTdd:dd:dd";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid ISO-8601 date-time `{0}`")]
pub struct DateParseError(pub String);

/// An instant together with the offset it was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDateTime(DateTime<FixedOffset>);

impl IsoDateTime {
    /// Current local time, truncated to whole seconds.
    pub fn now() -> Self {
        let now = Local::now();
        Self(now.with_timezone(now.offset()).trunc_subsecs(0))
    }

    /// Strict parse; see the module docs for the accepted shape.
    pub fn parse(text: &str) -> Result<Self, DateParseError> {
        let bytes = text.as_bytes();
        let err = || DateParseError(text.to_string());

        if bytes.len() < DATE_TIME_SHAPE.len() {
            return Err(err());
        }
        let (date_time, offset) = bytes.split_at(DATE_TIME_SHAPE.len());

        let shape_ok = date_time
            .iter()
            .zip(DATE_TIME_SHAPE)
            .all(|(byte, expected)| match expected {
                b'd' => byte.is_ascii_digit(),
                other => byte == other,
            });
        if !shape_ok {
            return Err(err());
        }

        let format = match offset {
            [b'+' | b'-', h1, h2, b':', m1, m2]
                if [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit()) =>
            {
                "%Y-%m-%dT%H:%M:%S%:z"
            }
            [b'+' | b'-', h1, h2, m1, m2] if [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit()) => {
                "%Y-%m-%dT%H:%M:%S%z"
            }
            _ => return Err(err()),
        };

        DateTime::parse_from_str(text, format)
            .map(Self)
            .map_err(|_| err())
    }

    /// Render as `YYYY-MM-DDTHH:MM:SS±HH:MM`.
    pub fn encode(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl From<DateTime<FixedOffset>> for IsoDateTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

impl fmt::Display for IsoDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for IsoDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for IsoDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        IsoDateTime::parse(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_offset() {
        let date = IsoDateTime::parse("2021-06-30T00:00:00+02:00").unwrap();
        assert_eq!(date.as_datetime().offset().local_minus_utc(), 2 * 3600);
        assert_eq!(date.timestamp(), 1_625_004_000);
    }

    #[test]
    fn parses_compact_offset() {
        let a = IsoDateTime::parse("2021-06-30T00:00:00+0200").unwrap();
        let b = IsoDateTime::parse("2021-06-30T00:00:00+02:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_offset() {
        let date = IsoDateTime::parse("2017-09-16T17:56:00-05:30").unwrap();
        assert_eq!(date.encode(), "2017-09-16T17:56:00-05:30");
    }

    #[test]
    fn encode_keeps_offset() {
        let text = "2021-06-30T00:00:00+02:00";
        assert_eq!(IsoDateTime::parse(text).unwrap().encode(), text);
        let utc = "2021-06-30T00:00:00+00:00";
        assert_eq!(IsoDateTime::parse(utc).unwrap().to_string(), utc);
    }

    #[test]
    fn rejects_deviations() {
        for text in [
            "",
            "2021-06-30",
            "2021-06-30T00:00:00",
            "2021-06-30T00:00:00Z",
            "2021-06-30T00:00:00.123+02:00",
            "2021-6-30T00:00:00+02:00",
            "2021-06-30 00:00:00+02:00",
            "2021-06-30T00:00:00+2:00",
            "2021-06-30T00:00:00+02:00 ",
            "2021-13-01T00:00:00+02:00",
            "2021-02-30T00:00:00+02:00",
            "2021-06-30T25:00:00+02:00",
            "not a date at all, clearly",
        ] {
            assert!(IsoDateTime::parse(text).is_err(), "accepted `{}`", text);
        }
    }

    #[test]
    fn error_carries_input() {
        assert_eq!(
            IsoDateTime::parse("yesterday").unwrap_err(),
            DateParseError("yesterday".to_string())
        );
    }

    #[test]
    fn now_survives_roundtrip() {
        let now = IsoDateTime::now();
        let parsed = IsoDateTime::parse(&now.encode()).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn serde_uses_iso_string() {
        let date = IsoDateTime::parse("2021-06-30T00:00:00+02:00").unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2021-06-30T00:00:00+02:00\"");
        let back: IsoDateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
        assert!(serde_json::from_str::<IsoDateTime>("\"2021-06-30\"").is_err());
        assert!(serde_json::from_str::<IsoDateTime>("42").is_err());
    }
}
