// ── Timestamps ──
//
// Millisecond-precision UTC instants, always rendered as RFC 3339 with a
// three-digit fraction and a `Z` suffix so that the text form sorts the
// same way as the instant itself.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current wall-clock time truncated to milliseconds.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    /// Current time, clamped so it never precedes `previous`.
    ///
    /// Wall clocks can step backwards; stamps written by the store must not.
    pub fn now_after(previous: Self) -> Self {
        Self::now().max(previous)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    /// Any RFC 3339 instant; offsets are converted to UTC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self::from(dt.with_timezone(&Utc)))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_fixed_millisecond_fraction() {
        let ts = Timestamp::from(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(ts.to_string(), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn parses_offsets_into_utc() {
        let ts: Timestamp = serde_json::from_str("\"2024-05-01T14:00:00.250+02:00\"").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01T12:00:00.250Z");
    }

    #[test]
    fn rejects_non_rfc3339_text() {
        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }

    #[test]
    fn now_after_never_goes_backwards() {
        let future = Timestamp::from(Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(Timestamp::now_after(future), future);
    }
}
