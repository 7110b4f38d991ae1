// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::SecondsFormat;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// 9999-12-31T23:59:59Z as seconds since the epoch.
const LATEST_SECS: i64 = 253_402_300_799;

fn latest() -> DateTime<Utc> {
    DateTime::from_timestamp(LATEST_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A UTC instant. The scheduler never reads the clock itself: every
/// timestamp it sees is supplied by the caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// Advance by the given duration, saturating at the last instant of
    /// year 9999, the latest one RFC 3339 can express.
    pub fn plus(self, duration: Duration) -> Self {
        let latest = latest().max(self.0);
        Self(
            self.0
                .checked_add_signed(duration)
                .map_or(latest, |ts| ts.min(latest)),
        )
    }

    /// Full-precision RFC 3339, so that parsing the result yields the same
    /// instant.
    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn parse_rfc3339(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ErrorReport::new(format!("invalid timestamp '{s}': {e}")))?;
        Ok(Self(ts.with_timezone(&Utc)))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        Timestamp::parse_rfc3339(&string).map_err(serde::de::Error::custom)
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_rfc3339()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Timestamp::parse_rfc3339(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::at;

    #[test]
    fn test_rfc3339_round_trip() -> Fallible<()> {
        let ts = at(0).plus(Duration::nanoseconds(123_456_789));
        let parsed = Timestamp::parse_rfc3339(&ts.to_rfc3339())?;
        assert_eq!(ts, parsed);
        Ok(())
    }

    #[test]
    fn test_parse_offset_normalizes_to_utc() -> Fallible<()> {
        let ts = Timestamp::parse_rfc3339("2025-01-01T02:00:00+02:00")?;
        assert_eq!(ts, at(0));
        Ok(())
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Timestamp::parse_rfc3339("yesterday").is_err());
    }

    #[test]
    fn test_plus_saturates_at_year_9999() -> Fallible<()> {
        let ts = at(0).plus(Duration::MAX);
        assert_eq!(ts.to_rfc3339(), "9999-12-31T23:59:59Z");
        assert_eq!(Timestamp::parse_rfc3339(&ts.to_rfc3339())?, ts);
        assert_eq!(ts.plus(Duration::days(1)), ts);
        Ok(())
    }
}
