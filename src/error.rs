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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// Errors produced by the scheduler itself. None of them are fatal: the
/// store and every record stay usable after any of these is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Snapshot bytes that could not be decoded, or that decoded into
    /// records violating the record invariants.
    DataCorruption(String),
    /// A response time that is negative or not finite.
    InvalidResponseTime(f64),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::DataCorruption(reason) => {
                write!(f, "corrupt review snapshot: {reason}")
            }
            ScheduleError::InvalidResponseTime(secs) => {
                write!(f, "invalid response time: {secs}")
            }
        }
    }
}

impl Error for ScheduleError {}

/// A user-facing error message.
#[derive(Debug)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl From<ScheduleError> for ErrorReport {
    fn from(value: ScheduleError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(format!("I/O error: {value}"))
    }
}

impl From<rusqlite::Error> for ErrorReport {
    fn from(value: rusqlite::Error) -> Self {
        ErrorReport::new(format!("database error: {value}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport::new(format!("JSON error: {value}"))
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(value: toml::de::Error) -> Self {
        ErrorReport::new(format!("invalid configuration: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail("directory does not exist.");
        let err = result.unwrap_err();
        assert_eq!(err.message(), "directory does not exist.");
    }

    #[test]
    fn test_schedule_error_into_report() {
        let report: ErrorReport = ScheduleError::InvalidResponseTime(-1.0).into();
        assert_eq!(report.to_string(), "invalid response time: -1");
    }
}
