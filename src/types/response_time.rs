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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ScheduleError;

/// How long the user took to answer, in seconds. Always finite and
/// non-negative.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ResponseTime(f64);

impl ResponseTime {
    pub fn from_secs(secs: f64) -> Result<Self, ScheduleError> {
        if secs.is_finite() && secs >= 0.0 {
            Ok(Self(secs))
        } else {
            Err(ScheduleError::InvalidResponseTime(secs))
        }
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ResponseTime {
    type Error = ScheduleError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_secs(value)
    }
}

impl From<ResponseTime> for f64 {
    fn from(value: ResponseTime) -> Self {
        value.0
    }
}
