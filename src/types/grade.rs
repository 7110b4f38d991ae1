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
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// The grade a user assigns after seeing a card's answer. Variants are
/// declared hardest first, so the derived ordering runs from `Again` to
/// `Easy`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResult {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewResult::Again => "again",
            ReviewResult::Hard => "hard",
            ReviewResult::Good => "good",
            ReviewResult::Easy => "easy",
        }
    }

    /// Every grade except `Again` counts as a successful recall.
    pub fn is_success(self) -> bool {
        self != ReviewResult::Again
    }
}

impl Display for ReviewResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ReviewResult {
    type Err = ErrorReport;

    /// Accepts the grade names, case-insensitively, or the numbers 1 to 4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" | "1" => Ok(ReviewResult::Again),
            "hard" | "2" => Ok(ReviewResult::Hard),
            "good" | "3" => Ok(ReviewResult::Good),
            "easy" | "4" => Ok(ReviewResult::Easy),
            _ => fail(format!("Invalid grade: {s}")),
        }
    }
}
