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

use serde::Deserialize;
use serde::Serialize;

/// Where a card is in its lifecycle. The learning phases carry the index of
/// the current learning step; the other phases cannot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "step", rename_all = "lowercase")]
pub enum Phase {
    /// Never reviewed.
    New,
    /// Working through the learning steps for the first time.
    Learning(usize),
    /// Graduated: intervals are measured in days.
    Review,
    /// Lapsed out of review and working back through the learning steps.
    Relearning(usize),
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::New => "new",
            Phase::Learning(_) => "learning",
            Phase::Review => "review",
            Phase::Relearning(_) => "relearning",
        }
    }

    /// The learning step index, if the card is in a learning phase.
    pub fn step(self) -> Option<usize> {
        match self {
            Phase::Learning(step) | Phase::Relearning(step) => Some(step),
            Phase::New | Phase::Review => None,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.step() {
            Some(step) => write!(f, "{}({})", self.as_str(), step),
            None => write!(f, "{}", self.as_str()),
        }
    }
}
