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

use crate::types::grade::ReviewResult;
use crate::types::phase::Phase;
use crate::types::response_time::ResponseTime;
use crate::types::timestamp::Timestamp;

/// The ease factor of a card that has never been reviewed.
pub const INITIAL_EASE: f64 = 2.5;

/// One graded review, kept for statistics only.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub reviewed_at: Timestamp,
    pub grade: ReviewResult,
    /// Absent when the caller did not measure the response time.
    pub response_time: Option<ResponseTime>,
}

/// The review state of a single card.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub phase: Phase,
    /// Multiplier for review interval growth. Never below the configured
    /// minimum after a transition.
    pub ease_factor: f64,
    /// The current review interval in whole days. While relearning this
    /// still holds the interval the card had when it lapsed.
    pub interval_days: f64,
    /// The card is eligible for review once `now >= due_at`.
    pub due_at: Timestamp,
    /// Consecutive non-`Again` reviews since the last lapse.
    pub repetitions: u32,
    /// How many times the card fell from review back into relearning.
    pub lapses: u32,
    pub last_reviewed_at: Option<Timestamp>,
    /// Append-only, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl ReviewRecord {
    /// The record of a card that has never been reviewed: due immediately.
    pub fn new(now: Timestamp) -> Self {
        Self {
            phase: Phase::New,
            ease_factor: INITIAL_EASE,
            interval_days: 0.0,
            due_at: now,
            repetitions: 0,
            lapses: 0,
            last_reviewed_at: None,
            history: Vec::new(),
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.due_at <= now
    }

    pub fn review_count(&self) -> usize {
        self.history.len()
    }

    pub fn success_count(&self) -> usize {
        self.history
            .iter()
            .filter(|entry| entry.grade.is_success())
            .count()
    }

    /// Total measured response time, in seconds.
    pub fn study_time(&self) -> f64 {
        self.history
            .iter()
            .filter_map(|entry| entry.response_time)
            .map(ResponseTime::as_secs)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::at;

    #[test]
    fn test_new_record_is_due_immediately() {
        let record = ReviewRecord::new(at(0));
        assert_eq!(record.phase, Phase::New);
        assert_eq!(record.ease_factor, INITIAL_EASE);
        assert!(record.is_due(at(0)));
        assert!(record.last_reviewed_at.is_none());
    }

    #[test]
    fn test_history_folds() {
        let mut record = ReviewRecord::new(at(0));
        for (minute, grade, secs) in [
            (1, ReviewResult::Again, Some(4.0)),
            (2, ReviewResult::Good, None),
            (3, ReviewResult::Easy, Some(1.5)),
        ] {
            record.history.push(HistoryEntry {
                reviewed_at: at(minute),
                grade,
                response_time: secs.map(|s| ResponseTime::from_secs(s).unwrap()),
            });
        }
        assert_eq!(record.review_count(), 3);
        assert_eq!(record.success_count(), 2);
        assert_eq!(record.study_time(), 5.5);
    }
}
