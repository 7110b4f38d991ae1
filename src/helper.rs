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

use chrono::DateTime;
use chrono::Duration;

use crate::types::phase::Phase;
use crate::types::record::ReviewRecord;
use crate::types::timestamp::Timestamp;

/// 2025-01-01T00:00:00Z.
const EPOCH_SECS: i64 = 1_735_689_600;

/// A fixed timestamp, the given number of minutes after the test epoch.
pub fn at(minutes: i64) -> Timestamp {
    let epoch = DateTime::from_timestamp(EPOCH_SECS, 0).unwrap();
    Timestamp::new(epoch + Duration::minutes(minutes))
}

pub fn days(n: i64) -> i64 {
    n * 24 * 60
}

/// A graduated record, last reviewed and due at the given minute.
pub fn review_record(interval_days: f64, ease_factor: f64, minute: i64) -> ReviewRecord {
    let mut record = ReviewRecord::new(at(minute));
    record.phase = Phase::Review;
    record.interval_days = interval_days;
    record.ease_factor = ease_factor;
    record.repetitions = 3;
    record.last_reviewed_at = Some(at(minute));
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        assert_eq!(at(0).to_rfc3339(), "2025-01-01T00:00:00Z");
        assert_eq!(at(days(1)).to_rfc3339(), "2025-01-02T00:00:00Z");
    }
}
