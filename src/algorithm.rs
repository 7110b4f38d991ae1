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

//! The scheduling transition: given a record, a grade, and the current
//! time, compute the next record. Cards first work through a sequence of
//! short learning steps, then graduate to review, where intervals grow by
//! the card's ease factor. A lapse sends a card through the steps again.

use chrono::Duration;

use crate::config::Config;
use crate::types::grade::ReviewResult;
use crate::types::phase::Phase;
use crate::types::record::HistoryEntry;
use crate::types::record::ReviewRecord;
use crate::types::response_time::ResponseTime;
use crate::types::timestamp::Timestamp;

/// Which of the two step-based phases a card is in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Track {
    Learning,
    Relearning,
}

impl Track {
    fn at_step(self, step: usize) -> Phase {
        match self {
            Track::Learning => Phase::Learning(step),
            Track::Relearning => Phase::Relearning(step),
        }
    }
}

/// Apply a graded review and record it in the card's history. The
/// response time is kept for statistics and never affects scheduling.
pub fn transition(
    config: &Config,
    record: ReviewRecord,
    grade: ReviewResult,
    response_time: Option<ResponseTime>,
    now: Timestamp,
) -> ReviewRecord {
    let mut next = schedule(config, record, grade, now);
    next.history.push(HistoryEntry {
        reviewed_at: now,
        grade,
        response_time,
    });
    next
}

/// Apply a graded review without touching the history.
pub fn schedule(
    config: &Config,
    record: ReviewRecord,
    grade: ReviewResult,
    now: Timestamp,
) -> ReviewRecord {
    let mut next = record;
    match next.phase {
        Phase::New => step(config, &mut next, Track::Learning, 0, grade, now),
        Phase::Learning(i) => step(config, &mut next, Track::Learning, i, grade, now),
        Phase::Relearning(i) => step(config, &mut next, Track::Relearning, i, grade, now),
        Phase::Review => review(config, &mut next, grade, now),
    }
    next.ease_factor = clamp_ease(config, next.ease_factor);
    next.last_reviewed_at = Some(now);
    next
}

fn step(
    config: &Config,
    record: &mut ReviewRecord,
    track: Track,
    current: usize,
    grade: ReviewResult,
    now: Timestamp,
) {
    // A config with fewer steps than the record remembers: treat the card
    // as being on the last step.
    let current = current.min(config.learning_steps.len().saturating_sub(1));
    match grade {
        ReviewResult::Again => enter_step(config, record, track, 0, now),
        ReviewResult::Hard => enter_step(config, record, track, current, now),
        ReviewResult::Good => {
            if current + 1 < config.learning_steps.len() {
                enter_step(config, record, track, current + 1, now);
            } else {
                graduate(config, record, track, 1.0, now);
            }
        }
        ReviewResult::Easy => graduate(config, record, track, config.easy_bonus, now),
    }
}

fn enter_step(
    config: &Config,
    record: &mut ReviewRecord,
    track: Track,
    step: usize,
    now: Timestamp,
) {
    record.phase = track.at_step(step);
    record.due_at = now.plus(step_delay(config, step));
}

fn graduate(config: &Config, record: &mut ReviewRecord, track: Track, bonus: f64, now: Timestamp) {
    let fresh = config.graduating_interval_days * bonus;
    let interval = match track {
        Track::Learning => fresh,
        Track::Relearning => fresh.max(record.interval_days * config.relearning_interval_factor),
    };
    record.phase = Phase::Review;
    record.repetitions = 1;
    set_interval(config, record, interval, now);
}

fn review(config: &Config, record: &mut ReviewRecord, grade: ReviewResult, now: Timestamp) {
    match grade {
        ReviewResult::Again => {
            // The lapsed interval is kept so that relearning can give
            // partial credit for it.
            record.lapses = record.lapses.saturating_add(1);
            record.repetitions = 0;
            record.ease_factor -= config.lapse_ease_delta;
            enter_step(config, record, Track::Relearning, 0, now);
        }
        ReviewResult::Hard => {
            let interval = record.interval_days * config.hard_interval_factor;
            record.ease_factor -= config.hard_ease_delta;
            record.repetitions = record.repetitions.saturating_add(1);
            set_interval(config, record, interval, now);
        }
        ReviewResult::Good => {
            let interval = record.interval_days * record.ease_factor;
            record.repetitions = record.repetitions.saturating_add(1);
            set_interval(config, record, interval, now);
        }
        ReviewResult::Easy => {
            let interval = record.interval_days * record.ease_factor * config.easy_bonus;
            record.ease_factor += config.easy_ease_delta;
            record.repetitions = record.repetitions.saturating_add(1);
            set_interval(config, record, interval, now);
        }
    }
}

fn set_interval(config: &Config, record: &mut ReviewRecord, interval: f64, now: Timestamp) {
    let days = whole_days(config, interval);
    record.interval_days = days;
    record.due_at = now.plus(Duration::try_days(days as i64).unwrap_or(Duration::MAX));
}

/// Truncate to whole days, keeping at least one day and at most the
/// configured maximum.
fn whole_days(config: &Config, interval: f64) -> f64 {
    if interval.is_nan() {
        return 1.0;
    }
    interval
        .floor()
        .min(config.max_interval_days.floor())
        .max(1.0)
}

/// The delay for a learning step, truncated to whole minutes.
fn step_delay(config: &Config, step: usize) -> Duration {
    match config.learning_steps.get(step) {
        Some(delay) => Duration::minutes(delay.num_minutes()),
        None => Duration::zero(),
    }
}

fn clamp_ease(config: &Config, ease: f64) -> f64 {
    if ease.is_nan() {
        return config.min_ease;
    }
    ease.min(config.max_ease).max(config.min_ease)
}
