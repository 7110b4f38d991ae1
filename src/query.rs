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

//! Read-only views over a store: which cards are due, what state each card
//! is in, and aggregate statistics. Cards without a record are treated as
//! new cards due now.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::config::Config;
use crate::store::ReviewStore;
use crate::types::card_id::CardId;
use crate::types::grade::ReviewResult;
use crate::types::phase::Phase;
use crate::types::record::ReviewRecord;
use crate::types::response_time::ResponseTime;
use crate::types::timestamp::Timestamp;

/// A coarse classification of a card, for display.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    /// Never reviewed.
    New,
    /// In the learning or relearning steps.
    Learning,
    /// Graduated and due.
    Due,
    /// Graduated, not yet due, and not yet mastered.
    Scheduled,
    /// Graduated, not yet due, with more repetitions than the mastery
    /// threshold.
    Mastered,
}

impl Display for CardStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardStatus::New => "new",
            CardStatus::Learning => "learning",
            CardStatus::Due => "due",
            CardStatus::Scheduled => "scheduled",
            CardStatus::Mastered => "mastered",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub due_cards: usize,
    pub scheduled_cards: usize,
    pub mastered_cards: usize,
    pub total_reviews: usize,
    pub successful_reviews: usize,
    /// Non-`Again` reviews over all reviews; zero when there are none.
    pub success_rate: f64,
    /// Over review-phase cards only.
    pub average_ease: Option<f64>,
    /// Over review-phase cards only.
    pub average_interval_days: Option<f64>,
    pub total_study_time_secs: f64,
    /// Over reviews with a measured response time.
    pub average_response_time_secs: Option<f64>,
    /// Most recent first.
    pub recent_reviews: Vec<RecentReview>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentReview {
    pub card_id: CardId,
    pub reviewed_at: Timestamp,
    pub grade: ReviewResult,
    pub response_time_secs: Option<f64>,
}

/// The given cards that are due at `now`, earliest first, ties broken by
/// card ID. Duplicate IDs are reported once.
pub fn due_cards(store: &ReviewStore, card_ids: &[CardId], now: Timestamp) -> Vec<CardId> {
    let mut due: Vec<(Timestamp, &CardId)> = unique(card_ids)
        .into_iter()
        .filter_map(|card_id| {
            let due_at = due_at(store, card_id, now);
            (due_at <= now).then_some((due_at, card_id))
        })
        .collect();
    due.sort();
    due.into_iter().map(|(_, card_id)| card_id.clone()).collect()
}

pub fn classify(
    store: &ReviewStore,
    config: &Config,
    card_id: &CardId,
    now: Timestamp,
) -> CardStatus {
    match store.lookup(card_id) {
        Some(record) => classify_record(config, record, now),
        None => CardStatus::New,
    }
}

fn classify_record(config: &Config, record: &ReviewRecord, now: Timestamp) -> CardStatus {
    match record.phase {
        Phase::New => CardStatus::New,
        Phase::Learning(_) | Phase::Relearning(_) => CardStatus::Learning,
        Phase::Review => {
            if record.is_due(now) {
                CardStatus::Due
            } else if record.repetitions > config.mastery_threshold {
                CardStatus::Mastered
            } else {
                CardStatus::Scheduled
            }
        }
    }
}

/// Aggregate statistics over the given cards.
pub fn stats(
    store: &ReviewStore,
    config: &Config,
    card_ids: &[CardId],
    now: Timestamp,
) -> StudyStats {
    let card_ids = unique(card_ids);
    let mut stats = StudyStats {
        total_cards: card_ids.len(),
        new_cards: 0,
        learning_cards: 0,
        due_cards: 0,
        scheduled_cards: 0,
        mastered_cards: 0,
        total_reviews: 0,
        successful_reviews: 0,
        success_rate: 0.0,
        average_ease: None,
        average_interval_days: None,
        total_study_time_secs: 0.0,
        average_response_time_secs: None,
        recent_reviews: Vec::new(),
    };
    let mut review_phase = 0usize;
    let mut total_ease = 0.0;
    let mut total_interval = 0.0;
    let mut timed_reviews = 0usize;
    let mut recent: Vec<(usize, RecentReview)> = Vec::new();

    for card_id in card_ids {
        let status = classify(store, config, card_id, now);
        match status {
            CardStatus::New => stats.new_cards += 1,
            CardStatus::Learning => stats.learning_cards += 1,
            CardStatus::Due => stats.due_cards += 1,
            CardStatus::Scheduled => stats.scheduled_cards += 1,
            CardStatus::Mastered => stats.mastered_cards += 1,
        }
        let Some(record) = store.lookup(card_id) else {
            continue;
        };
        if record.phase == Phase::Review {
            review_phase += 1;
            total_ease += record.ease_factor;
            total_interval += record.interval_days;
        }
        stats.total_reviews += record.review_count();
        stats.successful_reviews += record.success_count();
        stats.total_study_time_secs += record.study_time();
        timed_reviews += record
            .history
            .iter()
            .filter(|entry| entry.response_time.is_some())
            .count();
        for (index, entry) in record.history.iter().enumerate() {
            recent.push((
                index,
                RecentReview {
                    card_id: card_id.clone(),
                    reviewed_at: entry.reviewed_at,
                    grade: entry.grade,
                    response_time_secs: entry.response_time.map(ResponseTime::as_secs),
                },
            ));
        }
    }

    if stats.total_reviews > 0 {
        stats.success_rate = stats.successful_reviews as f64 / stats.total_reviews as f64;
    }
    if review_phase > 0 {
        stats.average_ease = Some(total_ease / review_phase as f64);
        stats.average_interval_days = Some(total_interval / review_phase as f64);
    }
    if timed_reviews > 0 {
        stats.average_response_time_secs = Some(stats.total_study_time_secs / timed_reviews as f64);
    }

    // Newest first; within a card, later history entries first.
    recent.sort_by(|(a_index, a), (b_index, b)| {
        (Reverse(a.reviewed_at), &a.card_id, Reverse(a_index)).cmp(&(
            Reverse(b.reviewed_at),
            &b.card_id,
            Reverse(b_index),
        ))
    });
    recent.truncate(config.recent_history_limit);
    stats.recent_reviews = recent.into_iter().map(|(_, review)| review).collect();
    stats
}

fn due_at(store: &ReviewStore, card_id: &CardId, now: Timestamp) -> Timestamp {
    match store.lookup(card_id) {
        Some(record) => record.due_at,
        None => now,
    }
}

fn unique(card_ids: &[CardId]) -> BTreeSet<&CardId> {
    card_ids.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::transition;
    use crate::helper::at;
    use crate::helper::days;
    use crate::helper::review_record;

    fn ids(names: &[&str]) -> Vec<CardId> {
        names.iter().map(|name| CardId::from(*name)).collect()
    }

    #[test]
    fn test_due_cards_ordering() {
        let mut store = ReviewStore::new();
        store.put(CardId::from("late"), review_record(1.0, 2.5, 30));
        store.put(CardId::from("early"), review_record(1.0, 2.5, 10));
        store.put(CardId::from("b-tie"), review_record(1.0, 2.5, 20));
        store.put(CardId::from("a-tie"), review_record(1.0, 2.5, 20));
        store.put(CardId::from("future"), review_record(1.0, 2.5, 90));
        let candidates = ids(&["late", "early", "b-tie", "a-tie", "future"]);
        let due = due_cards(&store, &candidates, at(60));
        assert_eq!(due, ids(&["early", "a-tie", "b-tie", "late"]));
        assert_eq!(due_cards(&store, &candidates, at(60)), due);
    }

    #[test]
    fn test_due_cards_includes_unseen_cards() {
        let mut store = ReviewStore::new();
        store.put(CardId::from("old"), review_record(1.0, 2.5, 10));
        let due = due_cards(&store, &ids(&["unseen", "old", "unseen"]), at(60));
        assert_eq!(due, ids(&["old", "unseen"]));
    }

    #[test]
    fn test_due_at_exactly_now() {
        let mut store = ReviewStore::new();
        store.put(CardId::from("a"), review_record(1.0, 2.5, 60));
        assert_eq!(due_cards(&store, &ids(&["a"]), at(59)), Vec::<CardId>::new());
        assert_eq!(due_cards(&store, &ids(&["a"]), at(60)), ids(&["a"]));
    }

    #[test]
    fn test_classify() {
        let config = Config::default();
        let mut store = ReviewStore::new();
        let mut learning = ReviewRecord::new(at(0));
        learning.phase = Phase::Relearning(0);
        store.put(CardId::from("learning"), learning);
        store.put(CardId::from("due"), review_record(1.0, 2.5, 0));
        store.put(CardId::from("scheduled"), review_record(1.0, 2.5, days(2)));
        let mut mastered = review_record(30.0, 2.5, days(30));
        mastered.repetitions = 9;
        store.put(CardId::from("mastered"), mastered);
        let mut at_threshold = review_record(30.0, 2.5, days(30));
        at_threshold.repetitions = 8;
        store.put(CardId::from("threshold"), at_threshold);
        store.put(CardId::from("new"), ReviewRecord::new(at(0)));

        let now = at(days(1));
        let status = |name: &str| classify(&store, &config, &CardId::from(name), now);
        assert_eq!(status("unknown"), CardStatus::New);
        assert_eq!(status("new"), CardStatus::New);
        assert_eq!(status("learning"), CardStatus::Learning);
        assert_eq!(status("due"), CardStatus::Due);
        assert_eq!(status("scheduled"), CardStatus::Scheduled);
        assert_eq!(status("mastered"), CardStatus::Mastered);
        assert_eq!(status("threshold"), CardStatus::Scheduled);
    }

    #[test]
    fn test_stats() -> crate::error::Fallible<()> {
        let config = Config::default();
        let mut store = ReviewStore::new();
        let mut a = ReviewRecord::new(at(0));
        for (minute, grade, secs) in [
            (0, ReviewResult::Good, Some(2.0)),
            (1, ReviewResult::Again, Some(6.0)),
            (2, ReviewResult::Easy, None),
        ] {
            let time = secs.map(ResponseTime::from_secs).transpose()?;
            a = transition(&config, a, grade, time, at(minute));
        }
        store.put(CardId::from("a"), a);
        let b = transition(
            &config,
            review_record(10.0, 2.0, 0),
            ReviewResult::Hard,
            Some(ResponseTime::from_secs(4.0)?),
            at(2),
        );
        store.put(CardId::from("b"), b);

        let stats = stats(&store, &config, &ids(&["a", "b", "c"]), at(3));
        assert_eq!(stats.total_cards, 3);
        assert_eq!(stats.new_cards, 1);
        assert_eq!(stats.learning_cards, 0);
        assert_eq!(stats.scheduled_cards, 2);
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.successful_reviews, 3);
        assert_eq!(stats.success_rate, 0.75);
        assert_eq!(stats.total_study_time_secs, 12.0);
        assert_eq!(stats.average_response_time_secs, Some(4.0));
        // a graduated with Easy at ease 2.5; b dropped to 1.85.
        let average_ease = stats.average_ease.unwrap();
        assert!((average_ease - (2.5 + 1.85) / 2.0).abs() < 1e-9);
        assert_eq!(stats.average_interval_days, Some((1.0 + 12.0) / 2.0));

        let recent: Vec<(&str, Timestamp)> = stats
            .recent_reviews
            .iter()
            .map(|review| (review.card_id.as_str(), review.reviewed_at))
            .collect();
        assert_eq!(
            recent,
            vec![("a", at(2)), ("b", at(2)), ("a", at(1)), ("a", at(0))]
        );
        Ok(())
    }

    #[test]
    fn test_stats_recent_limit() {
        let config = Config {
            recent_history_limit: 2,
            ..Config::default()
        };
        let mut store = ReviewStore::new();
        let mut record = ReviewRecord::new(at(0));
        for minute in 0..5 {
            record = transition(&config, record, ReviewResult::Hard, None, at(minute));
        }
        store.put(CardId::from("a"), record);
        let stats = stats(&store, &config, &ids(&["a"]), at(10));
        let times: Vec<Timestamp> = stats
            .recent_reviews
            .iter()
            .map(|review| review.reviewed_at)
            .collect();
        assert_eq!(times, vec![at(4), at(3)]);
        assert_eq!(stats.average_response_time_secs, None);
    }

    #[test]
    fn test_stats_empty() {
        let config = Config::default();
        let stats = stats(&ReviewStore::new(), &config, &[], at(0));
        assert_eq!(stats.total_cards, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.average_ease, None);
        assert!(stats.recent_reviews.is_empty());
    }
}
