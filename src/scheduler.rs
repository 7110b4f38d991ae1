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

use crate::algorithm::schedule;
use crate::algorithm::transition;
use crate::config::Config;
use crate::error::Fallible;
use crate::error::ScheduleError;
use crate::query::CardStatus;
use crate::query::StudyStats;
use crate::query::classify;
use crate::query::due_cards;
use crate::query::stats;
use crate::store::ReviewStore;
use crate::store::decode_snapshot;
use crate::types::card_id::CardId;
use crate::types::grade::ReviewResult;
use crate::types::record::ReviewRecord;
use crate::types::response_time::ResponseTime;
use crate::types::timestamp::Timestamp;

/// The review state of one card set, together with the configuration used
/// to schedule it. Construct one when a card set is loaded and drop it when
/// the set is unloaded. To share one across threads, put the whole
/// scheduler behind a single lock.
pub struct Scheduler {
    config: Config,
    store: ReviewStore,
}

/// The result of grading a review.
#[derive(Debug)]
pub struct GradeOutcome {
    /// The card's record after the review.
    pub record: ReviewRecord,
    /// Set when the response time was rejected. The review was still
    /// scheduled, but left out of the card's history.
    pub rejected: Option<ScheduleError>,
}

impl Scheduler {
    pub fn new(config: Config) -> Fallible<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: ReviewStore::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ReviewStore {
        &self.store
    }

    /// A card's current record, or a fresh one due now if the card has
    /// never been reviewed.
    pub fn record(&self, card_id: &CardId, now: Timestamp) -> ReviewRecord {
        self.store.get(card_id, now)
    }

    /// Grade a review of a card: fetch its record, apply the transition,
    /// and store the result.
    pub fn grade_review(
        &mut self,
        card_id: &CardId,
        grade: ReviewResult,
        response_time_secs: Option<f64>,
        now: Timestamp,
    ) -> GradeOutcome {
        let record = self.store.get(card_id, now);
        let before = record.phase;
        let (next, rejected) = match response_time_secs.map(ResponseTime::from_secs) {
            Some(Err(err)) => {
                log::warn!("Ignoring response time for card {card_id}: {err}");
                (schedule(&self.config, record, grade, now), Some(err))
            }
            Some(Ok(time)) => (transition(&self.config, record, grade, Some(time), now), None),
            None => (transition(&self.config, record, grade, None, now), None),
        };
        log::debug!(
            "Graded card {card_id} {grade}: {before} -> {}, due {}",
            next.phase,
            next.due_at
        );
        self.store.put(card_id.clone(), next.clone());
        GradeOutcome {
            record: next,
            rejected,
        }
    }

    /// Replace a card's record outright.
    pub fn put(&mut self, card_id: CardId, record: ReviewRecord) {
        self.store.put(card_id, record);
    }

    /// Forget a card. Unknown cards are ignored.
    pub fn remove(&mut self, card_id: &CardId) {
        if self.store.remove(card_id).is_some() {
            log::debug!("Removed card {card_id}");
        }
    }

    pub fn due_cards(&self, card_ids: &[CardId], now: Timestamp) -> Vec<CardId> {
        due_cards(&self.store, card_ids, now)
    }

    pub fn classify(&self, card_id: &CardId, now: Timestamp) -> CardStatus {
        classify(&self.store, &self.config, card_id, now)
    }

    pub fn stats(&self, card_ids: &[CardId], now: Timestamp) -> StudyStats {
        stats(&self.store, &self.config, card_ids, now)
    }

    /// Replace every record with the contents of a snapshot. Besides the
    /// store's own checks, every learning step index must exist in this
    /// scheduler's configuration, and every ease factor must lie within its
    /// bounds. On error nothing changes.
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> Result<(), ScheduleError> {
        let records = decode_snapshot(bytes)?;
        let step_count = self.config.learning_steps.len();
        let (min_ease, max_ease) = (self.config.min_ease, self.config.max_ease);
        for (card_id, record) in &records {
            if !(min_ease..=max_ease).contains(&record.ease_factor) {
                return Err(ScheduleError::DataCorruption(format!(
                    "card {card_id} has ease factor {}, outside [{min_ease}, {max_ease}]",
                    record.ease_factor
                )));
            }
            if let Some(step) = record.phase.step() {
                if step >= step_count {
                    return Err(ScheduleError::DataCorruption(format!(
                        "card {card_id} is on learning step {step}, but only {step_count} are configured"
                    )));
                }
            }
        }
        log::info!("Loaded {} review records.", records.len());
        self.store.replace(records);
        Ok(())
    }

    pub fn save_snapshot(&self) -> Fallible<Vec<u8>> {
        self.store.save_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::at;
    use crate::config::INTERVAL_LIMIT_DAYS;
    use crate::helper::days;
    use crate::types::phase::Phase;

    #[test]
    fn test_rejects_invalid_config() {
        let config = Config {
            learning_steps: Vec::new(),
            ..Config::default()
        };
        assert!(Scheduler::new(config).is_err());
    }

    #[test]
    fn test_grade_review_creates_and_updates_record() -> Fallible<()> {
        let mut scheduler = Scheduler::new(Config::default())?;
        let id = CardId::from("card");
        assert!(scheduler.store().lookup(&id).is_none());

        let outcome = scheduler.grade_review(&id, ReviewResult::Good, Some(2.5), at(0));
        assert!(outcome.rejected.is_none());
        assert_eq!(outcome.record.phase, Phase::Learning(1));
        assert_eq!(scheduler.record(&id, at(0)), outcome.record);

        let outcome = scheduler.grade_review(&id, ReviewResult::Good, Some(1.0), at(1));
        assert_eq!(outcome.record.phase, Phase::Review);
        assert_eq!(outcome.record.due_at, at(1 + days(1)));
        assert_eq!(outcome.record.history.len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_response_time_still_schedules() -> Fallible<()> {
        let mut scheduler = Scheduler::new(Config::default())?;
        let id = CardId::from("card");
        let outcome = scheduler.grade_review(&id, ReviewResult::Easy, Some(-4.0), at(0));
        assert_eq!(
            outcome.rejected,
            Some(ScheduleError::InvalidResponseTime(-4.0))
        );
        assert_eq!(outcome.record.phase, Phase::Review);
        assert!(outcome.record.history.is_empty());
        assert_eq!(outcome.record.last_reviewed_at, Some(at(0)));
        assert_eq!(scheduler.record(&id, at(0)), outcome.record);
        Ok(())
    }

    #[test]
    fn test_unmeasured_response_time_is_recorded() -> Fallible<()> {
        let mut scheduler = Scheduler::new(Config::default())?;
        let id = CardId::from("card");
        let outcome = scheduler.grade_review(&id, ReviewResult::Hard, None, at(0));
        assert!(outcome.rejected.is_none());
        assert_eq!(outcome.record.history.len(), 1);
        assert_eq!(outcome.record.history[0].response_time, None);
        Ok(())
    }

    #[test]
    fn test_remove() -> Fallible<()> {
        let mut scheduler = Scheduler::new(Config::default())?;
        let id = CardId::from("card");
        scheduler.grade_review(&id, ReviewResult::Good, None, at(0));
        scheduler.remove(&id);
        scheduler.remove(&id);
        assert!(scheduler.store().is_empty());
        assert_eq!(scheduler.classify(&id, at(0)), CardStatus::New);
        Ok(())
    }

    #[test]
    fn test_snapshot_step_beyond_config_rejected() -> Fallible<()> {
        let long = Config {
            learning_steps: vec![
                chrono::Duration::minutes(1),
                chrono::Duration::minutes(10),
                chrono::Duration::minutes(60),
            ],
            ..Config::default()
        };
        let mut source = Scheduler::new(long)?;
        let id = CardId::from("card");
        source.grade_review(&id, ReviewResult::Good, None, at(0));
        source.grade_review(&id, ReviewResult::Good, None, at(1));
        assert_eq!(source.record(&id, at(1)).phase, Phase::Learning(2));
        let bytes = source.save_snapshot()?;

        let mut target = Scheduler::new(Config::default())?;
        target.grade_review(&CardId::from("other"), ReviewResult::Good, None, at(0));
        let result = target.load_snapshot(&bytes);
        assert!(matches!(result, Err(ScheduleError::DataCorruption(_))));
        assert_eq!(target.store().len(), 1);
        assert!(target.store().lookup(&id).is_none());
        Ok(())
    }

    #[test]
    fn test_snapshot_ease_out_of_bounds_rejected() -> Fallible<()> {
        let mut source = Scheduler::new(Config::default())?;
        let id = CardId::from("card");
        source.grade_review(&id, ReviewResult::Good, None, at(0));
        let json = String::from_utf8_lossy(&source.save_snapshot()?).into_owned();
        assert!(json.contains("\"ease_factor\":2.5"));

        let mut target = Scheduler::new(Config::default())?;
        for ease in ["0.4", "5.5"] {
            let bad = json.replace("\"ease_factor\":2.5", &format!("\"ease_factor\":{ease}"));
            let result = target.load_snapshot(bad.as_bytes());
            assert!(matches!(result, Err(ScheduleError::DataCorruption(_))));
            assert!(target.store().is_empty());
        }
        assert_eq!(target.stats(&[id], at(0)).average_ease, None);
        Ok(())
    }

    #[test]
    fn test_snapshot_round_trip_at_interval_limit() -> Fallible<()> {
        let config = Config {
            graduating_interval_days: INTERVAL_LIMIT_DAYS,
            max_interval_days: INTERVAL_LIMIT_DAYS,
            ..Config::default()
        };
        let mut source = Scheduler::new(config.clone())?;
        let id = CardId::from("card");
        source.grade_review(&id, ReviewResult::Good, None, at(0));
        source.grade_review(&id, ReviewResult::Good, None, at(1));
        source.grade_review(&id, ReviewResult::Easy, None, at(2));
        let record = source.record(&id, at(2));
        assert_eq!(record.interval_days, INTERVAL_LIMIT_DAYS);

        let bytes = source.save_snapshot()?;
        let mut target = Scheduler::new(config)?;
        target.load_snapshot(&bytes)?;
        assert_eq!(target.store(), source.store());
        Ok(())
    }

    #[test]
    fn test_snapshot_round_trip() -> Fallible<()> {
        let mut source = Scheduler::new(Config::default())?;
        for (i, grade) in [ReviewResult::Good, ReviewResult::Easy, ReviewResult::Again]
            .into_iter()
            .enumerate()
        {
            source.grade_review(&CardId::from(i as u64), grade, Some(0.1 * i as f64), at(0));
        }
        let bytes = source.save_snapshot()?;
        let mut target = Scheduler::new(Config::default())?;
        target.load_snapshot(&bytes)?;
        assert_eq!(target.store(), source.store());
        Ok(())
    }
}
