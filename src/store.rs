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

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::ScheduleError;
use crate::types::card_id::CardId;
use crate::types::record::ReviewRecord;
use crate::types::timestamp::Timestamp;

const SNAPSHOT_VERSION: u32 = 1;

/// The authoritative mapping from card to review state for one loaded card
/// set. Records are only ever replaced whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewStore {
    records: BTreeMap<CardId, ReviewRecord>,
}

impl ReviewStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Retrieve a card's record. A card with no record gets a fresh one
    /// that is due now; the store itself is not modified.
    pub fn get(&self, card_id: &CardId, now: Timestamp) -> ReviewRecord {
        match self.records.get(card_id) {
            Some(record) => record.clone(),
            None => ReviewRecord::new(now),
        }
    }

    /// Retrieve a card's record, if it has one.
    pub fn lookup(&self, card_id: &CardId) -> Option<&ReviewRecord> {
        self.records.get(card_id)
    }

    pub fn put(&mut self, card_id: CardId, record: ReviewRecord) {
        self.records.insert(card_id, record);
    }

    /// Drop a card's record. Removing an unknown card does nothing.
    pub fn remove(&mut self, card_id: &CardId) -> Option<ReviewRecord> {
        self.records.remove(card_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All known card IDs, in order.
    pub fn card_ids(&self) -> impl Iterator<Item = &CardId> {
        self.records.keys()
    }

    /// Replace the entire store with the contents of a snapshot. On error,
    /// the store is left exactly as it was.
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> Result<(), ScheduleError> {
        let records = decode_snapshot(bytes)?;
        self.replace(records);
        Ok(())
    }

    /// Serialize every record.
    pub fn save_snapshot(&self) -> Fallible<Vec<u8>> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            records: self
                .records
                .iter()
                .map(|(card_id, record)| SnapshotEntryRef { card_id, record })
                .collect(),
        };
        let bytes = serde_json::to_vec(&file)?;
        log::debug!(
            "Saved snapshot of {} records ({} bytes).",
            self.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    pub(crate) fn replace(&mut self, records: BTreeMap<CardId, ReviewRecord>) {
        log::debug!(
            "Replacing {} records with {} from snapshot.",
            self.len(),
            records.len()
        );
        self.records = records;
    }
}

#[derive(Serialize)]
struct SnapshotFile<'a> {
    version: u32,
    records: Vec<SnapshotEntryRef<'a>>,
}

#[derive(Serialize)]
struct SnapshotEntryRef<'a> {
    card_id: &'a CardId,
    record: &'a ReviewRecord,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OwnedSnapshotFile {
    version: u32,
    records: Vec<SnapshotEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotEntry {
    card_id: CardId,
    record: ReviewRecord,
}

/// Decode and check a snapshot without touching any store.
pub(crate) fn decode_snapshot(
    bytes: &[u8],
) -> Result<BTreeMap<CardId, ReviewRecord>, ScheduleError> {
    let file: OwnedSnapshotFile = serde_json::from_slice(bytes)
        .map_err(|e| ScheduleError::DataCorruption(e.to_string()))?;
    if file.version != SNAPSHOT_VERSION {
        return Err(ScheduleError::DataCorruption(format!(
            "unsupported snapshot version {}",
            file.version
        )));
    }
    let mut records = BTreeMap::new();
    for SnapshotEntry { card_id, record } in file.records {
        check_record(&card_id, &record)?;
        if records.insert(card_id.clone(), record).is_some() {
            return Err(ScheduleError::DataCorruption(format!(
                "duplicate record for card {card_id}"
            )));
        }
    }
    Ok(records)
}

fn check_record(card_id: &CardId, record: &ReviewRecord) -> Result<(), ScheduleError> {
    if !(record.ease_factor.is_finite() && record.ease_factor > 0.0) {
        return Err(ScheduleError::DataCorruption(format!(
            "card {card_id} has invalid ease factor {}",
            record.ease_factor
        )));
    }
    if !(record.interval_days.is_finite() && record.interval_days >= 0.0) {
        return Err(ScheduleError::DataCorruption(format!(
            "card {card_id} has invalid interval {}",
            record.interval_days
        )));
    }
    Ok(())
}
