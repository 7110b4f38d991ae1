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


use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::grade::ReviewResult;
use crate::types::timestamp::Timestamp;

pub fn grade_card(
    collection: &mut Collection,
    card_id: CardId,
    grade: ReviewResult,
    time: Option<f64>,
    now: Timestamp,
) -> Fallible<()> {
    let outcome = collection
        .scheduler
        .grade_review(&card_id, grade, time, now);
    if let Some(err) = &outcome.rejected {
        eprintln!("warning: {err}; review scheduled without timing.");
    }
    collection.save(now)?;
    let record = outcome.record;
    println!(
        "{card_id}: {} (interval {} days, ease {:.2}), due {}",
        record.phase, record.interval_days, record.ease_factor, record.due_at
    );
    Ok(())
}

pub fn remove_card(collection: &mut Collection, card_id: CardId, now: Timestamp) -> Fallible<()> {
    if collection.scheduler.store().lookup(&card_id).is_none() {
        println!("{card_id}: no review record.");
        return Ok(());
    }
    collection.scheduler.remove(&card_id);
    collection.save(now)?;
    println!("{card_id}: removed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::helper::at;
    use crate::types::phase::Phase;

    #[test]
    fn test_grade_then_remove() -> Fallible<()> {
        let dir = tempdir()?;
        let db_path = dir.path().join("cards.db").display().to_string();
        let id = CardId::from("card");
        let mut collection = Collection::open(Some(db_path.clone()), None)?;
        grade_card(&mut collection, id.clone(), ReviewResult::Easy, Some(f64::NAN), at(0))?;

        let mut collection = Collection::open(Some(db_path.clone()), None)?;
        let record = collection.scheduler.record(&id, at(0));
        assert_eq!(record.phase, Phase::Review);
        assert!(record.history.is_empty());

        remove_card(&mut collection, id.clone(), at(1))?;
        let collection = Collection::open(Some(db_path), None)?;
        assert!(collection.scheduler.store().is_empty());
        assert_eq!(collection.db.snapshot_count()?, 2);
        Ok(())
    }
}
