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


use crate::cmd::candidates;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

pub fn print_due_cards(
    collection: &Collection,
    card_ids: Vec<String>,
    now: Timestamp,
) -> Fallible<()> {
    let card_ids = candidates(collection, card_ids);
    let due = collection.scheduler.due_cards(&card_ids, now);
    if due.is_empty() {
        println!("No cards due.");
        return Ok(());
    }
    for card_id in due {
        println!("{card_id}");
    }
    Ok(())
}

pub fn print_status(collection: &Collection, card_id: CardId, now: Timestamp) -> Fallible<()> {
    let status = collection.scheduler.classify(&card_id, now);
    println!("{card_id}: {status}");
    if let Some(record) = collection.scheduler.store().lookup(&card_id) {
        println!("  phase:       {}", record.phase);
        println!("  ease:        {:.2}", record.ease_factor);
        println!("  interval:    {} days", record.interval_days);
        println!("  due:         {}", record.due_at);
        println!("  repetitions: {}", record.repetitions);
        println!("  lapses:      {}", record.lapses);
        println!("  reviews:     {}", record.review_count());
    }
    Ok(())
}
