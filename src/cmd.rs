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


pub mod query;
pub mod review;
pub mod snapshot;
pub mod stats;

use crate::collection::Collection;
use crate::types::card_id::CardId;

/// The cards named on the command line, or every card with a review record
/// if none were named.
fn candidates(collection: &Collection, card_ids: Vec<String>) -> Vec<CardId> {
    if card_ids.is_empty() {
        collection.scheduler.store().card_ids().cloned().collect()
    } else {
        card_ids.into_iter().map(CardId::new).collect()
    }
}
