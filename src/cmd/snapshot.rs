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


use std::fs::read;
use std::fs::write;
use std::path::Path;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

pub fn export_snapshot(collection: &Collection, path: &Path) -> Fallible<()> {
    let bytes = collection.scheduler.save_snapshot()?;
    write(path, &bytes)?;
    println!(
        "Exported {} records to {}.",
        collection.scheduler.store().len(),
        path.display()
    );
    Ok(())
}

/// Replace the review state with a snapshot file. A corrupt file is
/// reported and the existing state is kept.
pub fn import_snapshot(collection: &mut Collection, path: &Path, now: Timestamp) -> Fallible<()> {
    if !path.exists() {
        return fail("snapshot file does not exist.");
    }
    let bytes = read(path)?;
    collection.scheduler.load_snapshot(&bytes)?;
    collection.save(now)?;
    println!(
        "Imported {} records from {}.",
        collection.scheduler.store().len(),
        path.display()
    );
    Ok(())
}
