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

use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::Scheduler;
use crate::types::timestamp::Timestamp;

const DEFAULT_DATABASE: &str = "studycards.db";
const DEFAULT_CONFIG: &str = "studycards.toml";

/// A scheduler loaded from a database, with the configuration it was
/// opened with.
pub struct Collection {
    pub db: Database,
    pub scheduler: Scheduler,
}

impl Collection {
    /// Open the database and configuration. Without an explicit config
    /// path, `studycards.toml` is used if it exists, and the defaults
    /// otherwise.
    pub fn open(db_path: Option<String>, config_path: Option<String>) -> Fallible<Self> {
        let config = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return fail("config file does not exist.");
                }
                Config::load(&path)?
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG);
                if path.exists() {
                    Config::load(&path)?
                } else {
                    Config::default()
                }
            }
        };

        let db_path: PathBuf = match db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_DATABASE),
        };
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db = Database::new(db_path)?;

        let mut scheduler = Scheduler::new(config)?;
        if let Some(bytes) = db.latest_snapshot()? {
            log::debug!("Loading review state...");
            let start = Instant::now();
            scheduler.load_snapshot(&bytes)?;
            let duration = start.elapsed().as_millis();
            log::debug!("Review state loaded in {duration}ms.");
        }

        Ok(Self { db, scheduler })
    }

    /// Persist the scheduler's current state.
    pub fn save(&mut self, now: Timestamp) -> Fallible<()> {
        let bytes = self.scheduler.save_snapshot()?;
        self.db.save_snapshot(now, &bytes)
    }
}
