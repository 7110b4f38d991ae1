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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

/// How many snapshots to keep. Older ones are pruned on save.
const KEEP_SNAPSHOTS: i64 = 10;

/// Stores review snapshots. The contents are opaque bytes: this module
/// knows nothing about their format.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating schema in {database_path}");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// The most recently saved snapshot, if any.
    pub fn latest_snapshot(&self) -> Fallible<Option<Vec<u8>>> {
        let sql = "select contents from snapshots order by snapshot_id desc limit 1;";
        let contents: Option<Vec<u8>> = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .optional()?;
        Ok(contents)
    }

    /// Save a snapshot, pruning old ones, in a single transaction.
    pub fn save_snapshot(&mut self, saved_at: Timestamp, contents: &[u8]) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        let sql = "insert into snapshots (saved_at, contents) values (?, ?);";
        tx.execute(sql, (saved_at, contents))?;
        let pruned = prune_snapshots(&tx)?;
        tx.commit()?;
        if pruned > 0 {
            log::debug!("Pruned {pruned} old snapshots.");
        }
        Ok(())
    }

    pub fn snapshot_count(&self) -> Fallible<usize> {
        let sql = "select count(*) from snapshots;";
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn prune_snapshots(tx: &Transaction) -> Fallible<usize> {
    let sql = "delete from snapshots where snapshot_id not in (select snapshot_id from snapshots order by snapshot_id desc limit ?);";
    let deleted = tx.execute(sql, [KEEP_SNAPSHOTS])?;
    Ok(deleted)
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["snapshots"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::helper::at;

    fn open(dir: &tempfile::TempDir) -> Fallible<Database> {
        let path = dir.path().join("studycards.db");
        Database::new(path.to_str().unwrap())
    }

    #[test]
    fn test_empty_database() -> Fallible<()> {
        let dir = tempdir()?;
        let db = open(&dir)?;
        assert_eq!(db.latest_snapshot()?, None);
        assert_eq!(db.snapshot_count()?, 0);
        Ok(())
    }

    #[test]
    fn test_latest_snapshot_wins() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        db.save_snapshot(at(0), b"first")?;
        db.save_snapshot(at(1), b"second")?;
        assert_eq!(db.latest_snapshot()?, Some(b"second".to_vec()));
        Ok(())
    }

    #[test]
    fn test_reopen() -> Fallible<()> {
        let dir = tempdir()?;
        {
            let mut db = open(&dir)?;
            db.save_snapshot(at(0), b"kept")?;
        }
        let db = open(&dir)?;
        assert_eq!(db.latest_snapshot()?, Some(b"kept".to_vec()));
        Ok(())
    }

    #[test]
    fn test_pruning() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        for i in 0..15 {
            db.save_snapshot(at(i), format!("snapshot {i}").as_bytes())?;
        }
        assert_eq!(db.snapshot_count()?, KEEP_SNAPSHOTS as usize);
        assert_eq!(db.latest_snapshot()?, Some(b"snapshot 14".to_vec()));
        Ok(())
    }
}
