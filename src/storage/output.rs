use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::constants::PREDICTIONS_TABLE;
use crate::scoring::ScoreVector;

use super::error::StorageError;

/// Labeled result for one (source, candidate) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRecord {
    pub source_id: String,
    pub candidate_id: String,
    pub scores: ScoreVector,
    pub label: String,
}

/// Writable `predictions` table. Inserts are idempotent on `(source_id, candidate_id)`.
pub struct ResultStore {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore")
            .field("path", &self.path)
            .finish()
    }
}

impl ResultStore {
    /// Opens or creates the database and ensures the `predictions` table exists.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                source_id TEXT NOT NULL,
                candidate_id TEXT NOT NULL,
                scores TEXT,
                label TEXT,
                PRIMARY KEY (source_id, candidate_id)
            );",
            PREDICTIONS_TABLE
        ))?;

        info!(path = %path.display(), "Opened result store");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a bundle in one transaction, ignoring pairs already present.
    ///
    /// Returns the number of newly inserted rows.
    pub fn insert_bundle(&mut self, records: &[PairRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(&format!(
                "INSERT OR IGNORE INTO {} (source_id, candidate_id, scores, label)
                 VALUES (?1, ?2, ?3, ?4)",
                PREDICTIONS_TABLE
            ))?;
            for record in records {
                let scores = record.scores.to_json()?;
                inserted += stmt.execute(params![
                    record.source_id,
                    record.candidate_id,
                    scores,
                    record.label
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            records = records.len(),
            inserted = inserted,
            "Committed bundle"
        );
        Ok(inserted)
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", PREDICTIONS_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    pub fn contains(&self, source_id: &str, candidate_id: &str) -> Result<bool, StorageError> {
        let found: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE source_id = ?1 AND candidate_id = ?2",
                PREDICTIONS_TABLE
            ),
            params![source_id, candidate_id],
            |row| row.get(0),
        )?;
        Ok(found > 0)
    }

    /// Every stored record ordered by `(source_id, candidate_id)`.
    pub fn fetch_all(&self) -> Result<Vec<PairRecord>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT source_id, candidate_id, scores, label FROM {}
             ORDER BY source_id, candidate_id",
            PREDICTIONS_TABLE
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (source_id, candidate_id, scores, label) = row?;
            let scores = match scores {
                Some(json) => ScoreVector::from_json(&json)?,
                None => ScoreVector::new(),
            };
            records.push(PairRecord {
                source_id,
                candidate_id,
                scores,
                label: label.unwrap_or_default(),
            });
        }
        Ok(records)
    }
}
