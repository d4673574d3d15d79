use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info};

use crate::constants::{DEFAULT_PAGE_SIZE, SOURCE_TABLE};

use super::error::StorageError;
use super::range::WorkRange;

/// One row of the `sources` or candidate table. Any column may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRecord {
    pub id: Option<String>,
    pub text: Option<String>,
    pub language: Option<String>,
}

/// One position of the source × candidate enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRow {
    pub row: u64,
    pub source: Arc<InputRecord>,
    pub candidate: Arc<InputRecord>,
}

/// Converts an id cell to text. Ids may be stored as integers by some loaders.
pub fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(bytes) => String::from_utf8(bytes).ok(),
    }
}

/// Accepts plain SQL identifiers only, since table names are interpolated into queries.
pub fn validate_table_name(name: &str) -> Result<(), StorageError> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StorageError::InvalidTableName {
            name: name.to_string(),
        })
    }
}

/// Read-only view over the ingested `sources` and candidate tables.
///
/// Both must be ordinary rowid tables; rows are enumerated in `(id, rowid)` order.
pub struct InputStore {
    conn: Connection,
    path: PathBuf,
    candidate_table: String,
}

impl std::fmt::Debug for InputStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStore")
            .field("path", &self.path)
            .field("candidate_table", &self.candidate_table)
            .finish()
    }
}

impl InputStore {
    pub fn open(path: &Path, candidate_table: &str) -> Result<Self, StorageError> {
        if !path.is_file() {
            return Err(StorageError::NotFound {
                path: path.to_path_buf(),
            });
        }
        validate_table_name(candidate_table)?;

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
            candidate_table: candidate_table.to_string(),
        };
        store.require_table(SOURCE_TABLE)?;
        store.require_table(candidate_table)?;

        info!(
            path = %path.display(),
            candidate_table = candidate_table,
            "Opened input store"
        );
        Ok(store)
    }

    fn require_table(&self, name: &str) -> Result<(), StorageError> {
        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StorageError::MissingTable {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn candidate_table(&self) -> &str {
        &self.candidate_table
    }

    fn count(&self, table: &str) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count.max(0) as u64)
    }

    pub fn source_count(&self) -> Result<u64, StorageError> {
        self.count(SOURCE_TABLE)
    }

    pub fn candidate_count(&self) -> Result<u64, StorageError> {
        self.count(&self.candidate_table)
    }

    /// Number of rows in the full source × candidate enumeration.
    pub fn total_pairs(&self) -> Result<u64, StorageError> {
        Ok(self.source_count()?.saturating_mul(self.candidate_count()?))
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<KeyedRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, |row| {
            let id: Value = row.get(0)?;
            Ok(KeyedRecord {
                key: (id.clone(), row.get(3)?),
                record: Arc::new(InputRecord {
                    id: value_to_string(id),
                    text: value_to_string(row.get(1)?),
                    language: value_to_string(row.get(2)?),
                }),
            })
        })?;

        let records = rows
            .map(|r| r.map_err(StorageError::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Positions by offset. Used once per cursor to seek to the first row of a range.
    fn fetch_at(
        &self,
        table: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<KeyedRecord>, StorageError> {
        self.query(
            &format!(
                "SELECT id, text, language, rowid FROM {} ORDER BY id, rowid LIMIT ?1 OFFSET ?2",
                table
            ),
            params![limit as i64, offset as i64],
        )
    }

    /// Keyset page: the next `limit` records ordered after `after`.
    fn fetch_after(
        &self,
        table: &str,
        after: &RecordKey,
        limit: u64,
    ) -> Result<Vec<KeyedRecord>, StorageError> {
        // NULL ids sort first, and `id > NULL` is never true
        self.query(
            &format!(
                "SELECT id, text, language, rowid FROM {}
                 WHERE (id IS ?1 AND rowid > ?2) OR (?1 IS NULL AND id IS NOT NULL) OR id > ?1
                 ORDER BY id, rowid LIMIT ?3",
                table
            ),
            params![after.0, after.1, limit as i64],
        )
    }

    /// Enumerates `range` in row order, loading candidates `page_size` at a time.
    pub fn pairs(&self, range: WorkRange, page_size: usize) -> Result<PairCursor<'_>, StorageError> {
        let candidates = self.candidate_count()?;
        let total = self.source_count()?.saturating_mul(candidates);
        let end = range.end().min(total);

        Ok(PairCursor {
            store: self,
            next_row: range.start().min(end),
            end,
            candidates,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE as u64
            } else {
                page_size as u64
            },
            source: None,
            page: Vec::new(),
            page_start: 0,
            page_pos: 0,
        })
    }
}

/// Sort key of an input row: its id cell, then its rowid.
type RecordKey = (Value, i64);

#[derive(Debug, Clone)]
struct KeyedRecord {
    key: RecordKey,
    record: Arc<InputRecord>,
}

/// Iterator over [`PairRow`]s of a [`WorkRange`].
///
/// Seeks to the first row once, then walks both tables by keyset over `(id, rowid)`: the next
/// source follows the current one, and candidate pages follow the last candidate seen, so each
/// row costs one indexed step. Stops after the first error.
pub struct PairCursor<'a> {
    store: &'a InputStore,
    next_row: u64,
    end: u64,
    candidates: u64,
    page_size: u64,
    source: Option<KeyedRecord>,
    page: Vec<KeyedRecord>,
    page_start: u64,
    page_pos: usize,
}

impl PairCursor<'_> {
    /// Rows not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.end - self.next_row
    }

    fn missing(table: &str, position: u64) -> StorageError {
        StorageError::Truncated {
            table: table.to_string(),
            position,
        }
    }

    fn next_source(&mut self, row: u64) -> Result<Arc<InputRecord>, StorageError> {
        let position = row / self.candidates;
        let fetched = match self.source.take() {
            Some(current) if row % self.candidates != 0 => vec![current],
            Some(previous) => self.store.fetch_after(SOURCE_TABLE, &previous.key, 1)?,
            None => self.store.fetch_at(SOURCE_TABLE, position, 1)?,
        };

        let source = fetched
            .into_iter()
            .next()
            .ok_or_else(|| Self::missing(SOURCE_TABLE, position))?;
        let record = Arc::clone(&source.record);
        self.source = Some(source);
        Ok(record)
    }

    fn next_candidate(&mut self, row: u64) -> Result<Arc<InputRecord>, StorageError> {
        let position = row % self.candidates;
        let table = self.store.candidate_table.as_str();

        if self.page.is_empty() {
            self.page = self.store.fetch_at(table, position, self.page_size)?;
            self.page_start = position;
            self.page_pos = 0;
        } else if position == 0 {
            if self.page_start != 0 {
                self.page = self.store.fetch_at(table, 0, self.page_size)?;
                self.page_start = 0;
            }
            self.page_pos = 0;
        } else if self.page_pos >= self.page.len() {
            let after = self.page[self.page.len() - 1].key.clone();
            self.page = self.store.fetch_after(table, &after, self.page_size)?;
            self.page_start = position;
            self.page_pos = 0;
            debug!(
                position = position,
                rows = self.page.len(),
                "Loaded candidate page"
            );
        }

        let candidate = self
            .page
            .get(self.page_pos)
            .map(|c| Arc::clone(&c.record))
            .ok_or_else(|| Self::missing(table, position))?;
        self.page_pos += 1;
        Ok(candidate)
    }

    fn load(&mut self, row: u64) -> Result<PairRow, StorageError> {
        let source = self.next_source(row)?;
        let candidate = self.next_candidate(row)?;
        Ok(PairRow {
            row,
            source,
            candidate,
        })
    }
}

impl Iterator for PairCursor<'_> {
    type Item = Result<PairRow, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row >= self.end {
            return None;
        }

        let row = self.next_row;
        match self.load(row) {
            Ok(pair) => {
                self.next_row += 1;
                Some(Ok(pair))
            }
            Err(e) => {
                self.next_row = self.end;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}
