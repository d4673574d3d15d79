use std::sync::Arc;

use tracing::warn;

use crate::annotation::Language;
use crate::scoring::DocumentKey;
use crate::storage::{InputRecord, PairRow, StorageError, WorkRange};

use super::error::{DataError, PipelineError};

/// A validated pair ready for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTask {
    row: u64,
    source: Arc<InputRecord>,
    candidate: Arc<InputRecord>,
}

fn check_record(
    row: u64,
    side: &str,
    record: &InputRecord,
    language: Language,
) -> Result<(), DataError> {
    if record.id.is_none() {
        return Err(DataError {
            row,
            reason: format!("{} has no id", side),
        });
    }
    if record.text.is_none() {
        return Err(DataError {
            row,
            reason: format!("{} has no text", side),
        });
    }
    if let Some(lang) = &record.language {
        if !lang.trim().eq_ignore_ascii_case(language.code()) {
            return Err(DataError {
                row,
                reason: format!("{} language '{}' is not '{}'", side, lang, language.code()),
            });
        }
    }
    Ok(())
}

impl PairTask {
    /// Validates both sides of `row`. A missing language is accepted.
    pub fn try_from_row(row: PairRow, language: Language) -> Result<Self, DataError> {
        check_record(row.row, "source", &row.source, language)?;
        check_record(row.row, "candidate", &row.candidate, language)?;
        Ok(Self {
            row: row.row,
            source: row.source,
            candidate: row.candidate,
        })
    }

    pub fn row(&self) -> u64 {
        self.row
    }

    pub fn source_id(&self) -> &str {
        self.source.id.as_deref().unwrap_or_default()
    }

    pub fn candidate_id(&self) -> &str {
        self.candidate.id.as_deref().unwrap_or_default()
    }

    pub fn source_text(&self) -> &str {
        self.source.text.as_deref().unwrap_or_default()
    }

    pub fn candidate_text(&self) -> &str {
        self.candidate.text.as_deref().unwrap_or_default()
    }

    pub fn source_key(&self) -> DocumentKey {
        DocumentKey::source(self.source_id())
    }

    pub fn candidate_key(&self) -> DocumentKey {
        DocumentKey::candidate(self.candidate_id())
    }
}

/// Consecutive rows scored as one unit. `range` includes skipped rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkBundle {
    pub range: WorkRange,
    pub tasks: Vec<PairTask>,
    pub skipped: usize,
}

/// Groups a row stream into [`WorkBundle`]s of `size` rows, skipping malformed rows.
pub struct Bundler<I> {
    rows: I,
    size: usize,
    language: Language,
    next_row: Option<u64>,
    done: bool,
}

impl<I> Bundler<I>
where
    I: Iterator<Item = Result<PairRow, StorageError>>,
{
    pub fn new(rows: I, size: usize, language: Language) -> Self {
        Self {
            rows,
            size: size.max(1),
            language,
            next_row: None,
            done: false,
        }
    }
}

impl<I> Iterator for Bundler<I>
where
    I: Iterator<Item = Result<PairRow, StorageError>>,
{
    type Item = Result<WorkBundle, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut tasks = Vec::with_capacity(self.size);
        let mut skipped = 0;
        let mut first: Option<u64> = None;
        let mut last = 0;

        for _ in 0..self.size {
            match self.rows.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(source)) => {
                    self.done = true;
                    let start = first.or(self.next_row).unwrap_or(0);
                    let failed = self.next_row.unwrap_or(start);
                    let range = WorkRange::covering(start, failed + 1);
                    return Some(Err(PipelineError::Read { range, source }));
                }
                Some(Ok(pair)) => {
                    first.get_or_insert(pair.row);
                    last = pair.row;
                    self.next_row = Some(pair.row + 1);

                    match PairTask::try_from_row(pair, self.language) {
                        Ok(task) => tasks.push(task),
                        Err(e) => {
                            warn!(row = e.row, reason = %e.reason, "Skipping malformed row");
                            skipped += 1;
                        }
                    }
                }
            }
        }

        let start = first?;
        Some(Ok(WorkBundle {
            range: WorkRange::covering(start, last + 1),
            tasks,
            skipped,
        }))
    }
}

/// Pulls up to `size` bundles from `bundles`. An empty batch means the stream is exhausted.
pub fn next_batch<I>(bundles: &mut I, size: usize) -> Result<Vec<WorkBundle>, PipelineError>
where
    I: Iterator<Item = Result<WorkBundle, PipelineError>>,
{
    bundles.take(size.max(1)).collect()
}
