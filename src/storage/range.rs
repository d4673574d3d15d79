use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Half-open interval `[start, end)` of 0-based pair rows.
///
/// Rows enumerate the source × candidate cross product source-major, both sides ordered by
/// id, so row `r` pairs source `r / C` with candidate `r % C` for `C` candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkRange {
    start: u64,
    end: u64,
}

impl WorkRange {
    pub fn new(start: u64, end: u64) -> Result<Self, StorageError> {
        if start > end {
            return Err(StorageError::InvalidRange {
                reason: format!("start {} is after end {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    /// Range between two bounds given in either order.
    pub fn covering(a: u64, b: u64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Resolves optional CLI bounds against the number of available rows.
    ///
    /// A missing start means 0, a missing end means `total`. Both are clamped to `total`.
    pub fn resolve(start: Option<u64>, end: Option<u64>, total: u64) -> Result<Self, StorageError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(StorageError::InvalidRange {
                    reason: format!("start {} is after end {}", s, e),
                });
            }
        }

        let end = end.unwrap_or(total).min(total);
        let start = start.unwrap_or(0).min(end);
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: u64) -> bool {
        row >= self.start && row < self.end
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &WorkRange) -> WorkRange {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        WorkRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for WorkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
