//! SQLite input enumeration and idempotent result persistence.
//!
//! The input database holds a `sources` table and a candidate table (default `texts`), each
//! with at least `id`, `text` and `language` columns. Results go to a `predictions` table
//! keyed by `(source_id, candidate_id)`.

pub mod error;
pub mod input;
pub mod output;
pub mod range;

pub use error::StorageError;
pub use input::{InputRecord, InputStore, PairCursor, PairRow, validate_table_name, value_to_string};
pub use output::{PairRecord, ResultStore};
pub use range::WorkRange;
