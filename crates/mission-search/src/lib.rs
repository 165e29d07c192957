//! `mission-search`: relevance-ranked search over the activity log and the
//! note corpus.
//!
//! Each [`RecordSource`] emits scored candidates; [`SearchEngine`] merges
//! them, sorts by descending relevance (ties keep emission order) and caps
//! the list. Scoring lives in [`scoring`] as plain functions.

pub mod engine;
pub mod error;
pub mod notes;
pub mod query;
pub mod scoring;
pub mod types;

pub use engine::{ActivityRecords, RecordSource, SearchEngine, DEFAULT_MAX_RESULTS};
pub use error::{Result, SearchError};
pub use notes::NoteCorpus;
pub use query::Query;
pub use types::{RecordKind, SearchRecord, SearchResponse};
