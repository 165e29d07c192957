use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use mission_activity::ActivityLog;
use tracing::{debug, warn};

use crate::error::Result;
use crate::query::Query;
use crate::scoring::relevance;
use crate::types::{RecordKind, SearchRecord};

/// Default cap on returned results.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Something that can produce scored candidates for a query.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn name(&self) -> &str;

    /// Candidates in emission order. Errors drop this source from the result.
    async fn collect(&self, query: &Query) -> Result<Vec<SearchRecord>>;
}

/// Activity log rows whose title or description contains the query.
pub struct ActivityRecords {
    log: Arc<ActivityLog>,
    limit: u32,
}

impl ActivityRecords {
    pub fn new(log: Arc<ActivityLog>, limit: u32) -> Self {
        Self { log, limit }
    }
}

#[async_trait]
impl RecordSource for ActivityRecords {
    fn name(&self) -> &str {
        "activities"
    }

    async fn collect(&self, query: &Query) -> Result<Vec<SearchRecord>> {
        let rows = self.log.search_text(&query.normalized, self.limit)?;
        Ok(rows
            .into_iter()
            .map(|a| {
                let description = a.description.unwrap_or_default();
                let score = relevance(&query.normalized, &format!("{} {}", a.title, description));
                SearchRecord {
                    kind: RecordKind::Activity,
                    title: a.title,
                    content: description,
                    source_path: None,
                    timestamp: Some(a.created_at),
                    score,
                }
            })
            .collect())
    }
}

pub struct SearchEngine {
    max_results: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

impl SearchEngine {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    /// Query every source concurrently and rank the merged candidates.
    ///
    /// Short queries return nothing without touching any source. Equal
    /// scores keep source order, then each source's own order.
    pub async fn search(&self, raw: &str, sources: &[&dyn RecordSource]) -> Vec<SearchRecord> {
        let Some(query) = Query::parse(raw) else {
            return Vec::new();
        };

        let outcomes = join_all(sources.iter().map(|s| s.collect(&query))).await;

        let mut results = Vec::new();
        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(records) => {
                    debug!(source = source.name(), count = records.len(), "search source done");
                    results.extend(records);
                }
                Err(e) => warn!(source = source.name(), error = %e, "search source failed"),
            }
        }

        // stable: ties keep emission order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(self.max_results);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use mission_activity::{kinds, NewActivity};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        records: Vec<SearchRecord>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, scores: &[f64]) -> Self {
            let records = scores
                .iter()
                .enumerate()
                .map(|(i, score)| SearchRecord {
                    kind: RecordKind::Memory,
                    title: format!("{name}-{i}"),
                    content: String::new(),
                    source_path: None,
                    timestamp: None,
                    score: *score,
                })
                .collect();
            Self {
                name,
                records,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordSource for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn collect(&self, _query: &Query) -> Result<Vec<SearchRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl RecordSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn collect(&self, _query: &Query) -> Result<Vec<SearchRecord>> {
            Err(SearchError::Io(std::io::Error::other("disk gone")))
        }
    }

    fn titles(records: &[SearchRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    #[tokio::test]
    async fn short_query_touches_no_source() {
        let src = Fixed::new("a", &[1.0]);
        let engine = SearchEngine::default();
        assert!(engine.search("x", &[&src]).await.is_empty());
        assert!(engine.search("", &[&src]).await.is_empty());
        assert_eq!(src.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ranks_descending_and_keeps_emission_order_on_ties() {
        let first = Fixed::new("act", &[3.0, 7.0]);
        let second = Fixed::new("note", &[7.0, 3.0, 12.0]);
        let results = SearchEngine::default().search("query", &[&first, &second]).await;
        assert_eq!(
            titles(&results),
            vec!["note-2", "act-1", "note-0", "act-0", "note-1"]
        );
    }

    #[tokio::test]
    async fn failing_source_is_skipped() {
        let good = Fixed::new("good", &[1.0, 2.0]);
        let results = SearchEngine::default().search("query", &[&Broken, &good]).await;
        assert_eq!(titles(&results), vec!["good-1", "good-0"]);
    }

    #[tokio::test]
    async fn truncates_to_cap() {
        let many = Fixed::new("m", &[1.0; 30]);
        assert_eq!(SearchEngine::default().search("query", &[&many]).await.len(), 20);
        assert_eq!(SearchEngine::new(5).search("query", &[&many]).await.len(), 5);
    }

    #[tokio::test]
    async fn activity_records_score_title_and_description() {
        let log = Arc::new(ActivityLog::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap());
        log.append(&NewActivity::new(kinds::SEARCH, "Marillion tickets").with_description("row 12"))
            .unwrap();
        log.append(&NewActivity::new(kinds::INFO, "Other")).unwrap();

        let source = ActivityRecords::new(log, 20);
        let results = SearchEngine::default().search("marillion", &[&source]).await;
        assert_eq!(results.len(), 1);
        let hit = &results[0];
        assert_eq!(hit.kind, RecordKind::Activity);
        assert_eq!(hit.content, "row 12");
        assert!(hit.timestamp.is_some());
        assert!((hit.score - (10.0 + 2.0 + 5.0)).abs() < 1e-9);
    }
}
