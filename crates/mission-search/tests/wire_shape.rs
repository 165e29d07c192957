//! JSON shape of search responses as consumed by the dashboard.

use mission_search::{NoteCorpus, RecordKind, SearchEngine, SearchRecord, SearchResponse};

fn record(kind: RecordKind, path: Option<&str>, date: Option<&str>) -> SearchRecord {
    SearchRecord {
        kind,
        title: "Title".into(),
        content: "line".into(),
        source_path: path.map(String::from),
        timestamp: date.map(String::from),
        score: 6.6,
    }
}

#[test]
fn activity_record_has_date_and_no_path() {
    let json = serde_json::to_value(record(RecordKind::Activity, None, Some("2026-10-17T08:00:00Z"))).unwrap();
    assert_eq!(json["type"], "activity");
    assert_eq!(json["date"], "2026-10-17T08:00:00Z");
    assert_eq!(json["relevance"], 6.6);
    assert!(json.get("path").is_none());
    assert!(json.get("score").is_none());
}

#[test]
fn memory_record_has_path_and_no_date() {
    let json = serde_json::to_value(record(RecordKind::Memory, Some("memory/a.md"), None)).unwrap();
    assert_eq!(json["type"], "memory");
    assert_eq!(json["path"], "memory/a.md");
    assert!(json.get("date").is_none());
}

#[test]
fn empty_response_is_results_array() {
    let json = serde_json::to_string(&SearchResponse::default()).unwrap();
    assert_eq!(json, r#"{"results":[]}"#);
}

#[tokio::test]
async fn end_to_end_from_notes() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("memory");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("travel.md"), "Trip to Lisbon\nflights booked for lisbon").unwrap();
    std::fs::write(dir.join("misc.md"), "misc\nremember lisbon").unwrap();

    let corpus = NoteCorpus::new(&dir, tmp.path().join("MEMORY.md"), "memory");
    let results = SearchEngine::default().search("Lisbon", &[&corpus]).await;
    let body = serde_json::to_value(SearchResponse { results }).unwrap();

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "travel");
    assert_eq!(results[0]["path"], "memory/travel.md");
    assert_eq!(results[0]["content"], "Trip to Lisbon\nflights booked for lisbon");
    assert_eq!(results[1]["title"], "misc");
}
