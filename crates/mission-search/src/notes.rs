use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::engine::RecordSource;
use crate::error::Result;
use crate::query::Query;
use crate::scoring::{relevance, snippet};
use crate::types::{RecordKind, SearchRecord};

/// Read-only set of markdown notes: a directory of `*.md` files plus one
/// top-level document that always ranks last among ties.
#[derive(Debug, Clone)]
pub struct NoteCorpus {
    pub dir: PathBuf,
    pub top_level: PathBuf,
    /// Prefix for the `path` of documents found in `dir`.
    pub path_prefix: String,
}

impl NoteCorpus {
    pub fn new(dir: impl Into<PathBuf>, top_level: impl Into<PathBuf>, path_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            top_level: top_level.into(),
            path_prefix: path_prefix.into(),
        }
    }

    /// Directory documents in file-name order, then the top-level document.
    pub async fn scan(&self, query: &Query) -> Vec<SearchRecord> {
        let mut records = Vec::new();

        for file_name in self.note_files().await {
            let path = self.dir.join(&file_name);
            let Some(content) = read_note(&path).await else {
                continue;
            };
            if !query.found_in(&content) {
                continue;
            }
            let title = file_name.strip_suffix(".md").unwrap_or(&file_name).to_string();
            records.push(note_record(
                query,
                title,
                format!("{}/{}", self.path_prefix, file_name),
                &content,
            ));
        }

        if let Some(content) = read_note(&self.top_level).await {
            if query.found_in(&content) {
                let name = self
                    .top_level
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                records.push(note_record(query, name.clone(), name, &content));
            }
        }

        records
    }

    /// Sorted `*.md` file names in the corpus directory; empty when unreadable.
    async fn note_files(&self) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "note directory unavailable");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
                    if is_file && name.ends_with(".md") {
                        names.push(name);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %self.dir.display(), error = %e, "note directory listing stopped early");
                    break;
                }
            }
        }
        names.sort();
        names
    }
}

#[async_trait]
impl RecordSource for NoteCorpus {
    fn name(&self) -> &str {
        "notes"
    }

    async fn collect(&self, query: &Query) -> Result<Vec<SearchRecord>> {
        Ok(self.scan(query).await)
    }
}

async fn read_note(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "note unreadable");
            None
        }
    }
}

fn note_record(query: &Query, title: String, path: String, content: &str) -> SearchRecord {
    SearchRecord {
        kind: RecordKind::Memory,
        title,
        content: snippet(&query.normalized, content),
        source_path: Some(path),
        timestamp: None,
        score: relevance(&query.normalized, content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Query {
        Query::parse(s).unwrap()
    }

    #[tokio::test]
    async fn scans_markdown_in_name_order_then_top_level() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("memory");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("b-notes.md"), "groceries\nbuy rust book").unwrap();
        std::fs::write(dir.join("a-notes.md"), "Rust meetup on friday").unwrap();
        std::fs::write(dir.join("c-notes.md"), "nothing relevant").unwrap();
        std::fs::write(dir.join("d.txt"), "rust but not markdown").unwrap();
        std::fs::create_dir(dir.join("sub.md")).unwrap();
        let top = tmp.path().join("MEMORY.md");
        std::fs::write(&top, "# Memory\nlearning rust").unwrap();

        let corpus = NoteCorpus::new(&dir, &top, "memory");
        let records = corpus.scan(&q("rust")).await;

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a-notes", "b-notes", "MEMORY.md"]);
        assert_eq!(records[0].source_path.as_deref(), Some("memory/a-notes.md"));
        assert_eq!(records[1].content, "buy rust book");
        assert_eq!(records[2].source_path.as_deref(), Some("MEMORY.md"));
        assert!(records.iter().all(|r| r.kind == RecordKind::Memory && r.timestamp.is_none()));
    }

    #[tokio::test]
    async fn missing_locations_contribute_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let corpus = NoteCorpus::new(tmp.path().join("absent"), tmp.path().join("MEMORY.md"), "memory");
        assert!(corpus.scan(&q("anything")).await.is_empty());
    }

    #[tokio::test]
    async fn top_level_still_searched_without_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let top = tmp.path().join("MEMORY.md");
        std::fs::write(&top, "Project Falcon kickoff").unwrap();
        let corpus = NoteCorpus::new(tmp.path().join("absent"), &top, "memory");
        let records = corpus.scan(&q("falcon")).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Project Falcon kickoff");
        assert!(records[0].score > 10.0);
    }
}
