use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A row of the activity log.
    Activity,
    /// A note document on disk.
    Memory,
}

/// One ranked search hit. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    pub content: String,
    #[serde(rename = "path", skip_serializing_if = "Option::is_none", default)]
    pub source_path: Option<String>,
    #[serde(rename = "date", skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "relevance")]
    pub score: f64,
}

/// Body of the search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchRecord>,
}
