/// Queries shorter than this many characters return no results.
pub const MIN_QUERY_CHARS: usize = 2;

/// A search query as typed and in the lowercased form used for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
}

impl Query {
    /// `None` when the query is too short to run.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.chars().count() < MIN_QUERY_CHARS {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            normalized: raw.to_lowercase(),
        })
    }

    /// Case-insensitive containment.
    pub fn found_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.normalized)
    }
}
