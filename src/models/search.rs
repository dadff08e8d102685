use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub preview_text: String,
    pub source: String,
}

/// Search result with its 1-based position in a stored search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumberedResult {
    pub number: usize,
    #[serde(flatten)]
    pub result: SearchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSearch {
    pub id: String,
    pub query: String,
    pub intent: serde_json::Value,
    pub created_at: String,
    pub results: Vec<NumberedResult>,
}
