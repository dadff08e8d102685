use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::SearchProvider;
use crate::models::SearchResult;

const PREVIEW_CHARS: usize = 1000;

pub struct ExaSearchProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ExaSearchProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    text: Option<String>,
}

impl From<ExaResult> for SearchResult {
    fn from(r: ExaResult) -> Self {
        let source = reqwest::Url::parse(&r.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_default();

        SearchResult {
            title: r.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| r.url.clone()),
            preview_text: r.text.unwrap_or_default().chars().take(PREVIEW_CHARS).collect(),
            url: r.url,
            source,
        }
    }
}

#[async_trait]
impl SearchProvider for ExaSearchProvider {
    async fn search(&self, terms: &str, count: usize) -> anyhow::Result<Vec<SearchResult>> {
        anyhow::ensure!(!self.api_key.is_empty(), "EXA_API_KEY is not configured");

        let body = json!({
            "query": terms,
            "numResults": count,
            "contents": { "text": { "maxCharacters": PREVIEW_CHARS } },
        });

        let resp = self
            .client
            .post(format!("{}/search", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call Exa search API")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("Exa API error ({status}): {detail}");
        }

        let data: ExaResponse = resp.json().await.context("failed to parse Exa response")?;

        tracing::info!(terms, results = data.results.len(), "search completed");
        Ok(data.results.into_iter().map(SearchResult::from).collect())
    }
}
