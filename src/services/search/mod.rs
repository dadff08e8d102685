pub mod exa;

use async_trait::async_trait;

use crate::models::SearchResult;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, terms: &str, count: usize) -> anyhow::Result<Vec<SearchResult>>;
}
