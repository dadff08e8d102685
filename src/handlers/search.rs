use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{SearchResult, StoredSearch};
use crate::services::planner::{self, Plan};
use crate::state::AppState;

const MAX_RESULTS: usize = 100;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub num_results: Option<usize>,
}

impl SearchRequest {
    fn count(&self, default: usize) -> usize {
        self.num_results.unwrap_or(default).clamp(1, MAX_RESULTS)
    }
}

// POST /api/web_search
pub async fn web_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("query must not be empty".to_string()));
    }

    let results = state
        .search
        .search(query, req.count(state.config.search_results))
        .await
        .map_err(AppError::upstream)?;

    Ok(Json(results))
}

// POST /api/search
pub async fn natural_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Plan>, AppError> {
    let count = req.count(state.config.search_results);
    let plan = planner::search_natural_language(&state, &req.query, count).await?;
    Ok(Json(plan))
}

// GET /api/searches/:id
pub async fn get_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoredSearch>, AppError> {
    let db = state.db.lock().unwrap();
    queries::get_search(&db, &id)
        .map_err(AppError::database)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("search {id}")))
}
