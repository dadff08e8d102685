use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::models::Intent;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ParseRequest {
    pub query: String,
}

// POST /api/parse
pub async fn parse_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseRequest>,
) -> Json<Intent> {
    Json(state.parser.parse(&req.query))
}
