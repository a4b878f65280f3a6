use axum::extract::{Query, State};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{respond, ApiResult};
use crate::models::CharacterWithReading;
use crate::search::search_characters;
use crate::state::AppState;

/// Upper bound on a caller-supplied limit / 최대 검색 결과 수
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// GET /api/search?q=&limit= - 한자·음 검색
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<CharacterWithReading>> {
    let limit = params
        .limit
        .unwrap_or(state.config.search.limit)
        .clamp(1, MAX_LIMIT);
    respond(search_characters(state.store.as_ref(), &params.q, limit).await)
}
