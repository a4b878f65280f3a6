use axum::extract::{Path, State};
use serde::Serialize;
use std::sync::Arc;

use crate::api::{load_view, respond, ApiResult};
use crate::error::HanjaError;
use crate::glyph::{segment_explanation, ExplanationSegment};
use crate::models::{Lesson, RadicalWithCharacter, RelatedCharacter};
use crate::radicals;
use crate::state::AppState;

/// GET /api/radicals - 전체 부수
pub async fn list_radicals(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<RadicalWithCharacter>> {
    respond(radicals::get_all_radicals(state.store.as_ref()).await)
}

#[derive(Debug, Clone, Serialize)]
pub struct RadicalPage {
    #[serde(flatten)]
    pub radical: RadicalWithCharacter,
    pub explanation_segments: Vec<ExplanationSegment>,
}

/// GET /api/radicals/:number - 부수 상세
pub async fn get_radical(
    State(state): State<Arc<AppState>>,
    Path(number): Path<i64>,
) -> ApiResult<RadicalPage> {
    load_view(async {
        let radical = radicals::get_radical_by_number(state.store.as_ref(), number)
            .await?
            .ok_or_else(|| HanjaError::not_found("radical", number.to_string()))?;
        Ok(RadicalPage {
            explanation_segments: radical
                .detail
                .explanation
                .as_deref()
                .map(segment_explanation)
                .unwrap_or_default(),
            radical,
        })
    })
    .await
}

/// GET /api/radicals/:number/related - 부수 관련 한자
pub async fn get_related(
    State(state): State<Arc<AppState>>,
    Path(number): Path<i64>,
) -> ApiResult<Vec<RelatedCharacter>> {
    let store = state.store.as_ref();
    let result = match radicals::get_radical_by_number(store, number).await {
        Ok(Some(radical)) => radicals::get_related_characters(store, &radical.character.char).await,
        Ok(None) => Err(HanjaError::not_found("radical", number.to_string())),
        Err(e) => Err(e),
    };
    respond(result)
}

/// GET /api/lessons - 단원 목록
pub async fn list_lessons(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Lesson>> {
    respond(radicals::get_lessons(state.store.as_ref()).await)
}

/// GET /api/lessons/:number/radicals - 단원별 부수
pub async fn get_lesson_radicals(
    State(state): State<Arc<AppState>>,
    Path(number): Path<i64>,
) -> ApiResult<Vec<RadicalWithCharacter>> {
    respond(radicals::get_radicals_by_lesson(state.store.as_ref(), number).await)
}
