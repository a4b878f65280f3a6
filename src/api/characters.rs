use axum::extract::{Path, Query, State};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;

use crate::api::{load_view, respond, ApiResult};
use crate::character::{self, CharacterListPage, CharacterListQuery, CharacterView};
use crate::device::RecentChars;
use crate::error::HanjaError;
use crate::glyph::char_glyph_src;
use crate::models::{
    CharacterDetail, CharacterDetailInfo, CharacterWithReading, MeaningTreeNode,
    PhoneticSiblingSet,
};
use crate::state::AppState;

/// GET /api/characters - 한자 목록
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CharacterListQuery>,
) -> ApiResult<CharacterListPage> {
    respond(character::get_character_list(state.store.as_ref(), &query).await)
}

/// GET /api/characters/random - 무작위 한자
pub async fn random_character(
    State(state): State<Arc<AppState>>,
) -> ApiResult<CharacterWithReading> {
    let mut rng = StdRng::from_entropy();
    let result = character::get_random_character(state.store.as_ref(), &mut rng)
        .await
        .and_then(|c| c.ok_or_else(|| HanjaError::not_found("character", "random")));
    respond(result)
}

/// GET /api/characters/:char - 한자 조회
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(glyph): Path<String>,
) -> ApiResult<CharacterDetail> {
    let result = character::get_character_by_char(state.store.as_ref(), &glyph)
        .await
        .and_then(|c| c.ok_or_else(|| HanjaError::not_found("character", glyph.as_str())));
    respond(result)
}

async fn resolve_id(state: &AppState, glyph: &str) -> crate::error::Result<String> {
    state
        .store
        .character_by_glyph(glyph)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| HanjaError::not_found("character", glyph))
}

/// GET /api/characters/:char/siblings - 음계열
pub async fn get_siblings(
    State(state): State<Arc<AppState>>,
    Path(glyph): Path<String>,
) -> ApiResult<PhoneticSiblingSet> {
    let result = match resolve_id(&state, &glyph).await {
        Ok(id) => crate::phonetic::get_phonetic_siblings(state.store.as_ref(), &id).await,
        Err(e) => Err(e),
    };
    respond(result)
}

/// GET /api/characters/:char/meaning-tree - 의미 트리
pub async fn get_meaning_tree(
    State(state): State<Arc<AppState>>,
    Path(glyph): Path<String>,
) -> ApiResult<Vec<MeaningTreeNode>> {
    let result = match resolve_id(&state, &glyph).await {
        Ok(id) => crate::meaning::get_meaning_tree(state.store.as_ref(), &id).await,
        Err(e) => Err(e),
    };
    respond(result)
}

/// GET /api/characters/:char/details - 해설
pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Path(glyph): Path<String>,
) -> ApiResult<CharacterDetailInfo> {
    let result = character::get_character_details(state.store.as_ref(), &glyph)
        .await
        .and_then(|d| d.ok_or_else(|| HanjaError::not_found("character detail", glyph.as_str())));
    respond(result)
}

#[derive(Debug, Clone, Serialize)]
pub struct CharacterPage {
    #[serde(flatten)]
    pub view: CharacterView,
    pub glyph_src: Option<String>,
}

/// GET /api/characters/:char/view - 상세 화면 (최근 본 한자에 기록)
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(glyph): Path<String>,
) -> ApiResult<CharacterPage> {
    load_view(async {
        let view = character::load_character_view(state.store.as_ref(), &glyph).await?;
        if let Err(e) = RecentChars::new(state.local.clone()).visit(&glyph) {
            tracing::warn!("Failed to record recent '{}': {}", glyph, e);
        }
        Ok(CharacterPage {
            glyph_src: char_glyph_src(&view.character.character.char),
            view,
        })
    })
    .await
}

/// GET /api/series/:char - 음계열 화면
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(glyph): Path<String>,
) -> ApiResult<PhoneticSiblingSet> {
    load_view(character::load_series(state.store.as_ref(), &glyph)).await
}
