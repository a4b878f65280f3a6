//! Character queries and the character page loader / 한자 조회 및 상세 로더
//!
//! Architecture principles / 구조 원칙:
//! - Lookups return `Ok(None)` for an unknown glyph; only the page loader turns that into
//!   `HanjaError::NotFound`
//! - The page loader resolves identity once, then fans out to siblings, meaning tree and
//!   detail row concurrently and combines them after all settle

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{HanjaError, Result};
use crate::meaning::get_meaning_tree;
use crate::models::{
    Character, CharacterDetail, CharacterDetailInfo, CharacterWithReading, MeaningTreeNode,
    PhoneticSiblingSet,
};
use crate::phonetic::get_phonetic_siblings;
use crate::store::{primary_reading_map, primary_reading_of, CharacterFilter, HanjaStore};

/// Default listing page size / 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: u64 = 30;

/// Character with readings and decomposition, or `None` for an unknown glyph / 한자 조회
pub async fn get_character_by_char(
    store: &dyn HanjaStore,
    glyph: &str,
) -> Result<Option<CharacterDetail>> {
    let Some(character) = store.character_by_glyph(glyph).await? else {
        return Ok(None);
    };
    let (readings, decomposition) = tokio::try_join!(
        store.readings_for(&character.id),
        store.decomposition_for(&character.id),
    )?;
    Ok(Some(CharacterDetail {
        character,
        readings,
        decomposition,
    }))
}

/// Prose detail of a known character, `None` when it has no detail row
async fn details_for(
    store: &dyn HanjaStore,
    character: &Character,
) -> Result<Option<CharacterDetailInfo>> {
    let (row, reading) = tokio::try_join!(
        store.character_detail_row(&character.id),
        primary_reading_of(store, &character.id),
    )?;
    Ok(row.map(|row| CharacterDetailInfo {
        character_id: row.character_id,
        explanation: row.explanation,
        shuowen_chinese: row.shuowen_chinese,
        shuowen_korean: row.shuowen_korean,
        character: character.clone(),
        reading,
    }))
}

/// Explanation and citations of a character / 한자 해설 조회
///
/// `None` when either the character or its detail row is missing.
pub async fn get_character_details(
    store: &dyn HanjaStore,
    glyph: &str,
) -> Result<Option<CharacterDetailInfo>> {
    match store.character_by_glyph(glyph).await? {
        Some(character) => details_for(store, &character).await,
        None => Ok(None),
    }
}

/// Listing request / 목록 요청
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub strokes: Option<i64>,
    pub radical: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterListPage {
    pub characters: Vec<CharacterWithReading>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// One page of characters ordered by strokes / 한자 목록 조회
///
/// Pages start at 1; page 0 and a zero page size fall back to the defaults.
pub async fn get_character_list(
    store: &dyn HanjaStore,
    query: &CharacterListQuery,
) -> Result<CharacterListPage> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = match query.page_size {
        Some(size) if size > 0 => size,
        _ => DEFAULT_PAGE_SIZE,
    };
    let filter = CharacterFilter {
        strokes: query.strokes,
        radical: query.radical.clone().filter(|r| !r.is_empty()),
    };

    let (characters, total) = store
        .character_page(&filter, (page - 1) * page_size, page_size)
        .await?;

    let ids: Vec<String> = characters.iter().map(|c| c.id.clone()).collect();
    let mut readings = if ids.is_empty() {
        Default::default()
    } else {
        primary_reading_map(store.primary_readings(&ids).await?)
    };

    let characters = characters
        .into_iter()
        .map(|character| CharacterWithReading {
            reading: readings.remove(&character.id).unwrap_or_default(),
            character,
        })
        .collect();

    Ok(CharacterListPage {
        characters,
        total,
        page,
        page_size,
    })
}

/// Uniformly random character, `None` on an empty store / 무작위 한자
pub async fn get_random_character<R: Rng + Send>(
    store: &dyn HanjaStore,
    rng: &mut R,
) -> Result<Option<CharacterWithReading>> {
    let count = store.character_count().await?;
    if count == 0 {
        return Ok(None);
    }
    let offset = rng.gen_range(0..count);
    let Some(character) = store.characters_window(offset, 1).await?.into_iter().next() else {
        return Ok(None);
    };
    let reading = primary_reading_of(store, &character.id).await?;
    Ok(Some(CharacterWithReading { character, reading }))
}

/// Everything the character page shows / 한자 상세 화면 데이터
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    pub character: CharacterDetail,
    pub siblings: PhoneticSiblingSet,
    pub meaning_tree: Vec<MeaningTreeNode>,
    pub details: Option<CharacterDetailInfo>,
}

/// Resolve a glyph and load its page / 한자 상세 로드
///
/// An unknown glyph is `HanjaError::NotFound`. The three dependent lookups run
/// concurrently; the first failure among them fails the whole load.
pub async fn load_character_view(store: &dyn HanjaStore, glyph: &str) -> Result<CharacterView> {
    let character = get_character_by_char(store, glyph)
        .await?
        .ok_or_else(|| HanjaError::not_found("character", glyph))?;

    let id = character.character.id.as_str();
    let (siblings, meaning_tree, details) = tokio::join!(
        get_phonetic_siblings(store, id),
        get_meaning_tree(store, id),
        details_for(store, &character.character),
    );

    Ok(CharacterView {
        siblings: siblings?,
        meaning_tree: meaning_tree?,
        details: details?,
        character,
    })
}

/// Phonetic series page of a glyph / 음계열 화면 로드
pub async fn load_series(store: &dyn HanjaStore, glyph: &str) -> Result<PhoneticSiblingSet> {
    let character = store
        .character_by_glyph(glyph)
        .await?
        .ok_or_else(|| HanjaError::not_found("character", glyph))?;
    get_phonetic_siblings(store, &character.id).await
}
