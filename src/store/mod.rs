//! Row fetcher - read-only access to the reference store / 참조 저장소 조회
//!
//! Architecture principles / 구조 원칙:
//! - The store only answers keyed, foreign-key and text-match lookups
//! - Absence is `Ok(None)` / `Ok(vec![])`, never an error
//! - Derivation (sibling inference, tree assembly, search union) lives above this layer
//! - Call direction: resolvers → store (unidirectional) / 호출 방향
//!
//! Backends / 백엔드:
//! - `SqliteStore`: sqlx over SQLite (the shipped dataset)
//! - `MemoryStore`: in-memory dataset loaded from a JSON snapshot

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Character, CharacterDetailRow, Decomposition, Lesson, MeaningEdge, MeaningSense,
    RadicalChild, RadicalDetail, Reading,
};

pub use memory::{Dataset, MemoryStore};
pub use sqlite::SqliteStore;

/// Character listing filter / 목록 필터
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterFilter {
    pub strokes: Option<i64>,
    pub radical: Option<String>,
}

/// Which radical rows to fetch / 부수 조회 범위
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadicalScope {
    All,
    Lesson(i64),
    Number(i64),
}

impl RadicalScope {
    pub fn matches(&self, detail: &RadicalDetail) -> bool {
        match *self {
            RadicalScope::All => true,
            RadicalScope::Lesson(id) => detail.lesson_id == Some(id),
            RadicalScope::Number(n) => detail.radical_number == n,
        }
    }
}

/// Read-only query surface of the reference store / 참조 저장소 조회 인터페이스
///
/// Ordering contract: list results come back in a stable order documented per method,
/// so everything derived from them is deterministic.
#[async_trait]
pub trait HanjaStore: Send + Sync {
    /// Backend name for logs / 백엔드 이름
    fn name(&self) -> &'static str;

    /// Unique alternate key lookup (glyph or synthetic image key)
    async fn character_by_glyph(&self, glyph: &str) -> Result<Option<Character>>;

    /// Ordered by id
    async fn characters_by_ids(&self, ids: &[String]) -> Result<Vec<Character>>;

    /// Ordered by id; glyphs with no row are absent from the result
    async fn characters_by_glyphs(&self, glyphs: &[String]) -> Result<Vec<Character>>;

    /// One page ordered by strokes then id, plus the total matching count
    async fn character_page(
        &self,
        filter: &CharacterFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Character>, u64)>;

    async fn character_count(&self) -> Result<u64>;

    /// Consecutive characters in id order starting at `offset`
    async fn characters_window(&self, offset: u64, limit: u64) -> Result<Vec<Character>>;

    /// All readings of one character, primary first then by id
    async fn readings_for(&self, character_id: &str) -> Result<Vec<Reading>>;

    /// Primary readings of many characters, ordered by (character_id, id)
    async fn primary_readings(&self, character_ids: &[String]) -> Result<Vec<Reading>>;

    /// Case-insensitive substring match on reading values, in id order, capped at `limit`
    async fn search_readings(&self, needle: &str, limit: usize) -> Result<Vec<Reading>>;

    async fn decomposition_for(&self, character_id: &str) -> Result<Option<Decomposition>>;

    /// Ordered by character id
    async fn decompositions_for(&self, character_ids: &[String]) -> Result<Vec<Decomposition>>;

    /// Phonetic classes of one character, ordered by class id
    async fn phonetic_class_ids(&self, character_id: &str) -> Result<Vec<String>>;

    /// Member character ids of one class, ordered by character id
    async fn phonetic_class_members(&self, class_id: &str) -> Result<Vec<String>>;

    /// Ordered by sort_order then id
    async fn meaning_senses(&self, character_id: &str) -> Result<Vec<MeaningSense>>;

    /// Ordered by edge id
    async fn meaning_edges(&self, character_id: &str) -> Result<Vec<MeaningEdge>>;

    async fn character_detail_row(&self, character_id: &str) -> Result<Option<CharacterDetailRow>>;

    /// Ordered by lesson number
    async fn lessons(&self) -> Result<Vec<Lesson>>;

    async fn lesson_by_number(&self, number: i64) -> Result<Option<Lesson>>;

    /// Ordered by radical number
    async fn radical_details(&self, scope: RadicalScope) -> Result<Vec<RadicalDetail>>;

    /// Curated children of a radical glyph, ordered by sort_order
    async fn radical_children(&self, radical_char: &str) -> Result<Vec<RadicalChild>>;
}

/// First primary reading per character id / 글자별 첫 대표음
///
/// Rows must be ordered by (character_id, id); later primaries for the same character
/// are ignored.
pub(crate) fn primary_reading_map(
    readings: Vec<Reading>,
) -> std::collections::HashMap<String, String> {
    let mut map = std::collections::HashMap::new();
    for r in readings.into_iter().filter(|r| r.is_primary) {
        map.entry(r.character_id).or_insert(r.value);
    }
    map
}

/// Primary reading of one character, empty when there is none / 대표음 조회
pub async fn primary_reading_of(store: &dyn HanjaStore, character_id: &str) -> Result<String> {
    let readings = store.primary_readings(&[character_id.to_string()]).await?;
    Ok(primary_reading_map(readings)
        .remove(character_id)
        .unwrap_or_default())
}
