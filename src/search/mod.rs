//! Search resolver - exact glyph match unioned with reading match / 한자 검색
//!
//! Architecture principles / 구조 원칙:
//! - The resolver is a single pass: glyph lookup, reading lookup, union, annotate
//! - Debounce and stale-response suppression live in [`SearchSession`]
//! - Callers trim the query; an empty query never reaches the store

pub mod session;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Character, CharacterWithReading};
use crate::store::{primary_reading_map, HanjaStore};

pub use session::{SearchSession, SearchState};

/// Default cap on reading matches / 음 검색 최대 결과 수
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Search characters by glyph or reading / 한자·음 검색
///
/// The exact glyph match, if any, comes first. Reading matches follow in store order,
/// skipping characters already listed. Every result carries its primary reading, or an
/// empty string when it has none.
pub async fn search_characters(
    store: &dyn HanjaStore,
    query: &str,
    limit: usize,
) -> Result<Vec<CharacterWithReading>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let (by_glyph, by_reading) = tokio::try_join!(
        store.character_by_glyph(query),
        store.search_readings(query, limit),
    )?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut ordered_ids: Vec<String> = Vec::new();

    if let Some(c) = &by_glyph {
        seen.insert(c.id.clone());
        ordered_ids.push(c.id.clone());
    }
    for r in &by_reading {
        if seen.insert(r.character_id.clone()) {
            ordered_ids.push(r.character_id.clone());
        }
    }

    if ordered_ids.is_empty() {
        tracing::debug!("Search '{}': no results", query);
        return Ok(Vec::new());
    }

    let reading_ids: Vec<String> = ordered_ids
        .iter()
        .filter(|id| by_glyph.as_ref().map_or(true, |c| &c.id != *id))
        .cloned()
        .collect();

    let (characters, primaries) = tokio::try_join!(
        store.characters_by_ids(&reading_ids),
        store.primary_readings(&ordered_ids),
    )?;
    let mut readings = primary_reading_map(primaries);

    let mut by_id: std::collections::HashMap<String, Character> =
        characters.into_iter().map(|c| (c.id.clone(), c)).collect();
    if let Some(c) = by_glyph {
        by_id.insert(c.id.clone(), c);
    }

    // Reading rows whose character row is missing are dropped
    let results: Vec<CharacterWithReading> = ordered_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|character| CharacterWithReading {
            reading: readings.remove(&character.id).unwrap_or_default(),
            character,
        })
        .collect();

    tracing::debug!("Search '{}': {} results", query, results.len());
    Ok(results)
}

/// Something a search session can query / 검색 소스
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CharacterWithReading>>;
}

/// Search source backed by the reference store
pub struct StoreSearch {
    store: Arc<dyn HanjaStore>,
    limit: usize,
}

impl StoreSearch {
    pub fn new(store: Arc<dyn HanjaStore>, limit: usize) -> Self {
        Self { store, limit }
    }
}

#[async_trait]
impl SearchSource for StoreSearch {
    async fn search(&self, query: &str) -> Result<Vec<CharacterWithReading>> {
        search_characters(self.store.as_ref(), query, self.limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;
    use crate::store::{Dataset, MemoryStore};

    fn store() -> MemoryStore {
        MemoryStore::new(Dataset {
            characters: vec![
                character("c1", "江", "river"),
                character("c2", "強", "strong"),
                character("c3", "康", "healthy"),
            ],
            readings: vec![
                reading("r1", "c1", "강", true),
                reading("r2", "c2", "강", true),
                reading("r3", "c3", "강", true),
                reading("r4", "c3", "강녕", false),
            ],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_empty_query_skips_store() {
        let store = store();
        assert!(search_characters(&store, "", 20).await.unwrap().is_empty());
        assert!(search_characters(&store, "   ", 20).await.unwrap().is_empty());
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_glyph_match_first() {
        let store = store();
        let results = search_characters(&store, "康", 20).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].character.char, "康");
        assert_eq!(results[0].reading, "강");
    }

    #[tokio::test]
    async fn test_reading_matches_deduplicated_in_store_order() {
        let store = store();
        let results = search_characters(&store, "강", 20).await.unwrap();
        let glyphs: Vec<&str> = results.iter().map(|r| r.character.char.as_str()).collect();
        assert_eq!(glyphs, vec!["江", "強", "康"]);
        // primary reading, not the matched one
        assert!(results.iter().all(|r| r.reading == "강"));
    }

    #[tokio::test]
    async fn test_glyph_first_even_when_reading_also_matches() {
        let mut data = store().dataset().clone();
        data.characters.push(character("c0", "강", "hangul key"));
        data.readings.push(reading("r0", "c0", "강", true));
        let store = MemoryStore::new(data);
        let results = search_characters(&store, "강", 20).await.unwrap();
        assert_eq!(results[0].character.id, "c0");
        assert_eq!(results.iter().filter(|r| r.character.id == "c0").count(), 1);
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_two_primary_readings_resolve_to_lowest_id() {
        let mut data = store().dataset().clone();
        data.readings.push(reading("r9", "c1", "홍", true));
        let store = MemoryStore::new(data);
        let results = search_characters(&store, "홍", 20).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].character.char, "江");
        assert_eq!(results[0].reading, "강");
    }

    #[tokio::test]
    async fn test_limit_caps_reading_matches() {
        let store = store();
        let results = search_characters(&store, "강", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
