//! In-memory reference store / 메모리 참조 저장소
//!
//! Holds a whole dataset snapshot (the JSON export of the ETL pipeline) and answers the
//! same queries as the SQLite store with the same ordering contract. Every query bumps a
//! counter, which lets callers verify that a code path did not touch the store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CharacterFilter, HanjaStore, RadicalScope};
use crate::error::{HanjaError, Result};
use crate::models::{
    Character, CharacterDetailRow, CharacterPhoneticClass, Decomposition, Lesson, MeaningEdge,
    MeaningSense, RadicalChild, RadicalDetail, Reading,
};

/// Dataset snapshot / 데이터셋 스냅샷
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub characters: Vec<Character>,
    pub readings: Vec<Reading>,
    pub decompositions: Vec<Decomposition>,
    pub character_phonetic_class: Vec<CharacterPhoneticClass>,
    pub meaning_senses: Vec<MeaningSense>,
    pub meaning_edges: Vec<MeaningEdge>,
    pub character_details: Vec<CharacterDetailRow>,
    pub lessons: Vec<Lesson>,
    pub radical_details: Vec<RadicalDetail>,
    pub radical_children: Vec<RadicalChild>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HanjaError::Decode(format!("Failed to read dataset {:?}: {}", path, e)))?;
        Self::from_json(&content)
    }
}

pub struct MemoryStore {
    data: Dataset,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of queries answered so far / 처리한 조회 수
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    fn hit(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn sorted_characters<'a>(&'a self, mut rows: Vec<&'a Character>) -> Vec<Character> {
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows.into_iter().cloned().collect()
    }
}

#[async_trait]
impl HanjaStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn character_by_glyph(&self, glyph: &str) -> Result<Option<Character>> {
        self.hit();
        Ok(self.data.characters.iter().find(|c| c.char == glyph).cloned())
    }

    async fn characters_by_ids(&self, ids: &[String]) -> Result<Vec<Character>> {
        self.hit();
        let rows = self.data.characters.iter().filter(|c| ids.contains(&c.id)).collect();
        Ok(self.sorted_characters(rows))
    }

    async fn characters_by_glyphs(&self, glyphs: &[String]) -> Result<Vec<Character>> {
        self.hit();
        let rows = self.data.characters.iter().filter(|c| glyphs.contains(&c.char)).collect();
        Ok(self.sorted_characters(rows))
    }

    async fn character_page(
        &self,
        filter: &CharacterFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Character>, u64)> {
        self.hit();
        let mut rows: Vec<&Character> = self
            .data
            .characters
            .iter()
            .filter(|c| filter.strokes.map_or(true, |s| c.strokes == Some(s)))
            .filter(|c| filter.radical.as_ref().map_or(true, |r| c.radical.as_ref() == Some(r)))
            .collect();
        // NULL strokes sort first, as in SQLite
        rows.sort_by(|a, b| a.strokes.cmp(&b.strokes).then_with(|| a.id.cmp(&b.id)));
        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn character_count(&self) -> Result<u64> {
        self.hit();
        Ok(self.data.characters.len() as u64)
    }

    async fn characters_window(&self, offset: u64, limit: u64) -> Result<Vec<Character>> {
        self.hit();
        let all = self.sorted_characters(self.data.characters.iter().collect());
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn readings_for(&self, character_id: &str) -> Result<Vec<Reading>> {
        self.hit();
        let mut rows: Vec<Reading> = self
            .data
            .readings
            .iter()
            .filter(|r| r.character_id == character_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.is_primary.cmp(&a.is_primary).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn primary_readings(&self, character_ids: &[String]) -> Result<Vec<Reading>> {
        self.hit();
        let mut rows: Vec<Reading> = self
            .data
            .readings
            .iter()
            .filter(|r| r.is_primary && character_ids.contains(&r.character_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.character_id.cmp(&b.character_id).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn search_readings(&self, needle: &str, limit: usize) -> Result<Vec<Reading>> {
        self.hit();
        let needle = needle.to_lowercase();
        let mut rows: Vec<Reading> = self
            .data
            .readings
            .iter()
            .filter(|r| r.value.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn decomposition_for(&self, character_id: &str) -> Result<Option<Decomposition>> {
        self.hit();
        Ok(self
            .data
            .decompositions
            .iter()
            .find(|d| d.character_id == character_id)
            .cloned())
    }

    async fn decompositions_for(&self, character_ids: &[String]) -> Result<Vec<Decomposition>> {
        self.hit();
        let mut rows: Vec<Decomposition> = self
            .data
            .decompositions
            .iter()
            .filter(|d| character_ids.contains(&d.character_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.character_id.cmp(&b.character_id));
        Ok(rows)
    }

    async fn phonetic_class_ids(&self, character_id: &str) -> Result<Vec<String>> {
        self.hit();
        let mut ids: Vec<String> = self
            .data
            .character_phonetic_class
            .iter()
            .filter(|m| m.character_id == character_id)
            .map(|m| m.phonetic_class_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn phonetic_class_members(&self, class_id: &str) -> Result<Vec<String>> {
        self.hit();
        let mut ids: Vec<String> = self
            .data
            .character_phonetic_class
            .iter()
            .filter(|m| m.phonetic_class_id == class_id)
            .map(|m| m.character_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn meaning_senses(&self, character_id: &str) -> Result<Vec<MeaningSense>> {
        self.hit();
        let mut rows: Vec<MeaningSense> = self
            .data
            .meaning_senses
            .iter()
            .filter(|s| s.character_id == character_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn meaning_edges(&self, character_id: &str) -> Result<Vec<MeaningEdge>> {
        self.hit();
        let mut rows: Vec<MeaningEdge> = self
            .data
            .meaning_edges
            .iter()
            .filter(|e| e.character_id == character_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn character_detail_row(&self, character_id: &str) -> Result<Option<CharacterDetailRow>> {
        self.hit();
        Ok(self
            .data
            .character_details
            .iter()
            .find(|d| d.character_id == character_id)
            .cloned())
    }

    async fn lessons(&self) -> Result<Vec<Lesson>> {
        self.hit();
        let mut rows = self.data.lessons.clone();
        rows.sort_by_key(|l| l.number);
        Ok(rows)
    }

    async fn lesson_by_number(&self, number: i64) -> Result<Option<Lesson>> {
        self.hit();
        Ok(self.data.lessons.iter().find(|l| l.number == number).cloned())
    }

    async fn radical_details(&self, scope: RadicalScope) -> Result<Vec<RadicalDetail>> {
        self.hit();
        let mut rows: Vec<RadicalDetail> = self
            .data
            .radical_details
            .iter()
            .filter(|d| scope.matches(d))
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.radical_number);
        Ok(rows)
    }

    async fn radical_children(&self, radical_char: &str) -> Result<Vec<RadicalChild>> {
        self.hit();
        let mut rows: Vec<RadicalChild> = self
            .data
            .radical_children
            .iter()
            .filter(|c| c.radical_char == radical_char)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.sort_order);
        Ok(rows)
    }
}

/// Builders for hand-written datasets / 테스트용 데이터 빌더
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::Relation;

    pub fn character(id: &str, glyph: &str, def: &str) -> Character {
        Character {
            id: id.to_string(),
            char: glyph.to_string(),
            codepoint: glyph.chars().next().map(|c| c as i64).unwrap_or(0),
            strokes: Some(glyph.chars().count() as i64),
            radical: None,
            unihan_def: Some(def.to_string()),
            grade_level: None,
            created_at: String::new(),
        }
    }

    pub fn reading(id: &str, character_id: &str, value: &str, primary: bool) -> Reading {
        Reading {
            id: id.to_string(),
            character_id: character_id.to_string(),
            reading_type: "eum".to_string(),
            value: value.to_string(),
            is_primary: primary,
        }
    }

    pub fn decomposition(character_id: &str, components: &[&str]) -> Decomposition {
        Decomposition {
            character_id: character_id.to_string(),
            ids: None,
            components: components.iter().map(|c| c.to_string()).collect(),
            confidence: 1.0,
        }
    }

    pub fn membership(character_id: &str, class_id: &str) -> CharacterPhoneticClass {
        CharacterPhoneticClass {
            character_id: character_id.to_string(),
            phonetic_class_id: class_id.to_string(),
        }
    }

    pub fn sense(id: &str, character_id: &str, label: &str, sort_order: i64) -> MeaningSense {
        MeaningSense {
            id: id.to_string(),
            character_id: character_id.to_string(),
            label: label.to_string(),
            short_gloss: None,
            example: None,
            sort_order,
        }
    }

    pub fn edge(id: &str, character_id: &str, parent: &str, child: &str, relation: Relation) -> MeaningEdge {
        MeaningEdge {
            id: id.to_string(),
            character_id: character_id.to_string(),
            parent_sense_id: parent.to_string(),
            child_sense_id: child.to_string(),
            relation,
            note: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::store::{primary_reading_map, primary_reading_of};

    #[tokio::test]
    async fn test_query_counter() {
        let store = MemoryStore::new(Dataset {
            characters: vec![character("c1", "木", "tree")],
            ..Default::default()
        });
        assert_eq!(store.query_count(), 0);
        store.character_by_glyph("木").await.unwrap();
        store.character_count().await.unwrap();
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn test_primary_readings_ordered() {
        let store = MemoryStore::new(Dataset {
            readings: vec![
                reading("r3", "c2", "하", true),
                reading("r2", "c1", "목", true),
                reading("r1", "c1", "모", false),
            ],
            ..Default::default()
        });
        let rows = store
            .primary_readings(&["c1".to_string(), "c2".to_string()])
            .await
            .unwrap();
        let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["목", "하"]);
    }

    #[tokio::test]
    async fn test_two_primary_readings_pick_lowest_id() {
        let store = MemoryStore::new(Dataset {
            readings: vec![
                reading("r2", "c1", "항", true),
                reading("r1", "c1", "강", true),
            ],
            ..Default::default()
        });
        let rows = store.primary_readings(&["c1".to_string()]).await.unwrap();
        assert_eq!(primary_reading_map(rows).get("c1").map(String::as_str), Some("강"));
        assert_eq!(primary_reading_of(&store, "c1").await.unwrap(), "강");
        assert_eq!(primary_reading_of(&store, "c9").await.unwrap(), "");
    }

    #[test]
    fn test_dataset_from_json_defaults_missing_tables() {
        let data = Dataset::from_json(r#"{"lessons":[{"id":1,"number":1,"title":"하나","theme":null}]}"#).unwrap();
        assert_eq!(data.lessons.len(), 1);
        assert!(data.characters.is_empty());
    }
}
