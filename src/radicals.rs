//! Radical and lesson catalog / 부수·단원 목록
//!
//! Plain lookups joined in memory: radical rows are paired with their character row and
//! lesson. A radical whose character row is missing is left out of listings.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Character, Lesson, RadicalDetail, RadicalWithCharacter, RelatedCharacter};
use crate::store::{primary_reading_map, HanjaStore, RadicalScope};

/// All lessons ordered by number / 단원 목록
pub async fn get_lessons(store: &dyn HanjaStore) -> Result<Vec<Lesson>> {
    store.lessons().await
}

async fn attach(
    store: &dyn HanjaStore,
    details: Vec<RadicalDetail>,
) -> Result<Vec<RadicalWithCharacter>> {
    if details.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = details.iter().map(|d| d.character_id.clone()).collect();
    let (characters, lessons) = tokio::try_join!(store.characters_by_ids(&ids), store.lessons())?;

    let characters: HashMap<String, Character> =
        characters.into_iter().map(|c| (c.id.clone(), c)).collect();
    let lessons: HashMap<i64, Lesson> = lessons.into_iter().map(|l| (l.id, l)).collect();

    let mut out = Vec::with_capacity(details.len());
    for detail in details {
        let Some(character) = characters.get(&detail.character_id).cloned() else {
            tracing::warn!(
                "Radical {} has no character row ({}), skipped",
                detail.radical_number,
                detail.character_id
            );
            continue;
        };
        let lesson = detail.lesson_id.and_then(|id| lessons.get(&id).cloned());
        out.push(RadicalWithCharacter {
            detail,
            character,
            lesson,
        });
    }
    Ok(out)
}

/// All radicals ordered by radical number / 전체 부수
pub async fn get_all_radicals(store: &dyn HanjaStore) -> Result<Vec<RadicalWithCharacter>> {
    let details = store.radical_details(RadicalScope::All).await?;
    attach(store, details).await
}

/// Radicals taught in one lesson; an unknown lesson gives an empty list / 단원별 부수
pub async fn get_radicals_by_lesson(
    store: &dyn HanjaStore,
    lesson_number: i64,
) -> Result<Vec<RadicalWithCharacter>> {
    let Some(lesson) = store.lesson_by_number(lesson_number).await? else {
        return Ok(Vec::new());
    };
    let details = store.radical_details(RadicalScope::Lesson(lesson.id)).await?;
    attach(store, details).await
}

pub async fn get_radical_by_number(
    store: &dyn HanjaStore,
    radical_number: i64,
) -> Result<Option<RadicalWithCharacter>> {
    let details = store.radical_details(RadicalScope::Number(radical_number)).await?;
    Ok(attach(store, details).await?.into_iter().next())
}

/// Characters built on a radical, in curated order / 부수 관련 한자
///
/// Children with no character row are skipped; each entry carries its primary reading.
pub async fn get_related_characters(
    store: &dyn HanjaStore,
    radical_char: &str,
) -> Result<Vec<RelatedCharacter>> {
    let links = store.radical_children(radical_char).await?;
    if links.is_empty() {
        return Ok(Vec::new());
    }

    let glyphs: Vec<String> = links.iter().map(|l| l.child_char.clone()).collect();
    let characters = store.characters_by_glyphs(&glyphs).await?;
    if characters.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = characters.iter().map(|c| c.id.clone()).collect();
    let mut readings = primary_reading_map(store.primary_readings(&ids).await?);
    let mut by_glyph: HashMap<String, Character> =
        characters.into_iter().map(|c| (c.char.clone(), c)).collect();

    Ok(links
        .iter()
        .filter_map(|link| by_glyph.remove(&link.child_char))
        .map(|c| RelatedCharacter {
            reading: readings.remove(&c.id).unwrap_or_default(),
            id: c.id,
            char: c.char,
            strokes: c.strokes,
            unihan_def: c.unihan_def,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RadicalChild;
    use crate::store::memory::fixtures::*;
    use crate::store::{Dataset, MemoryStore};

    fn radical(character_id: &str, number: i64, lesson_id: Option<i64>) -> RadicalDetail {
        RadicalDetail {
            character_id: character_id.to_string(),
            radical_number: number,
            lesson_id,
            explanation: None,
            shuowen_chinese: None,
            shuowen_korean: None,
            variants: vec![],
            reading_hun: None,
            reading_eum: None,
        }
    }

    fn child(radical_char: &str, child_char: &str, sort_order: i64) -> RadicalChild {
        RadicalChild {
            radical_char: radical_char.to_string(),
            child_char: child_char.to_string(),
            sort_order,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            characters: vec![
                character("r75", "木", "tree"),
                character("r85", "水", "water"),
                character("c1", "林", "forest"),
                character("c2", "森", "dense forest"),
                character("c3", "本", "root"),
            ],
            readings: vec![reading("x1", "c1", "림", true), reading("x2", "c3", "본", true)],
            lessons: vec![
                Lesson { id: 20, number: 2, title: "물".to_string(), theme: None },
                Lesson { id: 10, number: 1, title: "나무".to_string(), theme: Some("자연".to_string()) },
            ],
            radical_details: vec![
                radical("r85", 85, Some(20)),
                radical("r75", 75, Some(10)),
                radical("missing", 1, None),
            ],
            radical_children: vec![
                child("木", "森", 2),
                child("木", "本", 3),
                child("木", "林", 1),
                child("木", "杰", 4),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_lessons_ordered_by_number() {
        let store = MemoryStore::new(dataset());
        let lessons = get_lessons(&store).await.unwrap();
        assert_eq!(lessons[0].number, 1);
        assert_eq!(lessons[1].number, 2);
    }

    #[tokio::test]
    async fn test_all_radicals_joined_and_ordered() {
        let store = MemoryStore::new(dataset());
        let radicals = get_all_radicals(&store).await.unwrap();
        let numbers: Vec<i64> = radicals.iter().map(|r| r.detail.radical_number).collect();
        // radical 1 has no character row
        assert_eq!(numbers, vec![75, 85]);
        assert_eq!(radicals[0].character.char, "木");
        assert_eq!(radicals[0].lesson.as_ref().unwrap().title, "나무");
    }

    #[tokio::test]
    async fn test_radicals_by_lesson() {
        let store = MemoryStore::new(dataset());
        let radicals = get_radicals_by_lesson(&store, 2).await.unwrap();
        assert_eq!(radicals.len(), 1);
        assert_eq!(radicals[0].character.char, "水");
        assert!(get_radicals_by_lesson(&store, 9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_radical_by_number() {
        let store = MemoryStore::new(dataset());
        assert_eq!(get_radical_by_number(&store, 85).await.unwrap().unwrap().character.char, "水");
        assert!(get_radical_by_number(&store, 200).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_related_characters_keep_curated_order() {
        let store = MemoryStore::new(dataset());
        let related = get_related_characters(&store, "木").await.unwrap();
        let glyphs: Vec<&str> = related.iter().map(|r| r.char.as_str()).collect();
        // 杰 has no character row
        assert_eq!(glyphs, vec!["林", "森", "本"]);
        assert_eq!(related[0].reading, "림");
        assert_eq!(related[1].reading, "");
        assert!(get_related_characters(&store, "水").await.unwrap().is_empty());
    }
}
