//! Phonetic sibling resolver / 음계열 형제 조회
//!
//! Characters that share a phonetic class form a derivation series (江 河 紅 功 ...).
//! The shared sound component, the phonetic root, is not stored; it is inferred by
//! counting components across the siblings' decompositions.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Decomposition, PhoneticSibling, PhoneticSiblingSet};
use crate::store::{primary_reading_map, HanjaStore};

/// Siblings with decomposition data needed before a root is guessed
pub const MIN_DECOMPOSED_SIBLINGS: usize = 2;

/// Pick the most frequent component across component lists / 최빈 부품 추정
///
/// Counts every component of every list. The winner is the component with the strictly
/// highest count; on a tie the component encountered first (list order, then position
/// within the list) wins. Fewer than [`MIN_DECOMPOSED_SIBLINGS`] lists yields `None`.
pub fn infer_phonetic_root<L, S>(component_lists: &[L]) -> Option<String>
where
    L: AsRef<[S]>,
    S: AsRef<str>,
{
    if component_lists.len() < MIN_DECOMPOSED_SIBLINGS {
        return None;
    }

    // (component, count) in first-seen order
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for component in component_lists.iter().flat_map(|list| list.as_ref()) {
        let component = component.as_ref();
        match slot.get(component) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(component, counts.len());
                counts.push((component, 1));
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for &(component, count) in &counts {
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((component, count));
        }
    }
    best.map(|(component, _)| component.to_string())
}

/// Root inference over store rows, independent of row order / 행 순서와 무관한 추정
///
/// Decompositions are sorted by character id before counting, so the tie-break is
/// stable whatever order the store returned them in.
pub fn infer_root_from_decompositions(decompositions: &[Decomposition]) -> Option<String> {
    let mut sorted: Vec<&Decomposition> = decompositions.iter().collect();
    sorted.sort_by(|a, b| a.character_id.cmp(&b.character_id));
    let lists: Vec<&[String]> = sorted.iter().map(|d| d.components.as_slice()).collect();
    infer_phonetic_root(&lists)
}

/// Resolve the phonetic series of one character / 음계열 형제 조회
pub async fn get_phonetic_siblings(
    store: &dyn HanjaStore,
    character_id: &str,
) -> Result<PhoneticSiblingSet> {
    let classes = store.phonetic_class_ids(character_id).await?;
    let Some(class_id) = classes.first() else {
        return Ok(PhoneticSiblingSet::default());
    };
    if classes.len() > 1 {
        tracing::warn!(
            "Character {} belongs to {} phonetic classes, using {}",
            character_id,
            classes.len(),
            class_id
        );
    }

    let sibling_ids = store.phonetic_class_members(class_id).await?;
    if sibling_ids.is_empty() {
        return Ok(PhoneticSiblingSet::default());
    }

    let (characters, readings, decompositions) = tokio::try_join!(
        store.characters_by_ids(&sibling_ids),
        store.primary_readings(&sibling_ids),
        store.decompositions_for(&sibling_ids),
    )?;

    let mut reading_map = primary_reading_map(readings);
    let phonetic_root = infer_root_from_decompositions(&decompositions);

    let siblings = characters
        .into_iter()
        .map(|c| PhoneticSibling {
            reading: reading_map.remove(&c.id).unwrap_or_default(),
            char: c.char,
            meaning: c.unihan_def,
            character_id: c.id,
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Phonetic class {}: {} siblings, root {:?}",
        class_id,
        siblings.len(),
        phonetic_root
    );

    Ok(PhoneticSiblingSet { phonetic_root, siblings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;
    use crate::store::{Dataset, MemoryStore};

    fn family() -> Dataset {
        Dataset {
            characters: vec![
                character("c1", "江", "river"),
                character("c2", "河", "river"),
                character("c3", "杠", "pole"),
                character("c4", "木", "tree"),
            ],
            readings: vec![
                reading("r1", "c1", "강", true),
                reading("r2", "c2", "하", true),
                reading("r4", "c4", "목", true),
            ],
            decompositions: vec![
                decomposition("c1", &["水", "工"]),
                decomposition("c2", &["水", "可"]),
                decomposition("c3", &["木", "工"]),
            ],
            character_phonetic_class: vec![
                membership("c1", "k1"),
                membership("c2", "k1"),
                membership("c3", "k1"),
                membership("c4", "k2"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_tie_break_is_first_encountered() {
        let lists = vec![vec!["水", "工"], vec!["水", "可"], vec!["木", "工"]];
        // 水 and 工 both count 2; 水 is seen first
        assert_eq!(infer_phonetic_root(&lists), Some("水".to_string()));

        let reordered = vec![vec!["木", "工"], vec!["水", "可"], vec!["水", "工"]];
        assert_eq!(infer_phonetic_root(&reordered), Some("工".to_string()));
    }

    #[test]
    fn test_strict_maximum_wins() {
        let lists = vec![vec!["口", "工"], vec!["糸", "工"], vec!["力", "工"]];
        assert_eq!(infer_phonetic_root(&lists), Some("工".to_string()));
    }

    #[test]
    fn test_needs_two_decomposed_siblings() {
        let one: Vec<Vec<&str>> = vec![vec!["水", "工"]];
        assert_eq!(infer_phonetic_root(&one), None);
        let none: Vec<Vec<&str>> = vec![];
        assert_eq!(infer_phonetic_root(&none), None);
    }

    #[test]
    fn test_decomposition_order_does_not_matter() {
        let a = vec![
            decomposition("c3", &["木", "工"]),
            decomposition("c1", &["水", "工"]),
            decomposition("c2", &["水", "可"]),
        ];
        assert_eq!(infer_root_from_decompositions(&a), Some("水".to_string()));
    }

    #[tokio::test]
    async fn test_no_membership_yields_empty_set() {
        let store = MemoryStore::new(family());
        let set = get_phonetic_siblings(&store, "c9").await.unwrap();
        assert_eq!(set, PhoneticSiblingSet::default());
    }

    #[tokio::test]
    async fn test_singleton_class() {
        let store = MemoryStore::new(family());
        let set = get_phonetic_siblings(&store, "c4").await.unwrap();
        assert_eq!(set.phonetic_root, None);
        assert_eq!(set.siblings.len(), 1);
        assert_eq!(set.siblings[0].char, "木");
        assert!(!set.is_series());
    }

    #[tokio::test]
    async fn test_family_root_and_order() {
        let store = MemoryStore::new(family());
        let set = get_phonetic_siblings(&store, "c2").await.unwrap();
        assert_eq!(set.phonetic_root, Some("水".to_string()));
        let glyphs: Vec<&str> = set.siblings.iter().map(|s| s.char.as_str()).collect();
        assert_eq!(glyphs, vec!["江", "河", "杠"]);
        // 杠 has no primary reading
        assert_eq!(set.siblings[2].reading, "");
        assert_eq!(set.siblings[0].reading, "강");
    }

    #[tokio::test]
    async fn test_single_decomposition_gives_no_root() {
        let mut data = family();
        data.decompositions.retain(|d| d.character_id == "c1");
        let store = MemoryStore::new(data);
        let set = get_phonetic_siblings(&store, "c1").await.unwrap();
        assert_eq!(set.siblings.len(), 3);
        assert_eq!(set.phonetic_root, None);
    }

    #[tokio::test]
    async fn test_first_class_used_when_many() {
        let mut data = family();
        data.character_phonetic_class.push(membership("c4", "k0"));
        data.character_phonetic_class.push(membership("c1", "k0"));
        let store = MemoryStore::new(data);
        let set = get_phonetic_siblings(&store, "c4").await.unwrap();
        let glyphs: Vec<&str> = set.siblings.iter().map(|s| s.char.as_str()).collect();
        assert_eq!(glyphs, vec!["江", "木"]);
    }
}
