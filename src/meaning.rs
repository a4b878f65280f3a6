//! Meaning tree builder / 의미 트리 구성
//!
//! Senses are stored flat and linked by parent→child edges. The builder turns them into
//! a forest where every node owns its children by value. A sense may have at most one
//! parent; input that gives a sense two parents is rejected instead of sharing the node
//! between branches.

use std::collections::{HashMap, HashSet};

use crate::error::{HanjaError, Result};
use crate::models::{MeaningEdge, MeaningSense, MeaningTreeNode, Relation};
use crate::store::HanjaStore;

/// Assemble the forest from one character's senses and edges / 의미 숲 구성
///
/// - `senses` must already be in display order (sort_order)
/// - children are appended in edge order and carry the edge's relation
/// - roots are the senses that are never a child, in sense order
/// - edges naming a sense outside `senses` attach nothing, but their child still
///   counts as a child when picking roots
pub fn build_meaning_forest(
    senses: &[MeaningSense],
    edges: &[MeaningEdge],
) -> Result<Vec<MeaningTreeNode>> {
    if senses.is_empty() {
        return Ok(Vec::new());
    }

    let known: HashSet<&str> = senses.iter().map(|s| s.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<(&str, Relation)>> = HashMap::new();
    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    let child_ids: HashSet<&str> = edges.iter().map(|e| e.child_sense_id.as_str()).collect();

    for edge in edges {
        let parent = edge.parent_sense_id.as_str();
        let child = edge.child_sense_id.as_str();
        if !known.contains(parent) || !known.contains(child) {
            tracing::warn!(
                "Meaning edge {} references unknown sense ({} -> {}), skipped",
                edge.id,
                parent,
                child
            );
            continue;
        }
        if let Some(previous) = parent_of.insert(child, parent) {
            return Err(HanjaError::DataIntegrity(format!(
                "sense {} has two parents ({} and {})",
                child, previous, parent
            )));
        }
        children.entry(parent).or_default().push((child, edge.relation));
    }

    let by_id: HashMap<&str, &MeaningSense> = senses.iter().map(|s| (s.id.as_str(), s)).collect();

    let forest: Vec<MeaningTreeNode> = senses
        .iter()
        .filter(|s| !child_ids.contains(s.id.as_str()))
        .map(|s| materialize(s, None, &by_id, &children))
        .collect();

    // With one parent per sense, anything unreachable from a root sits on a cycle
    // or hangs off an unknown parent
    let reachable = count_nodes(&forest);
    if reachable < senses.len() {
        tracing::warn!(
            "{} meaning senses are unreachable from any root and were left out of the tree",
            senses.len() - reachable
        );
    }

    Ok(forest)
}

fn materialize(
    sense: &MeaningSense,
    relation: Option<Relation>,
    by_id: &HashMap<&str, &MeaningSense>,
    children: &HashMap<&str, Vec<(&str, Relation)>>,
) -> MeaningTreeNode {
    let kids = children
        .get(sense.id.as_str())
        .map(|list| {
            list.iter()
                .filter_map(|(id, rel)| by_id.get(id).map(|child| materialize(child, Some(*rel), by_id, children)))
                .collect()
        })
        .unwrap_or_default();

    MeaningTreeNode {
        id: sense.id.clone(),
        label: sense.label.clone(),
        short_gloss: sense.short_gloss.clone(),
        example: sense.example.clone(),
        relation,
        children: kids,
    }
}

fn count_nodes(nodes: &[MeaningTreeNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

/// Load and assemble the meaning forest of a character / 의미 트리 조회
pub async fn get_meaning_tree(
    store: &dyn HanjaStore,
    character_id: &str,
) -> Result<Vec<MeaningTreeNode>> {
    let (senses, edges) = tokio::try_join!(
        store.meaning_senses(character_id),
        store.meaning_edges(character_id),
    )?;
    build_meaning_forest(&senses, &edges)
}
