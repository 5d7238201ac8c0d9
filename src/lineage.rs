//src/lineage.rs

use crate::error::{Result, TaxError};
use crate::taxdb::TaxonomyTree;
use crate::types::{TaxonId, TaxonNode};

/// Walk parent pointers from `start` until a node of `target_rank` is found.
///
/// Returns `Ok(None)` when the self-parent root is reached without a match;
/// that is a normal outcome for reads classified above the target rank.
/// A node missing from the tree yields `UnknownTaxon`, and a walk longer
/// than the number of nodes in the tree yields `CyclicTaxonomy`.
pub fn resolve_to_rank(start: &str, tree: &TaxonomyTree, target_rank: &str) -> Result<Option<TaxonId>> {
    let max_steps = tree.len();
    let mut steps = 0usize;
    let mut current = start;
    let mut previous: Option<&str> = None;

    while previous != Some(current) {
        let node = tree
            .lookup(current)
            .ok_or_else(|| TaxError::UnknownTaxon(current.to_string()))?;
        steps += 1;
        if steps > max_steps {
            return Err(TaxError::CyclicTaxonomy {
                start: start.to_string(),
                steps: max_steps,
            });
        }
        if node.rank == target_rank {
            return Ok(Some(node.id.clone()));
        }
        previous = Some(current);
        current = &node.parent_id;
    }
    Ok(None)
}

/// The path from `start` up to and including the root, nearest first.
pub fn lineage<'a>(start: &str, tree: &'a TaxonomyTree) -> Result<Vec<&'a TaxonNode>> {
    let max_steps = tree.len();
    let mut path: Vec<&'a TaxonNode> = Vec::new();
    let mut current = start;

    loop {
        let node = tree
            .lookup(current)
            .ok_or_else(|| TaxError::UnknownTaxon(current.to_string()))?;
        if path.len() >= max_steps {
            return Err(TaxError::CyclicTaxonomy {
                start: start.to_string(),
                steps: max_steps,
            });
        }
        path.push(node);
        if node.is_root() {
            return Ok(path);
        }
        current = &node.parent_id;
    }
}
