//! Meld diffing
//!
//! Compares the meld-tagged nodes of two subtrees (usually a template and a
//! rendered copy of it) by meld id:
//!
//! - `removed`: source melds whose id is absent from the target
//! - `added`: target melds whose id is absent from the source
//! - `moved`: target melds whose id exists in the source but whose ancestor
//!   tag chain differs
//!
//! The `reduced` sets drop any node whose parent is already listed, so a
//! moved subtree is reported once at its top.

use crate::arena::MeldTree;
use crate::error::Result;
use crate::types::NodeId;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSet {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub moved: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeldDiff {
    pub unreduced: DiffSet,
    pub reduced: DiffSet,
}

impl MeldTree {
    /// Meld differences from the subtree at `source` to the one at `target`
    pub fn diff_meld(&self, source: NodeId, target: NodeId) -> Result<MeldDiff> {
        let source_melds = self.meld_pairs(source)?;
        let target_melds = self.meld_pairs(target)?;

        let source_ids: AHashSet<&str> = source_melds.iter().map(|&(_, id)| id).collect();
        let mut target_first: AHashMap<&str, NodeId> = AHashMap::new();
        for &(node, id) in &target_melds {
            target_first.entry(id).or_insert(node);
        }

        let removed: Vec<NodeId> = source_melds
            .iter()
            .filter(|(_, id)| !target_first.contains_key(id))
            .map(|&(node, _)| node)
            .collect();

        let added: Vec<NodeId> = target_melds
            .iter()
            .filter(|(_, id)| !source_ids.contains(id))
            .map(|&(node, _)| node)
            .collect();

        let mut moved = Vec::new();
        for &(node, id) in &source_melds {
            if let Some(&counterpart) = target_first.get(id) {
                if !self.shared_lineage(node, counterpart)? {
                    moved.push(counterpart);
                }
            }
        }

        let reduced = DiffSet {
            added: self.diff_reduce(&added)?,
            removed: self.diff_reduce(&removed)?,
            moved: self.diff_reduce(&moved)?,
        };
        tracing::debug!(
            "[Diff] {} -> {}: +{} -{} ~{}",
            source,
            target,
            added.len(),
            removed.len(),
            moved.len()
        );

        Ok(MeldDiff {
            unreduced: DiffSet {
                added,
                removed,
                moved,
            },
            reduced,
        })
    }

    /// Whether two nodes have ancestor chains with the same tags, all the
    /// way up to their roots
    pub fn shared_lineage(&self, source: NodeId, target: NodeId) -> Result<bool> {
        let mut source_parent = self.parent(source)?;
        let mut target_parent = self.parent(target)?;

        loop {
            match (source_parent, target_parent) {
                (None, None) => return Ok(true),
                (Some(s), Some(t)) => {
                    if self.get(s)?.tag != self.get(t)?.tag {
                        return Ok(false);
                    }
                    source_parent = self.parent(s)?;
                    target_parent = self.parent(t)?;
                }
                _ => return Ok(false),
            }
        }
    }

    /// Drop every node whose parent is already in the reduced list.
    ///
    /// Expects `nodes` in pre-order.
    pub fn diff_reduce(&self, nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        let mut reduced: Vec<NodeId> = Vec::new();
        for &node in nodes {
            match self.parent(node)? {
                Some(parent) if reduced.contains(&parent) => {}
                _ => reduced.push(node),
            }
        }
        Ok(reduced)
    }

    /// (node, meld id) pairs of the subtree, in pre-order
    fn meld_pairs(&self, node: NodeId) -> Result<Vec<(NodeId, &str)>> {
        let mut pairs = Vec::new();
        for id in self.find_melds(node)? {
            if let Some(meld_id) = self.get(id)?.meld_id() {
                pairs.push((id, meld_id));
            }
        }
        Ok(pairs)
    }
}
