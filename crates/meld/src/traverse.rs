//! Traversal and meld id search
//!
//! Every walk is pre-order (node, then each child's subtree in child order)
//! and iterative, so tree depth is bounded by memory, not by the call stack.
//!
//! Meld ids are expected to be unique, but nothing enforces it. When an id
//! occurs more than once, the first node in pre-order wins. Trees built with
//! [`TreeConfig::strict_meld_ids`](crate::TreeConfig) report duplicates as
//! [`MeldError::DuplicateMeldId`] instead.

use crate::arena::MeldTree;
use crate::error::{MeldError, Result};
use crate::types::{MeldNode, NodeId};
use ahash::AHashMap;

/// Lazy pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a MeldTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Ok(node) = self.tree.get(id) {
            self.stack.extend(node.children_ids.iter().rev().copied());
        }
        Some(id)
    }
}

impl MeldTree {
    /// Pre-order iterator over `node` and all of its descendants
    pub fn iter(&self, node: NodeId) -> Result<Descendants<'_>> {
        self.get(node)?;
        Ok(Descendants {
            tree: self,
            stack: vec![node],
        })
    }

    /// Pre-order listing of the subtree at `node`; `node` comes first
    pub fn flatten(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.iter(node)?.collect())
    }

    /// Pre-order listing restricted to elements named `tag` (`"*"` for all)
    pub fn iter_tag<'a>(
        &'a self,
        node: NodeId,
        tag: &'a str,
    ) -> Result<impl Iterator<Item = NodeId> + 'a> {
        Ok(self.iter(node)?.filter(move |&id| {
            tag == "*" || self.get(id).ok().and_then(MeldNode::tag_name) == Some(tag)
        }))
    }

    /// Find the node carrying meld id `id` in the subtree at `node`
    ///
    /// Returns `Ok(None)` when no node carries the id. Stops at the first
    /// pre-order match unless the tree is configured with strict meld ids.
    pub fn find_by_meld_id(&self, node: NodeId, id: &str) -> Result<Option<NodeId>> {
        if self.config().strict_meld_ids {
            let matches = self.find_with_attrib(node, crate::MELD_ID, Some(id))?;
            if matches.len() > 1 {
                return Err(MeldError::DuplicateMeldId {
                    id: id.to_string(),
                    count: matches.len(),
                });
            }
            return Ok(matches.first().copied());
        }

        Ok(self
            .iter(node)?
            .find(|&candidate| self.meld_id(candidate).ok().flatten() == Some(id)))
    }

    /// Meld id of a node, if it carries one
    pub fn meld_id(&self, node: NodeId) -> Result<Option<&str>> {
        Ok(self.get(node)?.meld_id())
    }

    /// All nodes carrying a meld id, in pre-order
    pub fn find_melds(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.find_with_attrib(node, crate::MELD_ID, None)
    }

    /// Nodes with attribute `key`, optionally restricted to those whose
    /// value equals `value`, in pre-order
    pub fn find_with_attrib(
        &self,
        node: NodeId,
        key: &str,
        value: Option<&str>,
    ) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        for id in self.iter(node)? {
            let Some(attr) = self.get(id)?.attr(key) else {
                continue;
            };
            if value.map_or(true, |expected| expected == attr) {
                found.push(id);
            }
        }
        Ok(found)
    }

    /// Map of meld id to node for the subtree at `node`
    ///
    /// Duplicate ids map to their first pre-order occurrence.
    pub fn meld_index(&self, node: NodeId) -> Result<AHashMap<String, NodeId>> {
        let mut index = AHashMap::new();
        for id in self.find_melds(node)? {
            if let Some(meld_id) = self.meld_id(id)? {
                index.entry(meld_id.to_string()).or_insert(id);
            }
        }
        Ok(index)
    }

    /// Occurrences of each meld id in the subtree at `node`
    pub(crate) fn meld_counts(&self, node: NodeId) -> Result<AHashMap<&str, usize>> {
        let mut counts = AHashMap::new();
        for id in self.find_melds(node)? {
            if let Some(meld_id) = self.get(id)?.meld_id() {
                *counts.entry(meld_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Check that no meld id occurs twice in the subtree at `node`
    ///
    /// Reports the first duplicated id in pre-order.
    pub fn validate_meld_ids(&self, node: NodeId) -> Result<()> {
        let melds = self.find_melds(node)?;
        let mut counts: AHashMap<&str, usize> = AHashMap::with_capacity(melds.len());
        let mut order = Vec::with_capacity(melds.len());

        for id in melds {
            if let Some(meld_id) = self.get(id)?.meld_id() {
                let count = counts.entry(meld_id).or_insert(0);
                if *count == 0 {
                    order.push(meld_id);
                }
                *count += 1;
            }
        }

        for meld_id in order {
            let count = counts.get(meld_id).copied().unwrap_or(0);
            if count > 1 {
                return Err(MeldError::DuplicateMeldId {
                    id: meld_id.to_string(),
                    count,
                });
            }
        }
        Ok(())
    }

    /// `node` followed by each of its ancestors up to the root
    pub fn lineage(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.get(id)?.parent_id;
        }
        Ok(chain)
    }
}
