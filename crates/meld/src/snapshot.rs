//! Structural snapshots
//!
//! A [`NodeSnapshot`] is an owned, id-free picture of a subtree: kind, tag,
//! attributes, text, tail, structure, replacement tag and children. Two
//! subtrees are structurally equal exactly when their snapshots are equal,
//! which is how cloned trees are compared against their sources.
//!
//! Snapshots serialize with serde, and a tree can be rebuilt from one.

use crate::arena::MeldTree;
use crate::error::{MeldError, Result};
use crate::types::{MeldNode, NodeId, NodeKind, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<bool>,
    #[serde(default)]
    pub replace_tag: Option<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Snapshot of a single node, without children
    fn of(node: &MeldNode) -> Self {
        Self {
            kind: node.kind,
            tag: node.tag.clone(),
            attributes: node
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            text: node.text.clone(),
            tail: node.tail.clone(),
            structure: node.structure,
            replace_tag: node.replace_tag.clone(),
            children: Vec::new(),
        }
    }

    fn to_node(&self) -> MeldNode {
        let mut node = MeldNode::new(self.kind, self.tag.clone())
            .with_replace_tag(self.replace_tag.clone());
        node.attributes = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        node.text = self.text.clone();
        node.tail = self.tail.clone();
        node.structure = self.structure;
        node
    }

    /// Number of nodes in this snapshot
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(snapshot) = stack.pop() {
            count += 1;
            stack.extend(snapshot.children.iter());
        }
        count
    }
}

impl MeldTree {
    /// Structural snapshot of the subtree at `node`
    pub fn snapshot(&self, node: NodeId) -> Result<NodeSnapshot> {
        // Pre-order listing with the listing index of each parent
        let mut order: Vec<Option<usize>> = Vec::new();
        let mut slots: Vec<Option<NodeSnapshot>> = Vec::new();
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(node, None)];

        while let Some((id, parent)) = stack.pop() {
            let source = self.get(id)?;
            let index = slots.len();
            slots.push(Some(NodeSnapshot::of(source)));
            order.push(parent);
            for &child in source.children_ids.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        // In reverse pre-order every subtree is complete before its parent
        // is reached; children arrive last-first and are flipped once.
        for index in (1..slots.len()).rev() {
            let (Some(mut snapshot), Some(parent)) = (slots[index].take(), order[index]) else {
                continue;
            };
            snapshot.children.reverse();
            if let Some(parent) = slots[parent].as_mut() {
                parent.children.push(snapshot);
            }
        }

        let mut root = slots
            .into_iter()
            .next()
            .flatten()
            .ok_or(MeldError::NodeNotFound(node))?;
        root.children.reverse();
        Ok(root)
    }

    /// Snapshot of the subtree at `node` as pretty-printed JSON
    pub fn to_json(&self, node: NodeId) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot(node)?)?)
    }

    /// Build a subtree from a snapshot, appended to `parent` when given.
    /// Returns the new subtree root.
    pub fn build_from_snapshot(
        &mut self,
        snapshot: &NodeSnapshot,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.get(parent)?;
        }

        let root = self.alloc(snapshot.to_node())?;
        if let Some(parent) = parent {
            self.link_last(parent, root)?;
        }

        let mut stack: Vec<(&NodeSnapshot, NodeId)> = vec![(snapshot, root)];
        while let Some((source, new_id)) = stack.pop() {
            for child in &source.children {
                let child_id = self.alloc(child.to_node())?;
                self.link_last(new_id, child_id)?;
                stack.push((child, child_id));
            }
        }

        tracing::trace!(
            "[Snapshot] built {} nodes under {:?}",
            snapshot.node_count(),
            parent
        );
        Ok(root)
    }
}
