//! Arena-based tree storage
//!
//! All nodes of a template live in one `Vec`, addressed by `NodeId`.
//! The parent link is a plain index, so there is no ownership cycle
//! between parent and child, and every walk over the tree is an explicit
//! loop rather than a recursive call.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<Option<MeldNode>>
//!        [Node0][Node1][None][Node3]...
//!                       ↑ released slot, never reused
//! ```
//!
//! Released slots stay vacant so a stale `NodeId` reports `NodeNotFound`
//! instead of silently addressing a newer node.

use crate::error::{MeldError, Result};
use crate::types::{Children, MeldNode, NodeId, Tag};
use smallvec::SmallVec;

/// Configuration for a tree
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Slots to pre-allocate
    pub initial_capacity: usize,
    /// Treat a meld id occurring twice in a searched subtree as an error
    /// instead of resolving to the first pre-order match
    pub strict_meld_ids: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            strict_meld_ids: false,
        }
    }
}

/// Arena owning every node of one or more template trees
#[derive(Debug)]
pub struct MeldTree {
    /// Node slots; `None` marks a released node
    nodes: Vec<Option<MeldNode>>,

    /// Number of occupied slots
    live: usize,

    /// Designated document root (if set)
    root_id: Option<NodeId>,

    config: TreeConfig,
}

impl MeldTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create tree with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(TreeConfig {
            initial_capacity: capacity,
            ..TreeConfig::default()
        })
    }

    /// Create tree with custom config
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::with_capacity(config.initial_capacity),
            live: 0,
            root_id: None,
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Add a detached node to the arena, returns its ID
    ///
    /// Any links already present on `node` are dropped: the new node has
    /// no parent and no children.
    pub fn add_node(&mut self, mut node: MeldNode) -> Result<NodeId> {
        node.parent_id = None;
        node.children_ids.clear();
        self.alloc(node)
    }

    /// Add a node and append it to `parent`
    pub fn add_child(&mut self, parent: NodeId, node: MeldNode) -> Result<NodeId> {
        self.get(parent)?;
        let child = self.add_node(node)?;
        self.link_last(parent, child)?;
        Ok(child)
    }

    pub(crate) fn alloc(&mut self, node: MeldNode) -> Result<NodeId> {
        let node_id = next_id(self.nodes.len())?;
        self.nodes.push(Some(node));
        self.live += 1;
        Ok(node_id)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&MeldNode> {
        self.nodes
            .get(node_id as usize)
            .and_then(Option::as_ref)
            .ok_or(MeldError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    ///
    /// Text, tail and the other content slots may be edited freely;
    /// attributes and links are only reachable through the tree operations.
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut MeldNode> {
        self.nodes
            .get_mut(node_id as usize)
            .and_then(Option::as_mut)
            .ok_or(MeldError::NodeNotFound(node_id))
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.get(node_id).is_ok()
    }

    /// Set root node
    ///
    /// Only a parentless node can be the root; detach it first with
    /// [`MeldTree::deparent`] to promote a child.
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        if let Some(parent) = self.get(node_id)?.parent_id {
            return Err(MeldError::NotARoot {
                node: node_id,
                parent,
            });
        }
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&MeldNode> {
        let root_id = self.root_id.ok_or(MeldError::NoRoot)?;
        self.get(root_id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the arena holds no live nodes
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterator over all live node IDs, in allocation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| i as NodeId)
    }

    /// Children of a node
    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(node_id)?.children_ids)
    }

    /// Parent of a node, `None` for a root
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Append `child` as the last child of `parent`
    ///
    /// A child that already has a parent is moved, never shared.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.get(parent)?.children_ids.len();
        self.insert(parent, len, child)
    }

    /// Insert `child` into `parent` at `index` (clamped to the child count)
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        self.check_acyclic(parent, child)?;
        self.detach(child)?;
        if self.root_id == Some(child) {
            self.root_id = None;
        }

        let parent_node = self.get_mut(parent)?;
        let index = index.min(parent_node.children_ids.len());
        parent_node.children_ids.insert(index, child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Remove `child` from `parent`; the child becomes a detached root
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child)?.parent_id != Some(parent) {
            return Err(MeldError::NotAChild { parent, child });
        }
        self.detach(child)?;
        Ok(())
    }

    /// Remove a node from its parent, returning the index it occupied
    ///
    /// Returns `None` (and does nothing) for a root.
    pub fn deparent(&mut self, node_id: NodeId) -> Result<Option<usize>> {
        self.detach(node_id)
    }

    /// Position of a node in its parent's child list
    pub fn parent_index(&self, node_id: NodeId) -> Result<Option<usize>> {
        let Some(parent) = self.get(node_id)?.parent_id else {
            return Ok(None);
        };
        Ok(self
            .get(parent)?
            .children_ids
            .iter()
            .position(|&id| id == node_id))
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(
        &mut self,
        node_id: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        let node = self.writable_attributes(node_id)?;
        Ok(node.attributes.insert(key.into(), value.into()))
    }

    /// Remove an attribute, returning its value
    pub fn remove_attribute(&mut self, node_id: NodeId, key: &str) -> Result<Option<String>> {
        let node = self.writable_attributes(node_id)?;
        Ok(node.attributes.remove(key))
    }

    fn writable_attributes(&mut self, node_id: NodeId) -> Result<&mut MeldNode> {
        let node = self.get_mut(node_id)?;
        if node.tag == Tag::Replace {
            return Err(MeldError::ImmutableAttributes(node_id));
        }
        Ok(node)
    }

    /// Detach a subtree and free every node in it
    ///
    /// Ids of released nodes report `NodeNotFound` from then on.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn release_subtree(&mut self, node_id: NodeId) -> Result<usize> {
        self.detach(node_id)?;
        Ok(self.release_detached(node_id))
    }

    /// Free a subtree whose root is already detached
    pub(crate) fn release_detached(&mut self, node_id: NodeId) -> usize {
        let mut released = 0;
        let mut stack = vec![node_id];

        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id as usize).and_then(Option::take) {
                stack.extend(node.children_ids.iter().copied());
                released += 1;
            }
        }

        if self.root_id.is_some_and(|root| !self.contains(root)) {
            self.root_id = None;
        }
        self.live -= released;
        released
    }

    /// Swap in a new child list for `parent`, returning the old one.
    ///
    /// New children get `parent` as their parent; old children that are
    /// not part of the new list become detached roots.
    pub(crate) fn replace_children(
        &mut self,
        parent: NodeId,
        children: Children,
    ) -> Result<Children> {
        for &child in &children {
            self.get_mut(child)?.parent_id = Some(parent);
        }
        let old = std::mem::replace(&mut self.get_mut(parent)?.children_ids, children);
        for &child in &old {
            if self.get(parent)?.children_ids.contains(&child) {
                continue;
            }
            let node = self.get_mut(child)?;
            if node.parent_id == Some(parent) {
                node.parent_id = None;
            }
        }
        Ok(old)
    }

    /// Append a freshly allocated, parentless node
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get_mut(parent)?.children_ids.push(child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Unlink a node from its parent, returning its former index
    fn detach(&mut self, node_id: NodeId) -> Result<Option<usize>> {
        let Some(parent) = self.get(node_id)?.parent_id else {
            return Ok(None);
        };
        let siblings = &mut self.get_mut(parent)?.children_ids;
        let index = siblings.iter().position(|&id| id == node_id);
        if let Some(i) = index {
            siblings.remove(i);
        }
        self.get_mut(node_id)?.parent_id = None;
        Ok(index)
    }

    /// Reject attaching `child` under itself or one of its descendants
    fn check_acyclic(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(MeldError::CycleDetected {
                    node: child,
                    parent,
                });
            }
            current = self.get(id)?.parent_id;
        }
        Ok(())
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.live = 0;
        self.root_id = None;
    }

    /// Empty child list
    pub(crate) fn no_children() -> Children {
        SmallVec::new()
    }
}

impl Default for MeldTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Id for the slot at `len`, failing once ids no longer fit a `NodeId`
fn next_id(len: usize) -> Result<NodeId> {
    NodeId::try_from(len).map_err(|_| MeldError::ArenaFull(len))
}
