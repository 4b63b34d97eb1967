//! Subtree cloning
//!
//! Two cloners with identical results and different construction order:
//!
//! ```text
//! clone:         a, a/0, a/0/0, a/1        (pre-order, one node at a time)
//! bfclone_one:   a, [a/0, a/1], [a/0/0]    (level order, siblings in batches)
//! ```
//!
//! Both capture the source subtree (shallow copies plus shape) before the
//! first allocation. Construction never reads the source again, so a
//! subtree may be cloned under itself or under one of its own descendants.

use crate::arena::MeldTree;
use crate::error::{MeldError, Result};
use crate::types::{Children, MeldNode, NodeId};
use std::collections::VecDeque;

/// Snapshot of a source subtree, in construction order
struct ClonePlan {
    /// Detached copies of the source nodes
    copies: Vec<MeldNode>,
    /// Plan index of each copy's parent; `None` for the plan roots
    parents: Vec<Option<usize>>,
}

impl ClonePlan {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            copies: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, node: &MeldNode, parent: Option<usize>) -> usize {
        self.copies.push(node.shallow_copy());
        self.parents.push(parent);
        self.copies.len() - 1
    }

    fn len(&self) -> usize {
        self.copies.len()
    }
}

impl MeldTree {
    /// Deep-copy the subtree at `node`, depth-first.
    ///
    /// The copy keeps kind, tag, text, tail, structure and replace tag,
    /// gets its own attribute maps and child lists, and is appended to
    /// `parent` when one is given. Returns the new subtree root.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn clone_subtree(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.get(parent)?;
        }
        let plan = self.plan_preorder(node)?;
        let count = plan.len();

        let mut new_ids: Vec<NodeId> = Vec::with_capacity(count);
        for (copy, plan_parent) in plan.copies.into_iter().zip(plan.parents) {
            let id = self.alloc(copy)?;
            match plan_parent {
                Some(index) => self.link_last(new_ids[index], id)?,
                None => {
                    if let Some(parent) = parent {
                        self.link_last(parent, id)?;
                    }
                }
            }
            new_ids.push(id);
        }

        let root = new_ids[0];
        tracing::debug!("[Cloner] cloned {} -> {} ({} nodes)", node, root, count);
        Ok(root)
    }

    /// Deep-copy the subtree at `node`, breadth-first.
    ///
    /// Same result as [`MeldTree::clone_subtree`]: the new root is appended
    /// to `parent` (if any), then each level of descendants is created as
    /// whole sibling batches.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn bfclone_one(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.get(parent)?;
        }
        let plan = self.plan_levels(&[node])?;
        let count = plan.len();
        let ids = self.build_levels(plan, parent, false)?;

        let root = ids[0];
        tracing::debug!("[Cloner] bfcloned {} -> {} ({} nodes)", node, root, count);
        Ok(root)
    }

    /// Clone a batch of sibling roots under `parent`, breadth-first.
    ///
    /// The copies of `nodes` replace `parent`'s child list in one
    /// assignment; previous children become detached roots. An empty
    /// batch leaves `parent` untouched. Returns `parent`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn bfclone_many(&mut self, nodes: &[NodeId], parent: NodeId) -> Result<NodeId> {
        self.get(parent)?;
        if nodes.is_empty() {
            return Ok(parent);
        }
        let plan = self.plan_levels(nodes)?;
        let count = plan.len();
        self.build_levels(plan, Some(parent), true)?;

        tracing::debug!(
            "[Cloner] bfcloned {} roots under {} ({} nodes)",
            nodes.len(),
            parent,
            count
        );
        Ok(parent)
    }

    /// Repeat a template node once per item.
    ///
    /// The first item is paired with the template node itself, every further
    /// item with a fresh breadth-first clone seated in the template's parent.
    /// With `child_meld_id`, the descendant carrying that meld id is repeated
    /// instead of `node`.
    pub fn repeat<T, I>(
        &mut self,
        node: NodeId,
        items: I,
        child_meld_id: Option<&str>,
    ) -> Result<Vec<(NodeId, T)>>
    where
        I: IntoIterator<Item = T>,
    {
        let template = match child_meld_id {
            Some(id) => self
                .find_by_meld_id(node, id)?
                .ok_or_else(|| MeldError::MeldIdNotFound(id.to_string()))?,
            None => node,
        };
        let parent = self.parent(template)?;

        let mut repeated = Vec::new();
        for item in items {
            let element = if repeated.is_empty() {
                template
            } else {
                self.bfclone_one(template, parent)?
            };
            repeated.push((element, item));
        }
        tracing::trace!("[Cloner] repeated {} x{}", template, repeated.len());
        Ok(repeated)
    }

    /// Capture `node`'s subtree in pre-order
    fn plan_preorder(&self, node: NodeId) -> Result<ClonePlan> {
        let mut plan = ClonePlan::with_capacity(16);
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(node, None)];

        while let Some((id, parent)) = stack.pop() {
            let source = self.get(id)?;
            let index = plan.push(source, parent);

            // Push children in reverse order (so they're visited left-to-right)
            for &child in source.children_ids.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        Ok(plan)
    }

    /// Capture the subtrees at `roots` in level order; siblings stay
    /// contiguous, so each sibling batch shares one parent index
    fn plan_levels(&self, roots: &[NodeId]) -> Result<ClonePlan> {
        let mut plan = ClonePlan::with_capacity(16);
        let mut queue: VecDeque<(NodeId, Option<usize>)> =
            roots.iter().map(|&id| (id, None)).collect();

        while let Some((id, parent)) = queue.pop_front() {
            let source = self.get(id)?;
            let index = plan.push(source, parent);
            for &child in &source.children_ids {
                queue.push_back((child, Some(index)));
            }
        }

        Ok(plan)
    }

    /// Materialize a level-order plan batch by batch.
    ///
    /// Plan roots go under `parent`: as a wholesale child-list replacement
    /// when `replace` is set, appended otherwise.
    fn build_levels(
        &mut self,
        plan: ClonePlan,
        parent: Option<NodeId>,
        replace: bool,
    ) -> Result<Vec<NodeId>> {
        let mut new_ids: Vec<NodeId> = Vec::with_capacity(plan.len());
        let mut copies = plan.copies.into_iter().zip(plan.parents).peekable();

        while let Some((first, batch_parent)) = copies.next() {
            let mut batch: Children = MeldTree::no_children();
            batch.push(self.alloc(first)?);
            while let Some((copy, _)) = copies.next_if(|(_, p)| *p == batch_parent) {
                batch.push(self.alloc(copy)?);
            }
            new_ids.extend(batch.iter().copied());

            let target = match batch_parent {
                Some(index) => Some(new_ids[index]),
                None => parent,
            };
            match target {
                Some(target) if batch_parent.is_some() || replace => {
                    self.replace_children(target, batch)?;
                }
                Some(target) => {
                    for id in batch {
                        self.link_last(target, id)?;
                    }
                }
                None => {}
            }
        }

        Ok(new_ids)
    }
}
