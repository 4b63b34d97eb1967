//! Content rewriting
//!
//! Dynamic content is injected by swapping a node's payload for a synthetic
//! child (or, for [`MeldTree::replace`], swapping the node itself for one).
//! The synthetic node is tagged with the replacement tag of the node that
//! will hold it (the node itself for `set_content`, its parent for
//! `replace`), usually [`Tag::Replace`], and carries the new text plus the
//! `structure` flag that tells the renderer whether the text is raw markup.
//!
//! Discarded content is released from the arena.

use crate::arena::MeldTree;
use crate::error::{MeldError, Result};
use crate::types::{MeldNode, NodeId, Tag};

impl MeldTree {
    /// Replace everything `node` displays with `text`.
    ///
    /// Clears `node.text`, releases all existing children and installs a
    /// single replacement child (empty attributes, given text and structure).
    /// Tag, attributes and tail of `node` are untouched. Fails with
    /// `MissingReplaceTag` if `node` has no replacement tag.
    #[tracing::instrument(level = "trace", skip(self, text))]
    pub fn set_content(
        &mut self,
        node: NodeId,
        text: impl Into<String>,
        structure: bool,
    ) -> Result<NodeId> {
        let replacement = self.replacement_for(node, text.into(), structure)?;
        self.get_mut(node)?.text = None;

        let child = self.alloc(replacement)?;
        let mut children = MeldTree::no_children();
        children.push(child);
        let old = self.replace_children(node, children)?;

        let released: usize = old.into_iter().map(|id| self.release_detached(id)).sum();
        tracing::debug!(
            "[Content] set content of {} (released {} nodes)",
            node,
            released
        );
        Ok(child)
    }

    /// Replace `node` in its parent with a replacement node holding `text`.
    ///
    /// The new node takes its tag and kind from the parent's replacement
    /// tag, so it fails with `MissingReplaceTag` for a parent without one.
    /// Returns the index `node` occupied, or `None` for a root, which is
    /// left as it is. The replaced subtree is released.
    #[tracing::instrument(level = "trace", skip(self, text))]
    pub fn replace(
        &mut self,
        node: NodeId,
        text: impl Into<String>,
        structure: bool,
    ) -> Result<Option<usize>> {
        let Some(parent) = self.parent(node)? else {
            return Ok(None);
        };
        let replacement = self.replacement_for(parent, text.into(), structure)?;

        let Some(index) = self.deparent(node)? else {
            return Ok(None);
        };
        let released = self.release_detached(node);
        let new_node = self.alloc(replacement)?;
        self.insert(parent, index, new_node)?;

        tracing::debug!(
            "[Content] replaced {} at {}[{}] (released {} nodes)",
            node,
            parent,
            index,
            released
        );
        Ok(Some(index))
    }

    /// Set the text of the node carrying each meld id.
    ///
    /// Returns the ids no node could be found for, sorted. Missing ids are
    /// never an error. A duplicated id fills its first pre-order node, or,
    /// with strict meld ids, fails with `DuplicateMeldId` before any text
    /// is written.
    pub fn fill_melds<K, V, I>(&mut self, root: NodeId, values: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values: Vec<(K, V)> = values.into_iter().collect();
        if self.config().strict_meld_ids {
            let counts = self.meld_counts(root)?;
            for (key, _) in &values {
                let count = counts.get(key.as_ref()).copied().unwrap_or(0);
                if count > 1 {
                    return Err(MeldError::DuplicateMeldId {
                        id: key.as_ref().to_string(),
                        count,
                    });
                }
            }
        }

        let index = self.meld_index(root)?;
        let mut unfilled = Vec::new();

        for (key, value) in values {
            match index.get(key.as_ref()) {
                Some(&id) => self.get_mut(id)?.text = Some(value.into()),
                None => unfilled.push(key.as_ref().to_string()),
            }
        }

        unfilled.sort();
        if !unfilled.is_empty() {
            tracing::trace!("[Content] unfilled melds: {:?}", unfilled);
        }
        Ok(unfilled)
    }

    /// Set several attributes at once
    pub fn set_attributes<K, V, I>(&mut self, node: NodeId, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.set_attribute(node, key, value)?;
        }
        Ok(())
    }

    /// Drop attributes, text, tail and all children of `node`
    pub fn clear_node(&mut self, node: NodeId) -> Result<()> {
        let target = self.get_mut(node)?;
        target.attributes.clear();
        target.text = None;
        target.tail = None;

        let old = self.replace_children(node, MeldTree::no_children())?;
        for id in old {
            self.release_detached(id);
        }
        Ok(())
    }

    /// Build a synthetic content node to sit under `holder`
    fn replacement_for(&self, holder: NodeId, text: String, structure: bool) -> Result<MeldNode> {
        let source = self.get(holder)?;
        let tag: Tag = source
            .replace_tag
            .clone()
            .ok_or(MeldError::MissingReplaceTag(holder))?;

        let mut replacement = MeldNode::replacement(source.kind, Some(text), Some(structure));
        replacement.tag = tag;
        replacement.replace_tag = source.replace_tag.clone();
        Ok(replacement)
    }
}
