//! Core node definitions
//!
//! Key design principles:
//! 1. Nodes are addressed by u32 indices into the arena, never by pointer
//! 2. `parent` is a plain index (non-owning), `children` is the owning edge
//! 3. SmallVec for child lists (most template nodes have few children)
//! 4. Every node owns its attribute map; maps are copied, never shared

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Child list of a node
pub type Children = SmallVec<[NodeId; 4]>;

/// Namespace URL of meld attributes
pub const MELD_NS_URL: &str = "http://www.plope.com/software/meld3";

/// Reserved attribute key holding a node's meld identifier
pub const MELD_ID: &str = "{http://www.plope.com/software/meld3}id";

/// Opaque "sort of node" token.
///
/// Cloning produces a node with the same kind as its source. The engine
/// never branches on it; it only carries it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKind(pub u16);

impl NodeKind {
    /// Kind used by the default element builders
    pub const ELEMENT: NodeKind = NodeKind(0);

    pub const fn new(raw: u16) -> Self {
        NodeKind(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::ELEMENT
    }
}

/// Node tag: an element name, or the sentinel used by synthetic
/// content nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Name(String),
    Replace,
}

impl Tag {
    pub fn name(name: impl Into<String>) -> Self {
        Tag::Name(name.into())
    }

    /// Element name, `None` for the Replace sentinel
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Tag::Name(name) => Some(name),
            Tag::Replace => None,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Tag::Replace)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Name(name) => f.write_str(name),
            Tag::Replace => f.write_str("<Replace>"),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Name(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Name(name)
    }
}

/// A tree node
///
/// Links (`parent_id`, `children_ids`) are owned by [`crate::MeldTree`] and
/// only change through its operations; build the content slots with the
/// `with_*` builders and attach through the tree. Attributes of an attached
/// node change only through [`crate::MeldTree::set_attribute`], which keeps
/// replacement nodes read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct MeldNode {
    pub kind: NodeKind,
    pub tag: Tag,
    pub(crate) attributes: HashMap<String, String>,

    /// Content before the first child
    pub text: Option<String>,
    /// Content after this node, in the parent's content stream
    pub tail: Option<String>,
    /// Raw markup (`Some(true)`) vs escaped text; opaque to the engine
    pub structure: Option<bool>,

    /// Tag used when synthesizing content children for this node
    pub replace_tag: Option<Tag>,

    // Navigation indices
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) children_ids: Children,
}

impl MeldNode {
    /// Create a node with every optional slot empty
    pub fn new(kind: NodeKind, tag: impl Into<Tag>) -> Self {
        Self {
            kind,
            tag: tag.into(),
            attributes: HashMap::new(),
            text: None,
            tail: None,
            structure: None,
            replace_tag: Some(Tag::Replace),
            parent_id: None,
            children_ids: SmallVec::new(),
        }
    }

    /// Element of the default kind
    pub fn element(tag: impl Into<Tag>) -> Self {
        Self::new(NodeKind::ELEMENT, tag)
    }

    /// Synthetic content node carrying `text` under the Replace sentinel
    pub fn replacement(kind: NodeKind, text: Option<String>, structure: Option<bool>) -> Self {
        Self {
            text,
            structure,
            ..Self::new(kind, Tag::Replace)
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Tag this node with a meld identifier
    pub fn with_meld_id(self, id: impl Into<String>) -> Self {
        self.with_attr(MELD_ID, id)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_structure(mut self, structure: bool) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn with_replace_tag(mut self, replace_tag: Option<Tag>) -> Self {
        self.replace_tag = replace_tag;
        self
    }

    /// Detached copy of this node's own content slots: same kind, tag,
    /// text, tail, structure and replace tag, a fresh copy of the
    /// attribute map, no parent and no children.
    pub fn shallow_copy(&self) -> Self {
        Self {
            kind: self.kind,
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            text: self.text.clone(),
            tail: self.tail.clone(),
            structure: self.structure,
            replace_tag: self.replace_tag.clone(),
            parent_id: None,
            children_ids: SmallVec::new(),
        }
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn children_ids(&self) -> &[NodeId] {
        &self.children_ids
    }

    /// Attribute map; edit through [`crate::MeldTree::set_attribute`]
    ///
    /// ```compile_fail
    /// let mut tree = meld::MeldTree::new();
    /// let id = tree.add_node(meld::MeldNode::element("p")).unwrap();
    /// tree.get_mut(id).unwrap().attributes.insert("k".into(), "v".into());
    /// ```
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Meld identifier, if this node carries one
    pub fn meld_id(&self) -> Option<&str> {
        self.attr(MELD_ID)
    }

    /// Element name, `None` for Replace nodes
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_name()
    }

    pub fn is_replace(&self) -> bool {
        self.tag.is_replace()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
