//! Meld Template Tree Engine
//!
//! The structural core of a meld-style templating model: an element tree
//! where any node may carry a unique meld id for later lookup.
//!
//! ## Core Design
//!
//! ```text
//! builder / parser → MeldTree (arena) → clone / find / set_content → renderer
//!                         ↓
//!                    NodeId (u32)
//! ```
//!
//! - Nodes live in one arena and are addressed by `NodeId`
//! - `parent` is a plain index, `children` is the owning edge
//! - Every walk (clone, flatten, search, snapshot) uses an explicit
//!   stack or queue, so deep trees cannot exhaust the call stack
//! - Clones get fresh attribute maps and child lists; nothing is aliased
//!
//! Parsing markup into a tree and rendering it back are not part of this
//! crate; it consumes built trees and exposes in-memory operations only.
//!
//! ## Example
//!
//! ```
//! use meld::{MeldNode, MeldTree};
//!
//! let mut tree = MeldTree::new();
//! let ul = tree.add_node(MeldNode::element("ul"))?;
//! let li = tree.add_child(ul, MeldNode::element("li").with_meld_id("item"))?;
//!
//! let copy = tree.clone_subtree(li, Some(ul))?;
//! tree.set_content(copy, "second", false)?;
//!
//! assert_eq!(tree.find_by_meld_id(ul, "item")?, Some(li));
//! assert_eq!(tree.flatten(ul)?.len(), 4);
//! # Ok::<(), meld::MeldError>(())
//! ```

pub mod arena;
pub mod clone;
pub mod content;
pub mod diff;
pub mod error;
pub mod snapshot;
pub mod traverse;
pub mod types;
pub mod utils;

pub use arena::{MeldTree, TreeConfig};
pub use diff::{DiffSet, MeldDiff};
pub use error::{MeldError, Result};
pub use snapshot::NodeSnapshot;
pub use traverse::Descendants;
pub use types::*;
