//! Error types for tree operations
//!
//! Simple, flat error hierarchy. Not-found searches are `Ok(None)`, not errors.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeldError>;

#[derive(Debug, Error)]
pub enum MeldError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Node {0} has no replacement tag")]
    MissingReplaceTag(NodeId),

    #[error("Attaching node {node} under {parent} would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("Attributes of replacement node {0} are immutable")]
    ImmutableAttributes(NodeId),

    #[error("No node carries meld id {0:?}")]
    MeldIdNotFound(String),

    #[error("Meld id {id:?} occurs {count} times")]
    DuplicateMeldId { id: String, count: usize },

    #[error("No root node set")]
    NoRoot,

    #[error("Node {node} is a child of {parent} and cannot be the root")]
    NotARoot { node: NodeId, parent: NodeId },

    #[error("Arena is full: {0} slots allocated")]
    ArenaFull(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
