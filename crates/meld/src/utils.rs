//! Utility functions for tree processing

use crate::arena::MeldTree;
use crate::error::Result;
use crate::types::NodeId;

/// Get all text content of a subtree in document order
///
/// Concatenates `text` of every node and `tail` of every descendant, the
/// way the content stream reads when rendered. The subtree root's own tail
/// lies outside the subtree and is skipped.
pub fn text_content(tree: &MeldTree, node_id: NodeId) -> Result<String> {
    enum Step {
        Enter(NodeId),
        Tail(NodeId),
    }

    let mut text = String::new();
    let mut stack = vec![Step::Enter(node_id)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                let node = tree.get(id)?;
                if let Some(t) = &node.text {
                    text.push_str(t);
                }
                for &child in node.children_ids().iter().rev() {
                    stack.push(Step::Tail(child));
                    stack.push(Step::Enter(child));
                }
            }
            Step::Tail(id) => {
                if let Some(tail) = &tree.get(id)?.tail {
                    text.push_str(tail);
                }
            }
        }
    }

    Ok(text)
}
