//! Tree generators shared by the property tests.

use meld::{MeldError, MeldTree, NodeId, NodeKind, NodeSnapshot, Tag, MELD_ID};
use proptest::prelude::*;

fn attribute_key() -> impl Strategy<Value = String> {
    prop::sample::select(vec![MELD_ID, "class", "href"]).prop_map(String::from)
}

fn node() -> impl Strategy<Value = NodeSnapshot> {
    (
        0u16..3,
        prop::sample::select(vec!["div", "p", "span", "li"]),
        prop::collection::btree_map(attribute_key(), "[a-z]{1,4}", 0..3),
        prop::option::of("[a-z ]{0,6}"),
        prop::option::of("[a-z ]{0,6}"),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::sample::select(vec![Tag::Replace, Tag::name("td")])),
    )
        .prop_map(
            |(kind, tag, attributes, text, tail, structure, replace_tag)| NodeSnapshot {
                kind: NodeKind::new(kind),
                tag: Tag::name(tag),
                attributes,
                text,
                tail,
                structure,
                replace_tag,
                children: Vec::new(),
            },
        )
}

/// Element trees up to four levels deep with up to four children per node
pub fn tree() -> impl Strategy<Value = NodeSnapshot> {
    node().prop_recursive(4, 48, 4, |inner| {
        (node(), prop::collection::vec(inner, 0..4)).prop_map(|(mut parent, children)| {
            parent.children = children;
            parent
        })
    })
}

/// Materialize a generated tree, returning the arena and its root
pub fn build(snapshot: &NodeSnapshot) -> (MeldTree, NodeId) {
    let mut tree = MeldTree::new();
    let root = tree
        .build_from_snapshot(snapshot, None)
        .expect("generated trees always build");
    (tree, root)
}

/// Check that every child in the subtree at `root` points back at its parent
pub fn assert_links(tree: &MeldTree, root: NodeId) -> Result<(), MeldError> {
    for id in tree.flatten(root)? {
        for &child in tree.children(id)? {
            assert_eq!(tree.parent(child)?, Some(id), "child {child} of {id}");
        }
    }
    Ok(())
}
