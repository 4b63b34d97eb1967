//! Property tests for subtree cloning.

use meld::{MeldError, MeldNode, MeldTree, NodeId};
use proptest::prelude::*;

use crate::strategy::{assert_links, build, tree};

/// Rewrite every node of a subtree and reshape its top-level child list
fn scramble(tree: &mut MeldTree, node: NodeId) -> Result<(), MeldError> {
    for id in tree.flatten(node)? {
        tree.set_attribute(id, "class", "scrambled")?;
        tree.get_mut(id)?.text = Some("scrambled".into());
    }
    if let Some(&first) = tree.children(node)?.first() {
        tree.release_subtree(first)?;
    }
    tree.add_child(node, MeldNode::element("added"))?;
    Ok(())
}

fn clone_with(
    tree: &mut MeldTree,
    node: NodeId,
    parent: Option<NodeId>,
    breadth_first: bool,
) -> Result<NodeId, MeldError> {
    if breadth_first {
        tree.bfclone_one(node, parent)
    } else {
        tree.clone_subtree(node, parent)
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Both cloners produce the same structure as their source.
    #[test]
    fn property_cloners_agree(source in tree(), pick in any::<prop::sample::Index>()) {
        let (mut tree, root) = build(&source);
        let depth_first = tree.clone_subtree(root, None).unwrap();
        let breadth_first = tree.bfclone_one(root, None).unwrap();

        prop_assert_eq!(tree.snapshot(depth_first).unwrap(), source.clone());
        prop_assert_eq!(tree.snapshot(breadth_first).unwrap(), source);

        let ids = tree.flatten(root).unwrap();
        let node = *pick.get(&ids);
        let expected = tree.snapshot(node).unwrap();
        let a = tree.clone_subtree(node, None).unwrap();
        let b = tree.bfclone_one(node, None).unwrap();
        prop_assert_eq!(tree.snapshot(a).unwrap(), expected.clone());
        prop_assert_eq!(tree.snapshot(b).unwrap(), expected);
    }

    /// PROPERTY: Editing a clone never shows through in its source, and
    /// editing the source never shows through in the clone.
    #[test]
    fn property_clone_is_independent(source in tree(), breadth_first in any::<bool>()) {
        let (mut tree, root) = build(&source);
        let copy = clone_with(&mut tree, root, None, breadth_first).unwrap();

        scramble(&mut tree, copy).unwrap();
        prop_assert_eq!(tree.snapshot(root).unwrap(), source.clone());

        let copy_before = tree.snapshot(copy).unwrap();
        scramble(&mut tree, root).unwrap();
        prop_assert_eq!(tree.snapshot(copy).unwrap(), copy_before);
        prop_assert_ne!(tree.snapshot(root).unwrap(), source);
    }

    /// PROPERTY: A clone seated inside its own source tree lands as the last
    /// child of the target and leaves every parent link consistent.
    #[test]
    fn property_clone_under_own_tree(
        source in tree(),
        node_pick in any::<prop::sample::Index>(),
        parent_pick in any::<prop::sample::Index>(),
        breadth_first in any::<bool>(),
    ) {
        let (mut tree, root) = build(&source);
        let ids = tree.flatten(root).unwrap();
        let node = *node_pick.get(&ids);
        let parent = *parent_pick.get(&ids);
        let expected = tree.snapshot(node).unwrap();

        let copy = clone_with(&mut tree, node, Some(parent), breadth_first).unwrap();

        prop_assert_eq!(tree.children(parent).unwrap().last().copied(), Some(copy));
        prop_assert_eq!(tree.parent(copy).unwrap(), Some(parent));
        prop_assert_eq!(tree.snapshot(copy).unwrap(), expected);
        assert_links(&tree, root).unwrap();
    }

    /// PROPERTY: `bfclone_many` swaps in one copy per source root, in order,
    /// and detaches whatever the target held before.
    #[test]
    fn property_bfclone_many_replaces_children(source in tree()) {
        let (mut tree, root) = build(&source);
        let holder = tree.add_node(MeldNode::element("holder")).unwrap();
        let old = tree.add_child(holder, MeldNode::element("old")).unwrap();
        let sources = tree.children(root).unwrap().to_vec();

        prop_assert_eq!(tree.bfclone_many(&sources, holder).unwrap(), holder);

        if sources.is_empty() {
            prop_assert_eq!(tree.children(holder).unwrap(), &[old][..]);
        } else {
            let copies = tree.children(holder).unwrap().to_vec();
            prop_assert_eq!(copies.len(), sources.len());
            for (&copy, original) in copies.iter().zip(&source.children) {
                prop_assert_eq!(&tree.snapshot(copy).unwrap(), original);
            }
            prop_assert_eq!(tree.parent(old).unwrap(), None);
        }
        prop_assert_eq!(tree.snapshot(root).unwrap(), source);
        assert_links(&tree, holder).unwrap();
        assert_links(&tree, root).unwrap();
    }

    /// PROPERTY: `set_content` leaves exactly one child and consistent links.
    #[test]
    fn property_set_content_keeps_links(source in tree(), pick in any::<prop::sample::Index>()) {
        let (mut tree, root) = build(&source);
        let ids = tree.flatten(root).unwrap();
        let node = *pick.get(&ids);
        let has_replace_tag = tree.get(node).unwrap().replace_tag.is_some();

        match tree.set_content(node, "filled", false) {
            Ok(child) => {
                prop_assert!(has_replace_tag);
                prop_assert_eq!(tree.children(node).unwrap(), &[child][..]);
                prop_assert_eq!(tree.get(node).unwrap().text.as_deref(), None);
            }
            Err(MeldError::MissingReplaceTag(id)) => {
                prop_assert!(!has_replace_tag);
                prop_assert_eq!(id, node);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
        assert_links(&tree, root).unwrap();
    }
}
