//! Property tests for flattening and meld id search.

use proptest::prelude::*;

use crate::strategy::{build, tree};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A node's flattening is the node followed by the
    /// flattenings of its children.
    #[test]
    fn property_flatten_size_law(source in tree()) {
        let (tree, root) = build(&source);
        let all = tree.flatten(root).unwrap();
        prop_assert_eq!(all.len(), source.node_count());

        for &id in &all {
            let flat = tree.flatten(id).unwrap();
            prop_assert_eq!(flat[0], id);

            let mut expected = vec![id];
            for &child in tree.children(id).unwrap() {
                expected.extend(tree.flatten(child).unwrap());
            }
            prop_assert_eq!(flat, expected);
        }
    }

    /// PROPERTY: Lookup returns the first pre-order carrier of a meld id.
    #[test]
    fn property_find_by_meld_id_is_first_in_preorder(source in tree()) {
        let (tree, root) = build(&source);
        let all = tree.flatten(root).unwrap();

        for &id in &all {
            let Some(meld_id) = tree.meld_id(id).unwrap() else {
                continue;
            };
            let first = all
                .iter()
                .copied()
                .find(|&n| tree.meld_id(n).unwrap() == Some(meld_id));
            prop_assert_eq!(tree.find_by_meld_id(root, meld_id).unwrap(), first);
        }
        prop_assert_eq!(tree.find_by_meld_id(root, "-absent-").unwrap(), None);
    }
}
