//! Structural assertions over parsed trees.

use cairo_syntax::Tree;

/// Assert the tree spans `source` and its leaves tile it without gaps.
pub fn assert_covers(tree: &Tree, source: &[u8]) {
    assert_eq!(tree.len(), source.len(), "tree length differs from source for {:?}", String::from_utf8_lossy(source));
    let root = tree.root_node();
    assert_eq!(root.start_byte(), 0);
    assert_eq!(root.end_byte(), source.len());

    let mut expected = 0;
    for leaf in tree.leaves() {
        assert_eq!(leaf.start_byte(), expected, "gap or overlap before {leaf:?}");
        assert!(leaf.end_byte() >= leaf.start_byte());
        expected = leaf.end_byte();
    }
    assert_eq!(expected, source.len());
}

/// Text of every leaf, in order.
pub fn leaf_texts<'s>(tree: &Tree, source: &'s [u8]) -> Vec<&'s str> {
    tree.leaves().iter().map(|leaf| leaf.utf8_text(source).unwrap()).collect()
}
