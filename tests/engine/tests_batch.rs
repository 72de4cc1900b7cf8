//! Parallel batch parsing

use cairo_syntax::{parse, parse_batch};

use crate::helpers::grammars::let_language;

#[test]
fn test_batch_preserves_order() {
    let language = let_language();
    let sources: Vec<Vec<u8>> = (0..32).map(|i| format!("let v = {i};").repeat(i % 5).into_bytes()).collect();
    let inputs: Vec<&[u8]> = sources.iter().map(Vec::as_slice).collect();

    let trees = parse_batch(&language, &inputs);
    assert_eq!(trees.len(), inputs.len());
    for (tree, source) in trees.into_iter().zip(&inputs) {
        let tree = tree.unwrap();
        assert_eq!(tree.len(), source.len());
        assert_eq!(tree, parse(&language, source, None).unwrap());
    }
}

#[test]
fn test_empty_batch() {
    assert!(parse_batch(&let_language(), &[]).is_empty());
}
