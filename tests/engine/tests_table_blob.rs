//! Loading grammars from table blobs

use cairo_syntax::{Error, Lexeme, load_grammar, parse};
use cairo_syntax::table::{ERROR, TABLE_VERSION, TerminalSet};

use crate::helpers::grammars::let_language;

#[test]
fn test_loaded_grammar_parses_like_the_compiled_one() {
    let language = let_language();
    let loaded = load_grammar(&language.table().to_blob()).unwrap();

    assert_eq!(loaded.name(), language.name());
    assert!(!loaded.ptr_eq(&language));
    for source in ["let x = 1;", "let x = ;", "let a = 1; let b = 2;", "@"] {
        let expected = parse(&language, source.as_bytes(), None).unwrap();
        let actual = parse(&loaded, source.as_bytes(), None).unwrap();
        assert_eq!(actual.to_sexp(), expected.to_sexp(), "{source:?}");
    }
}

#[test]
fn test_future_version_is_rejected() {
    let mut value: serde_json::Value = serde_json::from_slice(&let_language().table().to_blob()).unwrap();
    value["version"] = serde_json::json!(TABLE_VERSION + 1);
    let err = load_grammar(&serde_json::to_vec(&value).unwrap()).unwrap_err();
    assert!(matches!(err, Error::MalformedTable { .. }));
}

#[test]
fn test_truncated_blob_is_rejected() {
    let blob = let_language().table().to_blob();
    let err = load_grammar(&blob[..blob.len() / 2]).unwrap_err();
    assert!(matches!(err, Error::MalformedTable { .. }));
}

#[test]
fn test_caller_supplied_scanner() {
    let language = let_language();
    let table = language.table();
    let names = ["Let", "Ident", "Eq", "Number", "Semi"];
    let ids: Vec<_> = names.iter().map(|name| table.symbol_for_name(name).unwrap()).collect();

    // Every byte is its own token, cycling through the statement's terminals.
    let mut scanner = move |_: &[u8], offset: usize, _: &TerminalSet| Lexeme::new(ids[offset % ids.len()], 1, 1);
    let tree = parse(&language, b"abcde", Some(&mut scanner)).unwrap();
    assert_eq!(tree.to_sexp(), "(Program (Statement (Let) (Ident) (Eq) (Number) (Semi)))");
    assert!(tree.leaves().iter().all(|leaf| leaf.symbol() != ERROR));
}
