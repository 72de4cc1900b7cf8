//! Incremental reparsing of Cairo source

use cairo_syntax::{Edit, Parser, cairo, parse};
use rstest::rstest;

use crate::helpers::tree_assertions::assert_covers;

const SOURCE: &str = "fn a() -> u8 {\n    let x = 1;\n    x\n}\n\nfn b(y: u8) -> u8 {\n    y * 2\n}\n";

#[rstest]
#[case::change_literal("1", "42")]
#[case::rename_parameter("y: u8", "z: u8")]
#[case::break_syntax("let x = 1;", "let x = ;")]
#[case::insert_item("\n\nfn b", "\n\nfn c() {}\n\nfn b")]
#[case::widen_type("-> u8 {\n    y", "-> u128 {\n    y")]
fn test_cairo_reparse_equals_fresh_parse(#[case] find: &str, #[case] replace: &str) {
    let language = cairo::language();
    let mut parser = Parser::new(language.clone());
    let old_source = SOURCE.as_bytes();
    let old = parser.parse(old_source).unwrap();

    let start = SOURCE.find(find).unwrap();
    let edit = Edit::replace(old_source, start..start + find.len(), replace.as_bytes());
    let new_source = edit.apply(old_source, replace.as_bytes());
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();

    assert_eq!(new, parse(&language, &new_source, None).unwrap());
    assert_covers(&new, &new_source);
}

#[test]
fn test_untouched_function_is_reused() {
    let language = cairo::language();
    let mut parser = Parser::new(language);
    let old_source = SOURCE.as_bytes();
    let old = parser.parse(old_source).unwrap();

    let start = SOURCE.find("y * 2").unwrap();
    let edit = Edit::replace(old_source, start + 4..start + 5, b"3");
    let new_source = edit.apply(old_source, b"3");
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();

    let old_first = old.root_node().named_children()[0];
    let new_first = new.root_node().named_children()[0];
    assert_eq!(new_first.kind(), "function_item");
    assert!(new_first.green().ptr_eq(old_first.green()));
}

const BROKEN: &str = "use core::array::ArrayTrait;\nstruct P { x: u8, y: Array<Arraylet y = 2;8>> }\nfn main() {}\n";

#[rstest]
#[case::open_brace_in_use_path(2..4, "{")]
#[case::edit_function_name(BROKEN.find("main").unwrap()..BROKEN.find("main").unwrap() + 4, "start")]
#[case::insert_before_struct(29..29, "const C: u8 = 1;\n")]
#[case::edit_inside_error(BROKEN.find("2;8").unwrap()..BROKEN.find("2;8").unwrap() + 1, "3")]
fn test_cairo_reparse_of_broken_source_equals_fresh_parse(#[case] range: std::ops::Range<usize>, #[case] text: &str) {
    let language = cairo::language();
    let mut parser = Parser::new(language.clone());
    let old_source = BROKEN.as_bytes();
    let old = parser.parse(old_source).unwrap();
    assert!(old.root_node().has_error());

    let edit = Edit::replace(old_source, range, text.as_bytes());
    let new_source = edit.apply(old_source, text.as_bytes());
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();
    let fresh = parse(&language, &new_source, None).unwrap();

    assert_eq!(new.to_sexp(), fresh.to_sexp());
    assert_eq!(new, fresh);
    assert_covers(&new, &new_source);
}

#[test]
fn test_error_far_from_edit_still_matches_fresh_parse() {
    let source = "fn a() -> u8 {\n    let x = ;\n    x\n}\n\nfn b(y: u8) -> u8 {\n    y * 2\n}\n";
    let language = cairo::language();
    let mut parser = Parser::new(language.clone());
    let old = parser.parse(source.as_bytes()).unwrap();

    let start = source.find("y * 2").unwrap();
    let edit = Edit::replace(source.as_bytes(), start + 4..start + 5, b"3");
    let new_source = edit.apply(source.as_bytes(), b"3");
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();

    assert_eq!(new, parse(&language, &new_source, None).unwrap());
    assert_eq!(new.diagnostics().len(), old.diagnostics().len());
}
