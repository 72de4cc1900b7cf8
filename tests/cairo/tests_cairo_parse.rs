//! Parsing Cairo source

use cairo_syntax::{Edit, Parser, cairo, parse};
use rstest::rstest;

use crate::helpers::tree_assertions::assert_covers;

fn assert_parses_cleanly(source: &str) {
    let tree = parse(&cairo::language(), source.as_bytes(), None).unwrap();
    assert_covers(&tree, source.as_bytes());
    let diagnostics: Vec<_> = tree.diagnostics().iter().map(|error| error.format()).collect();
    assert!(diagnostics.is_empty(), "{source}\n{}\n{}", tree.to_sexp(), diagnostics.join("\n"));
}

#[rstest]
#[case::empty_function("fn main() {}")]
#[case::tail_expression("fn add(a: felt252, b: felt252) -> felt252 { a + b }")]
#[case::use_paths("use core::array::ArrayTrait;\nuse super::{a, b::c};\nuse starknet::*;")]
#[case::use_alias("use core::integer::u256_from_felt252 as to_u256;")]
#[case::struct_with_attribute("#[derive(Copy, Drop)]\nstruct Point { x: u128, y: u128, }")]
#[case::enum_variants("enum Direction { North, South: u8 }")]
#[case::trait_signature("trait Shape<T> { fn area(self: @T) -> u64; }")]
#[case::impl_block("impl CircleShape of Shape<Circle> { fn area(self: @Circle) -> u64 { *self.radius * 3 } }")]
#[case::method_calls("fn f() { let mut arr = ArrayTrait::new(); arr.append(1); }")]
#[case::if_else("fn f(x: u8) -> u8 { if x > 1 { x } else { 0 } }")]
#[case::match_arms("fn f(v: Option<u8>) -> u8 { match v { Option::Some(x) => x, Option::None => 0, } }")]
#[case::loop_break("fn f() { loop { break; } }")]
#[case::constant("const MAX: u32 = 100_u32;")]
#[case::tuples("fn f() { let t = (1, 'a', \"s\"); let (a, mut b) = t; }")]
#[case::macros("fn f() { assert!(x == 1, 'bad'); }")]
#[case::module("mod tests { #[test] fn it_works() { } }")]
#[case::extern_function("extern fn hash(a: felt252) -> felt252 implicits(Pedersen) nopanic;")]
#[case::nested_generics("fn f() -> Array<Array<u8>> { array![] }")]
#[case::ref_parameter("fn f(ref self: ContractState, amount: u256) { self.balance.write(amount); }")]
#[case::try_and_compound("fn f() { let x = a.b.c(1)?; x += 2; }")]
#[case::type_alias("type Felt = felt252;")]
#[case::while_loop("fn f() { while i < 10 { i += 1; } }")]
#[case::if_let("fn f() -> u8 { if let Option::Some(x) = v { x } else { 0 } }")]
#[case::comments("// entry point\nfn main() {\n    // nothing yet\n}")]
#[case::struct_literal("fn f() -> Point { Point { x: 1, y } }")]
#[case::generic_impl("impl ArrayDrop<T, +Drop<T>> of Drop<Array<T>>;")]
#[case::visibility("pub(crate) fn f() {}\npub struct S { pub a: u8 }")]
#[case::turbofish_path("fn f() { let v = ArrayTrait::<u8>::new(); let w = core::array::ArrayTrait::<u8>::new(); }")]
#[case::turbofish_call("fn f() { let x = into::<u8>(1); }")]
#[case::struct_update("fn f() -> P { P { x: 1, ..Default::default() } }")]
#[case::or_and_negative_patterns("fn f(v: i8) -> u8 { match v { 0 | 1 => 0, -1 => 1, | 2 | 3 => 2, _ => 3, } }")]
#[case::named_arguments("fn f() { g(a: 1, :b, 2); }")]
#[case::slice_pattern("fn f() { let [a, b] = x; }")]
#[case::associated_items("trait Iter<T> { type Item; impl Copy: Copy<T>; fn next(self: T) -> Item; }")]
#[case::extern_type("extern type Pedersen;\npub extern type Box<T>;")]
#[case::inner_attribute("#![allow(unused)]\nfn f() {}")]
#[case::const_generics("fn f<T, const N: u8, +Drop<T>>() {}")]
#[case::doc_comments("/// Entry point.\n/// Does nothing.\nfn main() {\n    /// inner\n    let x = 1;\n}")]
fn test_cairo_source_parses_cleanly(#[case] source: &str) {
    assert_parses_cleanly(source);
}

#[test]
fn test_function_shape() {
    let tree = parse(&cairo::language(), b"fn one() -> u8 { 1 }", None).unwrap();
    assert_eq!(
        tree.to_sexp(),
        "(source_file (function_item (function (identifier) (parameters) (identifier)) (block (numeric_literal))))"
    );
}

#[rstest]
#[case::line_comment("// hi\nlet x = 1;", "line_comment", "// hi")]
#[case::doc_comment("/// hi\nlet x = 1;", "doc_comment", "/// hi")]
fn test_comment_is_a_visible_extra(#[case] source: &str, #[case] kind: &str, #[case] text: &str) {
    let tree = parse(&cairo::language(), source.as_bytes(), None).unwrap();
    let first = tree.root_node().children()[0];
    assert_eq!(first.kind(), kind);
    assert!(first.is_extra());
    assert!(first.is_named());
    assert_eq!(first.utf8_text(source.as_bytes()), Some(text));
}

#[rstest]
#[case("fn main() { let x = ; }")]
#[case("fn main( { }")]
#[case("struct { x: u8 }")]
#[case("fn f() { let x = 1 }")]
#[case("fn f() { $ }")]
#[case("}}}}")]
fn test_cairo_errors_are_contained(#[case] source: &str) {
    let tree = parse(&cairo::language(), source.as_bytes(), None).unwrap();
    assert_covers(&tree, source.as_bytes());
    assert!(tree.root_node().has_error());
    assert!(!tree.diagnostics().is_empty());
}

#[test]
fn test_error_in_one_function_leaves_the_next_intact() {
    let source = b"fn a() { let x = ; }\nfn b() -> u8 { 2 }";
    let tree = parse(&cairo::language(), source, None).unwrap();
    let items = tree.root_node().named_children();
    let last = items.last().unwrap();
    assert_eq!(last.kind(), "function_item");
    assert!(!last.has_error());
    assert_eq!(last.utf8_text(source), Some("fn b() -> u8 { 2 }"));
}

#[test]
fn test_deeply_nested_expression_survives_every_walk() {
    let depth = 5_000;
    let source = format!("fn f() {{ let x = {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    let language = cairo::language();
    let tree = parse(&language, source.as_bytes(), None).unwrap();
    assert!(!tree.root_node().has_error());
    assert_covers(&tree, source.as_bytes());

    let sexp = tree.to_sexp();
    assert_eq!(sexp.matches("(parenthesized_expression").count(), depth);

    let at = source.find('1').unwrap();
    let edit = Edit::replace(source.as_bytes(), at..at + 1, b"2");
    let new_source = edit.apply(source.as_bytes(), b"2");
    let edited = tree.edit(&edit);
    assert!(edited.root_node().has_changes());

    let reparsed = Parser::new(language.clone()).reparse(&edited, &new_source).unwrap();
    assert_eq!(reparsed, parse(&language, &new_source, None).unwrap());
    drop(edited);
    drop(tree);
}

#[test]
fn test_deeply_unclosed_nesting_reports_without_recursion() {
    let source = format!("fn f() {{ let x = {}1; }}", "(".repeat(2_000));
    let tree = parse(&cairo::language(), source.as_bytes(), None).unwrap();
    assert!(tree.root_node().has_error());
    assert!(!tree.diagnostics().is_empty());
    assert_covers(&tree, source.as_bytes());
}
