//! Cairo grammar definition
//!
//! Covers items (functions, structs, enums, traits, impls, modules, `use`,
//! constants, type aliases, extern types, attributes), statements, patterns,
//! types and the full expression language. Names follow the tree-sitter convention: named
//! nodes are `snake_case`, helper rules start with `_`.

use crate::grammar::{
    GrammarBuilder, Rule, choice, optional, prec, prec_left, prec_right, repeat, sep_by, sep_by1, seq, sym, token,
};

const CALL: i32 = 15;
const FIELD: i32 = 14;
const TRY: i32 = 13;
const UNARY: i32 = 12;
const MULTIPLICATIVE: i32 = 10;
const ADDITIVE: i32 = 9;
const SHIFT: i32 = 8;
const BITAND: i32 = 7;
const BITXOR: i32 = 6;
const BITOR: i32 = 5;
const COMPARATIVE: i32 = 4;
const AND: i32 = 3;
const OR: i32 = 2;
const ASSIGN: i32 = 0;

/// Punctuation allowed inside macro token trees.
const TOKEN_TREE_PUNCTUATION: &[&str] = &[
    "+", "-", "*", "/", "%", "^", "!", "~", "&", "|", "&&", "||", "<<", ">>", "+=", "-=", "*=", "/=", "%=", "^=",
    "&=", "|=", "=", "==", "!=", ">", "<", ">=", "<=", "@", "..", "_", ".", ",", ";", ":", "::", "->", "=>", "#", "?",
];

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "if", "impl", "implicits",
    "let", "loop", "match", "mod", "mut", "nopanic", "of", "pub", "ref", "return", "struct", "super", "trait", "true",
    "type", "use", "while",
];

/// `rule, rule, ...` with an optional trailing comma.
fn comma_list(rule: Rule) -> Rule {
    seq([sep_by(token(","), rule), optional(token(","))])
}

fn delimited(open: &str, inner: Rule, close: &str) -> Rule {
    seq([token(open), inner, token(close)])
}

fn visibility() -> Rule {
    optional(sym("visibility_modifier"))
}

/// Head of a `::` path. Kept free of the `_path` helper so that reaching a
/// `::` never requires a reduction first.
fn path_head() -> Rule {
    choice([sym("identifier"), sym("scoped_identifier"), token("super"), token("crate")])
}

fn binary(value: i32, operators: &[&str]) -> Rule {
    let operator = choice(operators.iter().map(|op| token(op)));
    prec_left(value, seq([sym("_expression"), operator, sym("_expression")]))
}

/// The Cairo grammar, ready to [`build`](GrammarBuilder::build).
pub fn grammar() -> GrammarBuilder {
    let builder = GrammarBuilder::new("cairo")
        .external("identifier")
        .external("numeric_literal")
        .external("string_literal")
        .external("shortstring_literal")
        .external("line_comment")
        .external("doc_comment")
        .external("_whitespace")
        .extra("_whitespace")
        .extra("line_comment")
        .extra("doc_comment")
        .context_sensitive(true)
        .rule("source_file", repeat(sym("_statement")))
        .rule("_statement", choice([sym("expression_statement"), sym("_declaration")]));

    let builder = declarations(builder);
    let builder = paths_and_types(builder);
    let builder = patterns(builder);
    expressions(builder)
}

fn declarations(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule(
            "_declaration",
            choice([
                sym("const_item"),
                sym("attribute_item"),
                sym("inner_attribute_item"),
                sym("mod_item"),
                sym("struct_item"),
                sym("enum_item"),
                sym("type_item"),
                sym("associated_type"),
                sym("extern_type"),
                sym("associated_impl"),
                sym("function_item"),
                sym("function_signature_item"),
                sym("external_function_item"),
                sym("impl_item"),
                sym("trait_item"),
                sym("let_declaration"),
                sym("use_declaration"),
                sym("empty_statement"),
            ]),
        )
        .rule("empty_statement", token(";"))
        .rule(
            "visibility_modifier",
            seq([token("pub"), optional(delimited("(", choice([token("crate"), token("super")]), ")"))]),
        )
        .rule("attribute_item", seq([token("#"), delimited("[", sym("attribute"), "]")]))
        .rule("inner_attribute_item", seq([token("#"), token("!"), delimited("[", sym("attribute"), "]")]))
        .rule("attribute", seq([sym("_path"), optional(sym("token_tree"))]))
        .rule(
            "const_item",
            seq([
                visibility(),
                token("const"),
                sym("identifier"),
                token(":"),
                sym("_type"),
                token("="),
                sym("_expression"),
                token(";"),
            ]),
        )
        .rule(
            "mod_item",
            seq([visibility(), token("mod"), sym("identifier"), choice([token(";"), sym("declaration_list")])]),
        )
        .rule("declaration_list", delimited("{", repeat(sym("_declaration")), "}"))
        .rule(
            "struct_item",
            seq([
                visibility(),
                token("struct"),
                sym("identifier"),
                optional(sym("type_parameters")),
                choice([sym("field_declaration_list"), token(";")]),
            ]),
        )
        .rule("field_declaration_list", delimited("{", comma_list(sym("field_declaration")), "}"))
        .rule("field_declaration", seq([visibility(), sym("identifier"), token(":"), sym("_type")]))
        .rule(
            "enum_item",
            seq([
                visibility(),
                token("enum"),
                sym("identifier"),
                optional(sym("type_parameters")),
                sym("enum_variant_list"),
            ]),
        )
        .rule("enum_variant_list", delimited("{", comma_list(sym("enum_variant")), "}"))
        .rule("enum_variant", seq([sym("identifier"), optional(seq([token(":"), sym("_type")]))]))
        .rule(
            "type_item",
            seq([
                visibility(),
                token("type"),
                sym("identifier"),
                optional(sym("type_parameters")),
                token("="),
                sym("_type"),
                token(";"),
            ]),
        )
        // `type Item;` inside a trait.
        .rule(
            "associated_type",
            seq([token("type"), sym("identifier"), optional(sym("type_parameters")), token(";")]),
        )
        .rule(
            "extern_type",
            seq([
                visibility(),
                token("extern"),
                token("type"),
                sym("identifier"),
                optional(sym("type_parameters")),
                token(";"),
            ]),
        )
        .rule("associated_impl", seq([token("impl"), sym("identifier"), token(":"), sym("_type"), token(";")]))
        .rule("function_item", seq([visibility(), sym("function"), sym("block")]))
        .rule("function_signature_item", seq([visibility(), sym("function"), token(";")]))
        .rule("external_function_item", seq([visibility(), token("extern"), sym("function"), token(";")]))
        .rule(
            "function",
            seq([
                token("fn"),
                sym("identifier"),
                optional(sym("type_parameters")),
                sym("parameters"),
                optional(seq([token("->"), sym("_type")])),
                optional(sym("implicits_clause")),
                optional(token("nopanic")),
            ]),
        )
        .rule("implicits_clause", seq([token("implicits"), delimited("(", sep_by(token(","), sym("_type")), ")")]))
        .rule("parameters", delimited("(", comma_list(sym("parameter")), ")"))
        .rule(
            "parameter",
            seq([
                optional(choice([sym("ref_specifier"), sym("mutable_specifier")])),
                sym("_pattern"),
                token(":"),
                sym("_type"),
            ]),
        )
        .rule("ref_specifier", token("ref"))
        .rule("mutable_specifier", token("mut"))
        .rule(
            "type_parameters",
            delimited(
                "<",
                seq([
                    sep_by1(
                        token(","),
                        choice([sym("identifier"), sym("const_parameter"), sym("constrained_type_parameter")]),
                    ),
                    optional(token(",")),
                ]),
                ">",
            ),
        )
        .rule("const_parameter", seq([token("const"), sym("identifier"), token(":"), sym("_type")]))
        .rule(
            "constrained_type_parameter",
            choice([
                seq([token("impl"), sym("identifier"), token(":"), sym("_type")]),
                seq([choice([token("+"), token("-")]), sym("_type")]),
            ]),
        )
        .rule(
            "impl_item",
            seq([
                visibility(),
                token("impl"),
                sym("identifier"),
                optional(sym("type_parameters")),
                token("of"),
                sym("_type"),
                choice([sym("declaration_list"), token(";")]),
            ]),
        )
        .rule(
            "trait_item",
            seq([
                visibility(),
                token("trait"),
                sym("identifier"),
                optional(sym("type_parameters")),
                choice([sym("declaration_list"), token(";")]),
            ]),
        )
        .rule(
            "let_declaration",
            seq([
                token("let"),
                optional(sym("mutable_specifier")),
                sym("_pattern"),
                optional(seq([token(":"), sym("_type")])),
                token("="),
                sym("_expression"),
                token(";"),
            ]),
        )
        .rule("use_declaration", seq([visibility(), token("use"), sym("_use_clause"), token(";")]))
        .rule(
            "_use_clause",
            choice([sym("_path"), sym("use_as_clause"), sym("scoped_use_list"), sym("use_list"), sym("use_wildcard")]),
        )
        .rule("use_as_clause", seq([sym("_path"), token("as"), sym("identifier")]))
        .rule("use_list", delimited("{", comma_list(sym("_use_clause")), "}"))
        .rule("scoped_use_list", seq([path_head(), token("::"), sym("use_list")]))
        .rule("use_wildcard", seq([path_head(), token("::"), token("*")]))
}

fn paths_and_types(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule("_path", choice([sym("identifier"), sym("scoped_identifier")]))
        .rule(
            "scoped_identifier",
            seq([choice([path_head(), sym("generic_type_with_turbofish")]), token("::"), sym("identifier")]),
        )
        // `ArrayTrait::<u8>` as the head of a longer path. Without a following
        // `::` the same tokens reduce to `generic_function`.
        .rule(
            "generic_type_with_turbofish",
            seq([choice([sym("identifier"), sym("scoped_identifier")]), token("::"), sym("type_arguments")]),
        )
        .rule(
            "_type",
            choice([
                sym("_path"),
                sym("generic_type"),
                sym("tuple_type"),
                sym("unit_type"),
                sym("array_type"),
                sym("snapshot_type"),
            ]),
        )
        .rule("generic_type", seq([sym("_path"), sym("type_arguments")]))
        .rule(
            "type_arguments",
            delimited("<", seq([sep_by1(token(","), sym("_type")), optional(token(","))]), ">"),
        )
        .rule("tuple_type", delimited("(", seq([sep_by1(token(","), sym("_type")), optional(token(","))]), ")"))
        .rule("unit_type", seq([token("("), token(")")]))
        .rule("array_type", delimited("[", seq([sym("_type"), token(";"), sym("_expression")]), "]"))
        .rule("snapshot_type", seq([token("@"), sym("_type")]))
}

fn patterns(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule(
            "_pattern",
            choice([
                sym("identifier"),
                token("_"),
                sym("_literal"),
                sym("scoped_identifier"),
                sym("tuple_pattern"),
                sym("tuple_enum_pattern"),
                sym("struct_pattern"),
                sym("slice_pattern"),
                sym("or_pattern"),
                sym("negative_literal"),
            ]),
        )
        .rule("tuple_pattern", delimited("(", comma_list(choice([sym("_pattern"), sym("mut_pattern")])), ")"))
        .rule("slice_pattern", delimited("[", comma_list(sym("_pattern")), "]"))
        .rule(
            "or_pattern",
            prec_left(-2, choice([seq([sym("_pattern"), token("|"), sym("_pattern")]), seq([token("|"), sym("_pattern")])])),
        )
        .rule("negative_literal", seq([token("-"), sym("numeric_literal")]))
        .rule("mut_pattern", seq([sym("mutable_specifier"), sym("identifier")]))
        .rule("tuple_enum_pattern", seq([sym("_path"), delimited("(", comma_list(sym("_pattern")), ")")]))
        .rule("struct_pattern", seq([sym("_path"), delimited("{", comma_list(sym("field_pattern")), "}")]))
        .rule(
            "field_pattern",
            choice([sym("identifier"), seq([sym("identifier"), token(":"), sym("_pattern")])]),
        )
}

fn expressions(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule(
            "expression_statement",
            choice([
                seq([sym("_expression"), token(";")]),
                prec(1, sym("_expression_ending_with_block")),
            ]),
        )
        .rule(
            "_expression",
            choice([
                sym("_path"),
                sym("generic_function"),
                sym("_literal"),
                sym("binary_expression"),
                sym("unary_expression"),
                sym("reference_expression"),
                sym("call_expression"),
                sym("field_expression"),
                sym("index_expression"),
                sym("try_expression"),
                sym("assignment_expression"),
                sym("compound_assignment_expression"),
                sym("tuple_expression"),
                sym("parenthesized_expression"),
                sym("unit_expression"),
                sym("array_expression"),
                sym("struct_expression"),
                sym("return_expression"),
                sym("break_expression"),
                sym("continue_expression"),
                sym("macro_invocation"),
                prec(0, sym("_expression_ending_with_block")),
            ]),
        )
        .rule(
            "_expression_ending_with_block",
            choice([
                sym("block"),
                sym("if_expression"),
                sym("match_expression"),
                sym("while_expression"),
                sym("loop_expression"),
            ]),
        )
        .rule("_literal", choice([sym("numeric_literal"), sym("string_literal"), sym("shortstring_literal"), sym("boolean_literal")]))
        .rule("boolean_literal", choice([token("true"), token("false")]))
        .rule(
            "generic_function",
            prec(CALL, seq([choice([sym("identifier"), sym("scoped_identifier")]), token("::"), sym("type_arguments")])),
        )
        .rule(
            "binary_expression",
            choice([
                binary(AND, &["&&"]),
                binary(OR, &["||"]),
                binary(BITAND, &["&"]),
                binary(BITOR, &["|"]),
                binary(BITXOR, &["^"]),
                binary(COMPARATIVE, &["==", "!=", "<", "<=", ">", ">="]),
                binary(SHIFT, &["<<", ">>"]),
                binary(ADDITIVE, &["+", "-"]),
                binary(MULTIPLICATIVE, &["*", "/", "%"]),
            ]),
        )
        .rule(
            "unary_expression",
            prec(UNARY, seq([choice(["-", "*", "!", "~", "@"].map(token)), sym("_expression")])),
        )
        .rule("reference_expression", prec(UNARY, seq([token("ref"), sym("_expression")])))
        .rule("call_expression", prec(CALL, seq([sym("_expression"), sym("arguments")])))
        // The opening parenthesis carries call precedence so `a + b(c)` calls `b`.
        .rule(
            "arguments",
            prec(CALL, delimited("(", comma_list(choice([sym("_expression"), sym("named_argument")])), ")")),
        )
        // `name: value`, or `:name` when the argument is a variable of the same name.
        .rule("named_argument", seq([optional(sym("identifier")), token(":"), sym("_expression")]))
        .rule(
            "field_expression",
            prec(FIELD, seq([sym("_expression"), token("."), choice([sym("identifier"), sym("numeric_literal")])])),
        )
        .rule("index_expression", prec(CALL, seq([sym("_expression"), delimited("[", sym("_expression"), "]")])))
        .rule("try_expression", prec(TRY, seq([sym("_expression"), token("?")])))
        .rule("assignment_expression", prec_right(ASSIGN, seq([sym("_expression"), token("="), sym("_expression")])))
        .rule(
            "compound_assignment_expression",
            prec_right(
                ASSIGN,
                seq([sym("_expression"), choice(["+=", "-=", "*=", "/=", "%="].map(token)), sym("_expression")]),
            ),
        )
        .rule(
            "tuple_expression",
            seq([
                token("("),
                sym("_expression"),
                token(","),
                repeat(seq([sym("_expression"), token(",")])),
                optional(sym("_expression")),
                token(")"),
            ]),
        )
        .rule("parenthesized_expression", delimited("(", sym("_expression"), ")"))
        .rule("unit_expression", seq([token("("), token(")")]))
        .rule(
            "array_expression",
            choice([
                delimited("[", comma_list(sym("_expression")), "]"),
                delimited("[", seq([sym("_expression"), token(";"), sym("_expression")]), "]"),
            ]),
        )
        .rule("struct_expression", seq([sym("_path"), sym("field_initializer_list")]))
        .rule(
            "field_initializer_list",
            delimited(
                "{",
                comma_list(choice([sym("field_initializer"), sym("identifier"), sym("base_field_initializer")])),
                "}",
            ),
        )
        .rule("base_field_initializer", seq([token(".."), sym("_expression")]))
        .rule("field_initializer", seq([sym("identifier"), token(":"), sym("_expression")]))
        // After tuple and unary rules: on `return (` the continuing branch ranks first.
        .rule("return_expression", prec_left(ASSIGN, choice([seq([token("return"), sym("_expression")]), token("return")])))
        .rule("break_expression", prec_left(ASSIGN, choice([seq([token("break"), sym("_expression")]), token("break")])))
        .rule("continue_expression", token("continue"))
        .rule("macro_invocation", seq([sym("identifier"), token("!"), sym("token_tree")]))
        .rule(
            "token_tree",
            choice([
                delimited("(", repeat(sym("_token_tree_item")), ")"),
                delimited("[", repeat(sym("_token_tree_item")), "]"),
                delimited("{", repeat(sym("_token_tree_item")), "}"),
            ]),
        )
        .rule("_token_tree_item", token_tree_item())
        .rule(
            "block",
            delimited("{", seq([repeat(sym("_statement")), optional(sym("_expression"))]), "}"),
        )
        .rule(
            "if_expression",
            prec_right(ASSIGN, seq([token("if"), sym("_condition"), sym("block"), optional(sym("else_clause"))])),
        )
        .rule("else_clause", seq([token("else"), choice([sym("block"), sym("if_expression")])]))
        .rule("_condition", choice([sym("_expression"), sym("let_condition")]))
        .rule("let_condition", seq([token("let"), sym("_pattern"), token("="), sym("_expression")]))
        .rule("while_expression", seq([token("while"), sym("_condition"), sym("block")]))
        .rule("loop_expression", seq([token("loop"), sym("block")]))
        .rule("match_expression", seq([token("match"), sym("_expression"), sym("match_block")]))
        .rule("match_block", delimited("{", repeat(sym("match_arm")), "}"))
        .rule(
            "match_arm",
            seq([sym("match_pattern"), token("=>"), sym("_expression"), optional(token(","))]),
        )
        .rule("match_pattern", seq([sym("_pattern"), optional(seq([token("if"), sym("_expression")]))]))
}

fn token_tree_item() -> Rule {
    let mut items = vec![
        sym("token_tree"),
        sym("identifier"),
        sym("numeric_literal"),
        sym("string_literal"),
        sym("shortstring_literal"),
    ];
    items.extend(TOKEN_TREE_PUNCTUATION.iter().map(|text| token(text)));
    items.extend(KEYWORDS.iter().map(|text| token(text)));
    choice(items)
}
