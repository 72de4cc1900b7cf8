#![allow(clippy::unwrap_used)]

use super::*;
use crate::base::{Point, TextSize};
use crate::grammar::{GrammarBuilder, repeat, sym};
use crate::table::ParseTable;

fn words() -> ParseTable {
    GrammarBuilder::new("words")
        .regex("Word", "[a-z]+")
        .regex("Whitespace", "[ \n]+")
        .rule("Root", repeat(sym("Word")))
        .extra("Whitespace")
        .build()
        .unwrap()
}

#[test]
fn test_tokens_carry_points() {
    let table = words();
    let mut lexer = TableLexer::new(&table).unwrap();
    let source = b"ab\n  cd";
    let mut adapter = LexerAdapter::new(source, &mut lexer, table.terminal_count());

    let mut at = Length::ZERO;
    let mut tokens = Vec::new();
    loop {
        let token = adapter.lex(at, table.all_terminals());
        tokens.push(token);
        if token.is_eof() {
            break;
        }
        at = token.end();
    }

    let names: Vec<_> = tokens.iter().map(|t| table.symbol_name(t.symbol)).collect();
    assert_eq!(names, vec!["Word", "Whitespace", "Word", "end"]);
    assert_eq!(tokens[2].start.extent, Point::new(1, 2));
    assert_eq!(tokens[2].start.bytes, TextSize::new(5));
    assert_eq!(tokens[3].start.offset(), source.len());
}

#[test]
fn test_unrecognized_bytes_merge_into_one_error_token() {
    let table = words();
    let mut lexer = TableLexer::new(&table).unwrap();
    let source = "ab 12€3 cd".as_bytes();
    let mut adapter = LexerAdapter::new(source, &mut lexer, table.terminal_count());

    let token = adapter.lex(Length::of(b"ab "), table.all_terminals());
    assert_eq!(token.symbol, ERROR);
    assert_eq!(token.len.offset(), "12€3".len());
}

#[test]
fn test_closure_scanner_and_progress_guard() {
    let table = words();
    let word = table.symbol_for_name("Word").unwrap();
    // A broken scanner that never advances.
    let mut stuck = move |_: &[u8], _: usize, _: &TerminalSet| Lexeme::new(word, 0, 0);
    let mut adapter = LexerAdapter::new(b"abc", &mut stuck, table.terminal_count());

    let token = adapter.lex(Length::ZERO, table.all_terminals());
    assert_eq!(token.symbol, ERROR);
    assert_eq!(token.len.offset(), 3);
}

#[test]
fn test_lookahead_past_token_end() {
    let table = words();
    let mut lexer = TableLexer::new(&table).unwrap();
    let mut adapter = LexerAdapter::new(b"ab cd", &mut lexer, table.terminal_count());

    let token = adapter.lex(Length::ZERO, table.all_terminals());
    assert_eq!(token.lookahead, 1);
    assert_eq!(token.reach(), 3);
}

#[test]
fn test_char_len_handles_multibyte_and_bounds() {
    let source = "a€".as_bytes();
    assert_eq!(char_len(source, 0), 1);
    assert_eq!(char_len(source, 1), 3);
    assert_eq!(char_len(&source[..2], 1), 1);
    assert_eq!(char_len(source, 10), 0);
}
