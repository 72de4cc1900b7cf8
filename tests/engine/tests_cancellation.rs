//! Cancellation of running parses

use cairo_syntax::{Error, Parser};
use tokio_util::sync::CancellationToken;

use crate::helpers::grammars::let_language;

#[test]
fn test_cancelled_token_aborts_parse() {
    let mut parser = Parser::new(let_language());
    let token = CancellationToken::new();
    parser.set_cancellation_token(Some(token.clone()));
    token.cancel();

    assert_eq!(parser.parse(b"let x = 1;"), Err(Error::Cancelled));
}

#[test]
fn test_live_token_does_not_interfere() {
    let mut parser = Parser::new(let_language());
    parser.set_cancellation_token(Some(CancellationToken::new()));
    assert!(parser.parse(b"let x = 1;").is_ok());

    let tree = parser.parse(b"let x = 1;").unwrap();
    let child = CancellationToken::new().child_token();
    parser.set_cancellation_token(Some(child.clone()));
    child.cancel();
    assert_eq!(parser.reparse(&tree, b"let x = 1;"), Err(Error::Cancelled));

    parser.set_cancellation_token(None);
    assert!(parser.reparse(&tree, b"let x = 1;").is_ok());
}
