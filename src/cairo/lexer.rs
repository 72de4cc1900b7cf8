//! Logos-based scanner for Cairo
//!
//! Tokens are mapped to grammar terminals by name, so the scanner works for
//! any table built from the Cairo grammar.

use std::sync::Arc;

use logos::Logos;

use crate::base::SymbolId;
use crate::lexer::{Lexeme, TokenSource, char_len};
use crate::table::{ParseTable, TerminalSet};

/// Logos token enum - one variant per Cairo terminal
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(source = [u8])]
pub enum CairoToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"///[^\n]*")]
    DocComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    #[regex(
        r"(0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+|[0-9][0-9_]*)(_?(u8|i8|u16|i16|u32|i32|u64|i64|u128|i128|usize|u256|felt252))?"
    )]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\]|\\.)*'(_felt252)?")]
    ShortString,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("as")]
    As,
    #[token("break")]
    Break,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("crate")]
    Crate,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("extern")]
    Extern,
    #[token("false")]
    False,
    #[token("fn")]
    Fn,
    #[token("if")]
    If,
    #[token("impl")]
    Impl,
    #[token("implicits")]
    Implicits,
    #[token("let")]
    Let,
    #[token("loop")]
    Loop,
    #[token("match")]
    Match,
    #[token("mod")]
    Mod,
    #[token("mut")]
    Mut,
    #[token("nopanic")]
    Nopanic,
    #[token("of")]
    Of,
    #[token("pub")]
    Pub,
    #[token("ref")]
    Ref,
    #[token("return")]
    Return,
    #[token("struct")]
    Struct,
    #[token("super")]
    Super,
    #[token("trait")]
    Trait,
    #[token("true")]
    True,
    #[token("type")]
    Type,
    #[token("use")]
    Use,
    #[token("while")]
    While,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("^=")]
    CaretEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token(">=")]
    GtEq,
    #[token("<=")]
    LtEq,
    #[token("..")]
    DotDot,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("=")]
    Eq,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token("@")]
    At,
    #[token("_", priority = 3)]
    Underscore,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("#")]
    Pound,
    #[token("?")]
    Question,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
}

impl CairoToken {
    /// Name of the grammar terminal this token lexes as.
    pub fn grammar_name(self) -> &'static str {
        use CairoToken::*;
        match self {
            Whitespace => "_whitespace",
            LineComment => "line_comment",
            DocComment => "doc_comment",
            Identifier => "identifier",
            Number => "numeric_literal",
            String => "string_literal",
            ShortString => "shortstring_literal",
            As => "as",
            Break => "break",
            Const => "const",
            Continue => "continue",
            Crate => "crate",
            Else => "else",
            Enum => "enum",
            Extern => "extern",
            False => "false",
            Fn => "fn",
            If => "if",
            Impl => "impl",
            Implicits => "implicits",
            Let => "let",
            Loop => "loop",
            Match => "match",
            Mod => "mod",
            Mut => "mut",
            Nopanic => "nopanic",
            Of => "of",
            Pub => "pub",
            Ref => "ref",
            Return => "return",
            Struct => "struct",
            Super => "super",
            Trait => "trait",
            True => "true",
            Type => "type",
            Use => "use",
            While => "while",
            AmpAmp => "&&",
            PipePipe => "||",
            Shl => "<<",
            Shr => ">>",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            CaretEq => "^=",
            AmpEq => "&=",
            PipeEq => "|=",
            EqEq => "==",
            BangEq => "!=",
            GtEq => ">=",
            LtEq => "<=",
            DotDot => "..",
            ColonColon => "::",
            Arrow => "->",
            FatArrow => "=>",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Caret => "^",
            Bang => "!",
            Tilde => "~",
            Amp => "&",
            Pipe => "|",
            Eq => "=",
            Gt => ">",
            Lt => "<",
            At => "@",
            Underscore => "_",
            Dot => ".",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            Pound => "#",
            Question => "?",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
        }
    }

    /// Bytes past a token of `len` bytes the DFA may have read before stopping.
    ///
    /// Literal suffixes such as `_felt252` are only recognized once complete.
    fn lookahead(self, len: usize) -> usize {
        match self {
            CairoToken::Number | CairoToken::ShortString => len + "_felt252".len() + 1,
            _ => len + 1,
        }
    }

    pub fn is_keyword(self) -> bool {
        (CairoToken::As as u8..=CairoToken::While as u8).contains(&(self as u8))
    }
}

/// Scanner for the Cairo grammar.
///
/// The Cairo table lexes context-sensitively. A token the parse state cannot
/// accept is re-read where another reading exists: `>>` closes two generic
/// argument lists as `>` (`Array<Array<u8>>`) and keywords double as
/// identifiers (`let of = 1;`). Anything else becomes an error token, which
/// recovery re-lexes without the restriction.
#[derive(Debug, Clone)]
pub struct CairoScanner {
    table: Arc<ParseTable>,
    identifier: Option<SymbolId>,
    gt: Option<SymbolId>,
}

impl CairoScanner {
    pub fn new(table: Arc<ParseTable>) -> Self {
        let identifier = table.symbol_for_name(CairoToken::Identifier.grammar_name());
        let gt = table.symbol_for_name(CairoToken::Gt.grammar_name());
        Self { table, identifier, gt }
    }

    fn symbol(&self, token: CairoToken) -> Option<SymbolId> {
        let symbol = self.table.symbol_for_name(token.grammar_name()).filter(|id| self.table.is_terminal(*id));
        if symbol.is_none() && token.is_keyword() {
            return self.identifier;
        }
        symbol
    }

    fn reinterpret(&self, token: CairoToken, len: usize, valid: &TerminalSet) -> Lexeme {
        match (token, self.gt, self.identifier) {
            (CairoToken::Shr, Some(gt), _) if valid.contains(gt) => Lexeme::new(gt, 1, len + 1),
            (_, _, Some(identifier)) if token.is_keyword() && valid.contains(identifier) => {
                Lexeme::new(identifier, len, len + 1)
            }
            _ => Lexeme::error(len, len + 1),
        }
    }
}

impl TokenSource for CairoScanner {
    fn next_token(&mut self, source: &[u8], offset: usize, valid: &TerminalSet) -> Lexeme {
        let mut lexer = CairoToken::lexer(&source[offset..]);
        let Some(Ok(token)) = lexer.next() else {
            let len = char_len(source, offset);
            return Lexeme::error(len, len + 1);
        };
        let len = lexer.span().end;

        match self.symbol(token) {
            Some(symbol) if !self.table.is_context_sensitive() || valid.contains(symbol) => {
                Lexeme::new(symbol, len, token.lookahead(len))
            }
            Some(_) => self.reinterpret(token, len, valid),
            None => Lexeme::error(len, len + 1),
        }
    }
}
