//! Declarative rule combinators.
//!
//! ```text
//! statement: seq(sym("Let"), sym("Ident"), sym("Eq"), sym("Number"), sym("Semi"))
//! binary:    prec_left(10, seq(sym("expr"), token("*"), sym("expr")))
//! ```

use smol_str::SmolStr;

/// Associativity used to resolve shift/reduce conflicts at equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    None,
    Left,
    Right,
}

/// Precedence attached to a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub value: i32,
    pub assoc: Assoc,
}

/// A grammar rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Matches nothing.
    Blank,
    /// Reference to a named terminal or rule.
    Symbol(SmolStr),
    /// Anonymous literal token, e.g. `"fn"`.
    Token(SmolStr),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    Repeat(Box<Rule>),
    Repeat1(Box<Rule>),
    Prec(Precedence, Box<Rule>),
}

pub fn sym(name: &str) -> Rule {
    Rule::Symbol(SmolStr::new(name))
}

pub fn token(text: &str) -> Rule {
    Rule::Token(SmolStr::new(text))
}

pub fn blank() -> Rule {
    Rule::Blank
}

pub fn seq<I: IntoIterator<Item = Rule>>(rules: I) -> Rule {
    Rule::Seq(rules.into_iter().collect())
}

pub fn choice<I: IntoIterator<Item = Rule>>(rules: I) -> Rule {
    Rule::Choice(rules.into_iter().collect())
}

pub fn optional(rule: Rule) -> Rule {
    Rule::Choice(vec![rule, Rule::Blank])
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

pub fn repeat1(rule: Rule) -> Rule {
    Rule::Repeat1(Box::new(rule))
}

pub fn prec(value: i32, rule: Rule) -> Rule {
    Rule::Prec(Precedence { value, assoc: Assoc::None }, Box::new(rule))
}

pub fn prec_left(value: i32, rule: Rule) -> Rule {
    Rule::Prec(Precedence { value, assoc: Assoc::Left }, Box::new(rule))
}

pub fn prec_right(value: i32, rule: Rule) -> Rule {
    Rule::Prec(Precedence { value, assoc: Assoc::Right }, Box::new(rule))
}

/// `rule (sep rule)*`
pub fn sep_by1(sep: Rule, rule: Rule) -> Rule {
    seq([rule.clone(), repeat(seq([sep, rule]))])
}

/// `(rule (sep rule)*)?`
pub fn sep_by(sep: Rule, rule: Rule) -> Rule {
    optional(sep_by1(sep, rule))
}
