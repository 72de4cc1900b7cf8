//! Grammar compilation: rule DSL → BNF productions → LALR(1) parse table.
//!
//! The engine itself only consumes [`ParseTable`]s. This module exists so the
//! bundled Cairo grammar and test grammars can be written declaratively:
//!
//! ```text
//! GrammarBuilder::new("let")
//!     .literal("Let", "let") / .regex("Ident", "[a-z]+") / ...
//!     .rule("Program", repeat(sym("Statement")))
//!     .extra("Whitespace")
//!     .build()?
//! ```
//!
//! Rules and terminals whose name starts with `_` are hidden: they are built
//! as nodes but the tree API looks through them. `repeat` introduces hidden left-recursive helper
//! rules. Conflicts the precedence annotations do not resolve are kept in the
//! table as multi-action entries and handled by generalized parsing.

mod lalr;
mod rules;

pub use rules::{
    Assoc, Precedence, Rule, blank, choice, optional, prec, prec_left, prec_right, repeat, repeat1, sep_by,
    sep_by1, seq, sym, token,
};

use indexmap::IndexMap;
use smol_str::{SmolStr, format_smolstr};

use crate::base::SymbolId;
use crate::error::{Error, Result};
use crate::table::{ParseTable, SymbolKind, SymbolMetadata, TerminalPattern};

/// Builder for a grammar definition.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    name: SmolStr,
    terminals: IndexMap<SmolStr, TerminalPattern>,
    rules: IndexMap<SmolStr, Rule>,
    extras: Vec<SmolStr>,
    start: Option<SmolStr>,
    context_sensitive: bool,
}

impl GrammarBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            terminals: IndexMap::new(),
            rules: IndexMap::new(),
            extras: Vec::new(),
            start: None,
            context_sensitive: false,
        }
    }

    /// Declare a named terminal.
    pub fn terminal(mut self, name: &str, pattern: TerminalPattern) -> Self {
        self.terminals.insert(SmolStr::new(name), pattern);
        self
    }

    /// Declare a named terminal matching exact text.
    pub fn literal(self, name: &str, text: &str) -> Self {
        self.terminal(name, TerminalPattern::Literal(text.to_string()))
    }

    /// Declare a named terminal matching a regular expression.
    pub fn regex(self, name: &str, pattern: &str) -> Self {
        self.terminal(name, TerminalPattern::Regex(pattern.to_string()))
    }

    /// Declare a named terminal supplied by an external scanner.
    pub fn external(self, name: &str) -> Self {
        self.terminal(name, TerminalPattern::External)
    }

    /// Define a rule. The first rule is the start rule unless [`Self::start`] is called.
    pub fn rule(mut self, name: &str, rule: Rule) -> Self {
        self.rules.insert(SmolStr::new(name), rule);
        self
    }

    /// Mark a declared terminal as an extra (allowed between any two tokens).
    pub fn extra(mut self, name: &str) -> Self {
        self.extras.push(SmolStr::new(name));
        self
    }

    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(SmolStr::new(name));
        self
    }

    /// Restrict the lexer to the terminals valid in the current parse state.
    pub fn context_sensitive(mut self, enabled: bool) -> Self {
        self.context_sensitive = enabled;
        self
    }

    /// Compile the grammar into a parse table.
    pub fn build(self) -> Result<ParseTable> {
        let lowered = Lowerer::new(&self)?.lower()?;
        let table = lalr::construct(&self.name, lowered, self.context_sensitive)?;
        tracing::debug!(
            grammar = %self.name,
            states = table.state_count(),
            symbols = table.symbol_count(),
            conflicts = table.conflict_count(),
            "compiled grammar"
        );
        Ok(table)
    }
}

/// A BNF production produced by lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoweredProduction {
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
    pub precedence: Option<Precedence>,
}

/// A grammar flattened into symbols and productions.
#[derive(Debug, Clone)]
pub(crate) struct LoweredGrammar {
    pub symbols: Vec<SymbolMetadata>,
    pub terminal_count: usize,
    pub productions: Vec<LoweredProduction>,
    pub start: SymbolId,
}

#[derive(Debug, Clone)]
struct Alternative {
    symbols: Vec<SymbolId>,
    precedence: Option<Precedence>,
}

struct Lowerer<'g> {
    grammar: &'g GrammarBuilder,
    symbols: Vec<SymbolMetadata>,
    terminal_ids: IndexMap<SmolStr, SymbolId>,
    anonymous_ids: IndexMap<SmolStr, SymbolId>,
    rule_ids: IndexMap<SmolStr, SymbolId>,
    productions: Vec<LoweredProduction>,
    aux_count: usize,
}

impl<'g> Lowerer<'g> {
    fn new(grammar: &'g GrammarBuilder) -> Result<Self> {
        if grammar.rules.is_empty() {
            return Err(Error::grammar("grammar has no rules"));
        }
        let mut lowerer = Self {
            grammar,
            symbols: Vec::new(),
            terminal_ids: IndexMap::new(),
            anonymous_ids: IndexMap::new(),
            rule_ids: IndexMap::new(),
            productions: Vec::new(),
            aux_count: 0,
        };
        lowerer.push_symbol("end", SymbolKind::Terminal, false, false, None);
        lowerer.push_symbol("ERROR", SymbolKind::Terminal, true, true, None);

        for (name, pattern) in &grammar.terminals {
            if grammar.rules.contains_key(name) {
                return Err(Error::grammar(format!("`{name}` is declared as both a terminal and a rule")));
            }
            let hidden = name.starts_with('_');
            let id = lowerer.push_symbol(name, SymbolKind::Terminal, !hidden, !hidden, Some(pattern.clone()));
            lowerer.terminal_ids.insert(name.clone(), id);
        }
        for extra in &grammar.extras {
            let Some(&id) = lowerer.terminal_ids.get(extra) else {
                return Err(Error::grammar(format!("extra `{extra}` is not a declared terminal")));
            };
            lowerer.symbols[id as usize].extra = true;
        }

        let mut anonymous = Vec::new();
        for rule in grammar.rules.values() {
            collect_tokens(rule, &mut anonymous);
        }
        for text in anonymous {
            if !lowerer.anonymous_ids.contains_key(&text) {
                let pattern = TerminalPattern::Literal(text.to_string());
                let id = lowerer.push_symbol(&text, SymbolKind::Terminal, false, true, Some(pattern));
                lowerer.anonymous_ids.insert(text, id);
            }
        }

        for name in grammar.rules.keys() {
            let hidden = name.starts_with('_');
            let id = lowerer.push_symbol(name, SymbolKind::Nonterminal, !hidden, !hidden, None);
            lowerer.rule_ids.insert(name.clone(), id);
        }
        Ok(lowerer)
    }

    fn push_symbol(
        &mut self,
        name: &str,
        kind: SymbolKind,
        named: bool,
        visible: bool,
        pattern: Option<TerminalPattern>,
    ) -> SymbolId {
        let id = self.symbols.len() as SymbolId;
        self.symbols.push(SymbolMetadata { name: SmolStr::new(name), kind, named, visible, extra: false, pattern });
        id
    }

    fn lower(mut self) -> Result<LoweredGrammar> {
        let terminal_count = self.terminal_ids.len() + self.anonymous_ids.len() + 2;
        let grammar = self.grammar;
        for (name, rule) in &grammar.rules {
            let lhs = self.rule_ids[name];
            let alternatives = self.expand(rule, name)?;
            for alternative in alternatives {
                self.productions.push(LoweredProduction {
                    lhs,
                    rhs: alternative.symbols,
                    precedence: alternative.precedence,
                });
            }
        }
        let start_name = match &grammar.start {
            Some(name) => name.clone(),
            None => grammar.rules.keys().next().cloned().unwrap_or_default(),
        };
        let Some(&start) = self.rule_ids.get(&start_name) else {
            return Err(Error::grammar(format!("start rule `{start_name}` is not defined")));
        };
        // The start rule is the tree root and is always visible.
        self.symbols[start as usize].visible = true;
        self.symbols[start as usize].named = true;
        if self.symbols.len() >= SymbolId::MAX as usize {
            return Err(Error::grammar("too many symbols"));
        }
        Ok(LoweredGrammar { symbols: self.symbols, terminal_count, productions: self.productions, start })
    }

    fn resolve(&self, name: &SmolStr) -> Result<SymbolId> {
        self.terminal_ids
            .get(name)
            .or_else(|| self.rule_ids.get(name))
            .copied()
            .ok_or_else(|| Error::grammar(format!("undefined symbol `{name}`")))
    }

    fn expand(&mut self, rule: &Rule, owner: &SmolStr) -> Result<Vec<Alternative>> {
        Ok(match rule {
            Rule::Blank => vec![Alternative { symbols: vec![], precedence: None }],
            Rule::Symbol(name) => vec![Alternative { symbols: vec![self.resolve(name)?], precedence: None }],
            Rule::Token(text) => {
                vec![Alternative { symbols: vec![self.anonymous_ids[text]], precedence: None }]
            }
            Rule::Choice(rules) => {
                let mut alternatives = Vec::new();
                for rule in rules {
                    alternatives.extend(self.expand(rule, owner)?);
                }
                alternatives
            }
            Rule::Seq(rules) => {
                let mut product = vec![Alternative { symbols: vec![], precedence: None }];
                for rule in rules {
                    let parts = self.expand(rule, owner)?;
                    let mut next = Vec::with_capacity(product.len() * parts.len());
                    for prefix in &product {
                        for part in &parts {
                            let mut symbols = prefix.symbols.clone();
                            symbols.extend_from_slice(&part.symbols);
                            next.push(Alternative { symbols, precedence: part.precedence.or(prefix.precedence) });
                        }
                    }
                    product = next;
                }
                product
            }
            Rule::Prec(precedence, inner) => {
                let mut alternatives = self.expand(inner, owner)?;
                for alternative in &mut alternatives {
                    alternative.precedence.get_or_insert(*precedence);
                }
                alternatives
            }
            Rule::Repeat(inner) => {
                let aux = self.repetition(inner, owner)?;
                vec![
                    Alternative { symbols: vec![], precedence: None },
                    Alternative { symbols: vec![aux], precedence: None },
                ]
            }
            Rule::Repeat1(inner) => {
                let aux = self.repetition(inner, owner)?;
                vec![Alternative { symbols: vec![aux], precedence: None }]
            }
        })
    }

    /// `aux -> aux item | item`
    fn repetition(&mut self, inner: &Rule, owner: &SmolStr) -> Result<SymbolId> {
        self.aux_count += 1;
        let name = format_smolstr!("{}_repeat{}", owner.trim_start_matches('_'), self.aux_count);
        let aux = self.push_symbol(&format!("_{name}"), SymbolKind::Nonterminal, false, false, None);
        let items = self.expand(inner, owner)?;
        for item in &items {
            let mut recursive = vec![aux];
            recursive.extend_from_slice(&item.symbols);
            self.productions.push(LoweredProduction { lhs: aux, rhs: recursive, precedence: item.precedence });
        }
        for item in items {
            self.productions.push(LoweredProduction { lhs: aux, rhs: item.symbols, precedence: item.precedence });
        }
        Ok(aux)
    }
}

fn collect_tokens(rule: &Rule, out: &mut Vec<SmolStr>) {
    match rule {
        Rule::Token(text) => out.push(text.clone()),
        Rule::Seq(rules) | Rule::Choice(rules) => rules.iter().for_each(|r| collect_tokens(r, out)),
        Rule::Repeat(inner) | Rule::Repeat1(inner) | Rule::Prec(_, inner) => collect_tokens(inner, out),
        Rule::Blank | Rule::Symbol(_) => {}
    }
}

#[cfg(test)]
mod tests;
