//! Parser combinators over a token stream.
//!
//! A [`Rule`] is a pure function from a [`ParseContext`] to a [`MatchResult`]. Rules never mutate
//! the context they are given: an unmatched rule leaves the caller exactly where it was, which is
//! what lets [`choice`] try the next alternative from the same position.

use std::cell::OnceCell;
use std::mem;
use std::rc::Rc;

use crate::ast::{Expr, Parsed, Stmt, VarRef};
use crate::lexer::{Token, TokenKind};

/// A cursor into a token list.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'t> {
    tokens: &'t [Token],
    index: usize,
}

impl<'t> ParseContext<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    /// Index of the next unconsumed token.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The next unconsumed token, or `None` once the whole list has been consumed.
    pub fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.index)
    }

    fn advance(self) -> Self {
        Self {
            index: self.index + 1,
            ..self
        }
    }
}

/// A completed AST fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expr(Expr<Parsed>),
    Stmt(Stmt<Parsed>),
}

/// Intermediate parse result passed between rules.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseToken {
    /// A raw token carrying no payload (punctuation, keywords, operators).
    Symbolic(Token),
    Node(Node),
    /// Results of a sequence or repetition, in order.
    Composite(Vec<ParseToken>),
    Optional(Option<Box<ParseToken>>),
}

/// Destructuring helpers for combiners. The grammar fixes the shape of every sub-result, so a
/// mismatch is a bug in the grammar rather than in the program being parsed.
impl ParseToken {
    pub fn into_expr(self) -> Expr<Parsed> {
        match self {
            ParseToken::Node(Node::Expr(expr)) => expr,
            other => unreachable!("invalid grammar: expected expression, found {:?}", other),
        }
    }

    pub fn into_stmt(self) -> Stmt<Parsed> {
        match self {
            ParseToken::Node(Node::Stmt(stmt)) => stmt,
            other => unreachable!("invalid grammar: expected statement, found {:?}", other),
        }
    }

    pub fn into_var(self) -> VarRef {
        match self.into_expr() {
            Expr::Variable(var) => var,
            other => unreachable!("invalid grammar: expected identifier, found {:?}", other),
        }
    }

    pub fn into_symbol(self) -> Token {
        match self {
            ParseToken::Symbolic(token) => token,
            other => unreachable!("invalid grammar: expected token, found {:?}", other),
        }
    }

    pub fn into_composite(self) -> Vec<ParseToken> {
        match self {
            ParseToken::Composite(tokens) => tokens,
            other => unreachable!("invalid grammar: expected composite, found {:?}", other),
        }
    }

    pub fn into_optional(self) -> Option<ParseToken> {
        match self {
            ParseToken::Optional(token) => token.map(|token| *token),
            other => unreachable!("invalid grammar: expected optional, found {:?}", other),
        }
    }
}

impl From<Expr<Parsed>> for ParseToken {
    fn from(expr: Expr<Parsed>) -> Self {
        ParseToken::Node(Node::Expr(expr))
    }
}

impl From<Stmt<Parsed>> for ParseToken {
    fn from(stmt: Stmt<Parsed>) -> Self {
        ParseToken::Node(Node::Stmt(stmt))
    }
}

#[derive(Debug)]
pub enum MatchResult<'t> {
    Matched(ParseToken, ParseContext<'t>),
    Unmatched,
}

type RuleFn = dyn for<'t> Fn(ParseContext<'t>) -> MatchResult<'t>;

#[derive(Clone)]
pub struct Rule(Rc<RuleFn>);

impl Rule {
    pub fn new(f: impl for<'t> Fn(ParseContext<'t>) -> MatchResult<'t> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn parse<'t>(&self, ctx: ParseContext<'t>) -> MatchResult<'t> {
        (self.0)(ctx)
    }

    /// Transforms the result of a successful match.
    pub fn map(self, f: impl Fn(ParseToken) -> ParseToken + 'static) -> Rule {
        Rule::new(move |ctx| match self.parse(ctx) {
            MatchResult::Matched(token, next) => MatchResult::Matched(f(token), next),
            MatchResult::Unmatched => MatchResult::Unmatched,
        })
    }

    /// Like [`Rule::map`], but `f` may reject the match by returning `None`.
    pub fn try_map(self, f: impl Fn(ParseToken) -> Option<ParseToken> + 'static) -> Rule {
        Rule::new(move |ctx| match self.parse(ctx) {
            MatchResult::Matched(token, next) => match f(token) {
                Some(token) => MatchResult::Matched(token, next),
                None => MatchResult::Unmatched,
            },
            MatchResult::Unmatched => MatchResult::Unmatched,
        })
    }
}

/// A rule that can be referenced before it is defined, for mutually recursive grammar rules.
///
/// References handed out by [`Recursive::rule`] are weak; the rule returned by
/// [`Recursive::define`] owns the definition and must outlive every use of those references.
pub struct Recursive(Rc<OnceCell<Rule>>);

impl Recursive {
    pub fn new() -> Self {
        Self(Rc::new(OnceCell::new()))
    }

    /// A rule delegating to whatever [`Recursive::define`] installs.
    pub fn rule(&self) -> Rule {
        // weak, or a definition referring to itself would never be freed
        let cell = Rc::downgrade(&self.0);
        Rule::new(move |ctx| parse_definition(cell.upgrade().as_deref(), ctx))
    }

    /// Installs `rule` as the definition and returns an owning handle to it.
    pub fn define(self, rule: Rule) -> Rule {
        // a second definition is ignored, the first one stays in effect
        let _ = self.0.set(rule);
        let cell = self.0;
        Rule::new(move |ctx| parse_definition(Some(&*cell), ctx))
    }
}

fn parse_definition<'t>(cell: Option<&OnceCell<Rule>>, ctx: ParseContext<'t>) -> MatchResult<'t> {
    match cell.and_then(OnceCell::get) {
        Some(rule) => rule.parse(ctx),
        None => unreachable!("recursive rule used before being defined or after being dropped"),
    }
}

impl Default for Recursive {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches every rule in order. Fails as a whole if any rule fails.
pub fn sequence(rules: Vec<Rule>, combine: impl Fn(Vec<ParseToken>) -> ParseToken + 'static) -> Rule {
    Rule::new(move |ctx| {
        let mut results = Vec::with_capacity(rules.len());
        let mut current = ctx;
        for rule in &rules {
            match rule.parse(current) {
                MatchResult::Matched(token, next) => {
                    results.push(token);
                    current = next;
                }
                MatchResult::Unmatched => return MatchResult::Unmatched,
            }
        }
        MatchResult::Matched(combine(results), current)
    })
}

/// Returns the result of the first alternative that matches.
pub fn choice(rules: Vec<Rule>) -> Rule {
    Rule::new(move |ctx| {
        for rule in &rules {
            if let matched @ MatchResult::Matched(..) = rule.parse(ctx) {
                return matched;
            }
        }
        MatchResult::Unmatched
    })
}

/// Always matches, wrapping the inner result in [`ParseToken::Optional`].
pub fn optional(rule: Rule) -> Rule {
    Rule::new(move |ctx| match rule.parse(ctx) {
        MatchResult::Matched(token, next) => {
            MatchResult::Matched(ParseToken::Optional(Some(Box::new(token))), next)
        }
        MatchResult::Unmatched => MatchResult::Matched(ParseToken::Optional(None), ctx),
    })
}

/// Matches `rule` as many times as possible (possibly zero). Composite results of `rule` are
/// spliced into one flat [`ParseToken::Composite`].
pub fn zero_or_more(rule: Rule) -> Rule {
    Rule::new(move |ctx| {
        let mut results = Vec::new();
        let mut current = ctx;
        loop {
            match rule.parse(current) {
                // A match that consumed nothing would match forever.
                MatchResult::Matched(_, next) if next.index() == current.index() => break,
                MatchResult::Matched(token, next) => {
                    results.push(token);
                    current = next;
                }
                MatchResult::Unmatched => break,
            }
        }
        MatchResult::Matched(flatten(results), current)
    })
}

/// Combiner splicing nested composites into a single composite.
pub fn flatten(tokens: Vec<ParseToken>) -> ParseToken {
    let mut flat = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            ParseToken::Composite(inner) => flat.extend(inner),
            token => flat.push(token),
        }
    }
    ParseToken::Composite(flat)
}

/// Matches one token of the same kind as `kind`, ignoring payloads.
pub fn symbol(kind: TokenKind) -> Rule {
    Rule::new(move |ctx| match ctx.current() {
        Some(token) if mem::discriminant(&token.kind) == mem::discriminant(&kind) => {
            MatchResult::Matched(ParseToken::Symbolic(token.clone()), ctx.advance())
        }
        _ => MatchResult::Unmatched,
    })
}

/// Matches one token for which `f` builds a node.
pub fn node(f: impl Fn(&Token) -> Option<Node> + 'static) -> Rule {
    Rule::new(move |ctx| match ctx.current().and_then(|token| f(token)) {
        Some(node) => MatchResult::Matched(ParseToken::Node(node), ctx.advance()),
        None => MatchResult::Unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn number() -> Rule {
        node(|token| match token.kind {
            TokenKind::Number(val) => Some(Node::Expr(Expr::Literal(Literal::Number(val)))),
            _ => None,
        })
    }

    fn matched_index(rule: &Rule, source: &str) -> Option<usize> {
        let tokens = tokenize(source).unwrap();
        match rule.parse(ParseContext::new(&tokens)) {
            MatchResult::Matched(_, next) => Some(next.index()),
            MatchResult::Unmatched => None,
        }
    }

    #[test]
    fn test_sequence_consumes_all_or_nothing() {
        let rule = sequence(
            vec![number(), symbol(TokenKind::Plus), number()],
            flatten,
        );
        assert_eq!(matched_index(&rule, "1 + 2"), Some(3));
        assert_eq!(matched_index(&rule, "1 + ;"), None);
    }

    #[test]
    fn test_choice_is_ordered() {
        let short = symbol(TokenKind::Minus).map(|_| ParseToken::Composite(Vec::new()));
        let long = sequence(vec![symbol(TokenKind::Minus), number()], flatten);
        let tokens = tokenize("- 1").unwrap();

        match choice(vec![short.clone(), long.clone()]).parse(ParseContext::new(&tokens)) {
            MatchResult::Matched(token, next) => {
                assert_eq!(token, ParseToken::Composite(Vec::new()));
                assert_eq!(next.index(), 1);
            }
            MatchResult::Unmatched => panic!("expected match"),
        }
        match choice(vec![long, short]).parse(ParseContext::new(&tokens)) {
            MatchResult::Matched(_, next) => assert_eq!(next.index(), 2),
            MatchResult::Unmatched => panic!("expected match"),
        }
    }

    #[test]
    fn test_optional_always_matches() {
        let rule = optional(number());
        let tokens = tokenize("x").unwrap();
        match rule.parse(ParseContext::new(&tokens)) {
            MatchResult::Matched(token, next) => {
                assert_eq!(token, ParseToken::Optional(None));
                assert_eq!(next.index(), 0);
            }
            MatchResult::Unmatched => panic!("optional never fails"),
        }
    }

    #[test]
    fn test_zero_or_more_flattens() {
        let pair = sequence(vec![symbol(TokenKind::Plus), number()], flatten);
        let rule = zero_or_more(pair);
        let tokens = tokenize("+ 1 + 2 -").unwrap();
        match rule.parse(ParseContext::new(&tokens)) {
            MatchResult::Matched(token, next) => {
                let items = token.into_composite();
                assert_eq!(items.len(), 4);
                assert!(matches!(items[0], ParseToken::Symbolic(_)));
                assert_eq!(items[1], ParseToken::from(Expr::Literal(Literal::Number(1.0))));
                assert_eq!(items[3], ParseToken::from(Expr::Literal(Literal::Number(2.0))));
                assert_eq!(next.index(), 4);
            }
            MatchResult::Unmatched => panic!("zero_or_more never fails"),
        }
    }

    #[test]
    fn test_zero_or_more_stops_on_empty_match() {
        let rule = zero_or_more(optional(number()));
        assert_eq!(matched_index(&rule, "x"), Some(0));
    }

    #[test]
    fn test_try_map_rejects() {
        let rule = number().try_map(|_| None);
        assert_eq!(matched_index(&rule, "1"), None);
    }

    #[test]
    fn test_recursive_rule() {
        // nested -> "(" nested ")" | NUMBER
        let nested = Recursive::new();
        let paren = sequence(
            vec![symbol(TokenKind::LeftParen), nested.rule(), symbol(TokenKind::RightParen)],
            |mut tokens| tokens.swap_remove(1),
        );
        let rule = nested.define(choice(vec![paren, number()]));
        assert_eq!(matched_index(&rule, "((3))"), Some(5));
        assert_eq!(matched_index(&rule, "((3)"), None);
    }

    #[test]
    fn test_recursive_rule_is_freed() {
        struct DropFlag(Rc<std::cell::Cell<bool>>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(std::cell::Cell::new(false));
        let flag = DropFlag(Rc::clone(&dropped));
        let nested = Recursive::new();
        let paren = sequence(
            vec![symbol(TokenKind::LeftParen), nested.rule(), symbol(TokenKind::RightParen)],
            |mut tokens| tokens.swap_remove(1),
        );
        let leaf = number().map(move |token| {
            let _flag = &flag;
            token
        });
        let rule = nested.define(choice(vec![paren, leaf]));
        assert_eq!(matched_index(&rule, "(1)"), Some(3));
        assert!(!dropped.get());

        drop(rule);
        assert!(dropped.get());
    }
}
