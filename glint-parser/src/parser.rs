//! The grammar, assembled from [`crate::combinator`] rules.
//!
//! ```text
//! program     -> declaration* EOF
//! declaration -> class | fun | var | statement
//! statement   -> print | block | if | while | for | return | expr_stmt
//! expression  -> assignment
//! assignment  -> logic_or ("=" assignment)?   (the left side must be a variable or a field)
//! logic_or    -> logic_and ("or" logic_and)*
//! logic_and   -> equality ("and" equality)*
//! equality    -> comparison (("!=" | "==") comparison)*
//! comparison  -> term ((">" | ">=" | "<" | "<=") term)*
//! term        -> factor (("-" | "+") factor)*
//! factor      -> unary (("/" | "*") unary)*
//! unary       -> ("!" | "-") unary | call
//! call        -> primary ("(" arguments? ")" | "." IDENTIFIER)*
//! primary     -> NUMBER | STRING | "true" | "false" | "nil" | "this" | "(" expression ")" | IDENTIFIER
//! ```

mod expr;
mod stmt;

use glint_source::{Position, SyntaxError};

use crate::ast::{Expr, Parsed, Stmt};
use crate::combinator::{zero_or_more, MatchResult, ParseContext, ParseToken, Rule};
use crate::lexer::{Token, TokenKind};

struct Grammar {
    program: Rule,
    expression: Rule,
}

impl Grammar {
    fn new() -> Self {
        let expression = expr::expression();
        let declaration = stmt::declaration(expression.clone());
        Self {
            program: zero_or_more(declaration),
            expression,
        }
    }
}

thread_local! {
    // Rules are immutable once built, so one grammar serves every parse on the thread.
    static GRAMMAR: Grammar = Grammar::new();
}

/// Parses a whole program. Every token up to and including the end-of-input marker must be
/// consumed.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt<Parsed>>, SyntaxError> {
    let (result, rest) = GRAMMAR.with(|grammar| run(&grammar.program, tokens));
    let declarations = result
        .ok_or_else(|| unexpected(rest))?
        .into_composite()
        .into_iter()
        .map(ParseToken::into_stmt)
        .collect::<Vec<_>>();
    expect_eof(rest)?;
    tracing::debug!(count = declarations.len(), "parsed program");
    Ok(declarations)
}

/// Parses a single expression followed by end-of-input.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_expression(tokens: &[Token]) -> Result<Expr<Parsed>, SyntaxError> {
    let (result, rest) = GRAMMAR.with(|grammar| run(&grammar.expression, tokens));
    let expr = result.ok_or_else(|| unexpected(rest))?.into_expr();
    expect_eof(rest)?;
    Ok(expr)
}

fn run<'t>(rule: &Rule, tokens: &'t [Token]) -> (Option<ParseToken>, ParseContext<'t>) {
    let ctx = ParseContext::new(tokens);
    match rule.parse(ctx) {
        MatchResult::Matched(token, next) => (Some(token), next),
        MatchResult::Unmatched => (None, ctx),
    }
}

fn expect_eof(ctx: ParseContext) -> Result<(), SyntaxError> {
    match ctx.current() {
        Some(Token {
            kind: TokenKind::Eof,
            ..
        }) => Ok(()),
        _ => Err(unexpected(ctx)),
    }
}

/// Raises an unexpected token error at the first unconsumed token.
fn unexpected(ctx: ParseContext) -> SyntaxError {
    match ctx.current() {
        Some(token) => SyntaxError::new(format!("Unexpected {}", token.kind), token.position),
        None => SyntaxError::new("Unexpected end of input", Position::new(1, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignTarget, BinaryOp, Literal, VarDecl};
    use crate::lexer::tokenize;
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> Expr<Parsed> {
        parse_expression(&tokenize(source).unwrap()).unwrap()
    }

    fn program(source: &str) -> Vec<Stmt<Parsed>> {
        parse(&tokenize(source).unwrap()).unwrap()
    }

    fn syntax_error(source: &str) -> SyntaxError {
        parse(&tokenize(source).unwrap()).unwrap_err()
    }

    fn number(val: f64) -> Box<Expr<Parsed>> {
        Box::new(Expr::Literal(Literal::Number(val)))
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("1"), Expr::Literal(Literal::Number(1.0)));
        assert_eq!(expr("2.5"), Expr::Literal(Literal::Number(2.5)));
        assert_eq!(expr("true"), Expr::Literal(Literal::Bool(true)));
        assert_eq!(expr("nil"), Expr::Literal(Literal::Nil));
        assert_eq!(expr("\"hi\""), Expr::Literal(Literal::Str("hi".to_string())));
    }

    #[test]
    fn test_binary_expr() {
        assert_debug_snapshot!(expr("1 + 2"), @r###"
        Binary {
            lhs: Literal(
                Number(
                    1.0,
                ),
            ),
            op: Plus,
            rhs: Literal(
                Number(
                    2.0,
                ),
            ),
        }
        "###);
    }

    #[test]
    fn test_left_associativity() {
        // (2 - 3) - 4
        assert_eq!(
            expr("2 - 3 - 4"),
            Expr::Binary {
                lhs: Box::new(Expr::Binary {
                    lhs: number(2.0),
                    op: BinaryOp::Minus,
                    rhs: number(3.0),
                }),
                op: BinaryOp::Minus,
                rhs: number(4.0),
            }
        );
    }

    #[test]
    fn test_precedence() {
        // 11 + ((-2) * (6 + 5))
        let parsed = expr("11 + (-2) * (6 + 5)");
        match parsed {
            Expr::Binary {
                lhs,
                op: BinaryOp::Plus,
                rhs,
            } => {
                assert_eq!(lhs, number(11.0));
                assert!(matches!(
                    *rhs,
                    Expr::Binary {
                        op: BinaryOp::Star,
                        ..
                    }
                ));
            }
            other => panic!("unexpected tree {:?}", other),
        }

        assert!(matches!(
            expr("a or b and c"),
            Expr::Binary {
                op: BinaryOp::Or,
                ..
            }
        ));
        assert!(matches!(
            expr("1 < 2 == true"),
            Expr::Binary {
                op: BinaryOp::EqualEqual,
                ..
            }
        ));
    }

    #[test]
    fn test_unary_is_right_recursive() {
        assert_debug_snapshot!(expr("!-x"), @r###"
        Unary {
            op: Not,
            arg: Unary {
                op: Negate,
                arg: Variable(
                    VarRef {
                        name: "x",
                        position: Position {
                            line: 1,
                            column: 3,
                        },
                    },
                ),
            },
        }
        "###);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        // a = (b = 1)
        match expr("a = b = 1") {
            Expr::Assign {
                target: AssignTarget::Variable(a),
                value,
            } => {
                assert_eq!(a.name, "a");
                match *value {
                    Expr::Assign {
                        target: AssignTarget::Variable(b),
                        value,
                    } => {
                        assert_eq!(b.name, "b");
                        assert_eq!(value, number(1.0));
                    }
                    other => panic!("unexpected tree {:?}", other),
                }
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_field_assignment() {
        match expr("p.x = 3") {
            Expr::Assign {
                target: AssignTarget::Field { object, name },
                ..
            } => {
                assert!(matches!(*object, Expr::Variable(_)));
                assert_eq!(name, "x");
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        // the statement as a whole fails to match
        let err = syntax_error("a + b = c;");
        assert_eq!(err.message, "Unexpected identifier `a`");
        assert_eq!(err.position, Position::new(1, 1));

        assert!(parse_expression(&tokenize("f() = 1").unwrap()).is_err());
    }

    #[test]
    fn test_deep_nesting_parses_quickly() {
        let depth = 30;
        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let calls = format!("{}x{}", "f(".repeat(depth), ")".repeat(depth));
        let assignments = format!("{}1{}", "(a = ".repeat(depth), ")".repeat(depth));

        let start = std::time::Instant::now();
        assert_eq!(expr(&parens), Expr::Literal(Literal::Number(1.0)));
        assert!(matches!(expr(&calls), Expr::Call { .. }));
        assert!(matches!(expr(&assignments), Expr::Assign { .. }));
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_call_chain() {
        // ((a.b)(1, 2)).c()
        match expr("a.b(1, 2).c()") {
            Expr::Call { callee, args } => {
                assert!(args.is_empty());
                match *callee {
                    Expr::Field { object, name } => {
                        assert_eq!(name, "c");
                        match *object {
                            Expr::Call { callee, args } => {
                                assert_eq!(args.len(), 2);
                                assert!(matches!(*callee, Expr::Field { .. }));
                            }
                            other => panic!("unexpected tree {:?}", other),
                        }
                    }
                    other => panic!("unexpected tree {:?}", other),
                }
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_this_is_a_variable() {
        match expr("this.x") {
            Expr::Field { object, .. } => match *object {
                Expr::Variable(var) => assert_eq!(var.name, "this"),
                other => panic!("unexpected tree {:?}", other),
            },
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_declarations() {
        let stmts = program("var a = 1; var b; fun f(x, y) { return x; } print a;");
        assert_eq!(stmts.len(), 4);
        assert_eq!(
            stmts[0],
            Stmt::VarDeclaration(VarDecl {
                name: "a".to_string(),
                initializer: Some(Expr::Literal(Literal::Number(1.0))),
            })
        );
        assert_eq!(
            stmts[1],
            Stmt::VarDeclaration(VarDecl {
                name: "b".to_string(),
                initializer: None,
            })
        );
        match &stmts[2] {
            Stmt::FnDeclaration(decl) => {
                assert_eq!(decl.name, "f");
                assert_eq!(decl.params, vec!["x".to_string(), "y".to_string()]);
                assert!(matches!(decl.body[..], [Stmt::ReturnStmt(_)]));
            }
            other => panic!("unexpected statement {:?}", other),
        }
        assert!(matches!(stmts[3], Stmt::PrintStmt(_)));
    }

    #[test]
    fn test_return_without_value() {
        let stmts = program("fun f() { return; }");
        match &stmts[0] {
            Stmt::FnDeclaration(decl) => {
                assert_eq!(decl.body, vec![Stmt::ReturnStmt(Expr::Literal(Literal::Nil))]);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_class_members() {
        let stmts = program(
            "class Point {
                var x = 0;
                var y;
                fun Point(a) { this.x = a; }
                fun norm() { return this.x; }
            }",
        );
        match &stmts[0] {
            Stmt::ClassDeclaration(class) => {
                assert_eq!(class.name, "Point");
                let fields: Vec<&str> = class.fields.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(fields, vec!["x", "y"]);
                assert_eq!(class.methods.len(), 1);
                assert_eq!(class.methods[0].name, "norm");
                assert_eq!(class.constructors.len(), 1);
                assert_eq!(class.constructor().unwrap().params, vec!["a".to_string()]);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_control_flow() {
        let stmts = program(
            "if (a) print 1; else { print 2; }
             while (false) a = a + 1;
             for (var i = 0; i < 10; i = i + 1) print i;
             for (;;) {}",
        );
        assert!(matches!(
            stmts[0],
            Stmt::If {
                else_branch: Some(_),
                ..
            }
        ));
        assert!(matches!(stmts[1], Stmt::While { .. }));
        match &stmts[2] {
            Stmt::For {
                initializer: Some(initializer),
                condition: Some(_),
                increment: Some(_),
                ..
            } => assert!(matches!(**initializer, Stmt::VarDeclaration(_))),
            other => panic!("unexpected statement {:?}", other),
        }
        assert!(matches!(
            stmts[3],
            Stmt::For {
                initializer: None,
                condition: None,
                increment: None,
                ..
            }
        ));
    }

    #[test]
    fn test_dangling_else_binds_innermost() {
        let stmts = program("if (a) if (b) print 1; else print 2;");
        match &stmts[0] {
            Stmt::If {
                then_branch,
                else_branch: None,
                ..
            } => assert!(matches!(
                **then_branch,
                Stmt::If {
                    else_branch: Some(_),
                    ..
                }
            )),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_position() {
        let err = syntax_error("print 1;\nprint 2");
        assert_eq!(err.message, "Unexpected `print`");
        assert_eq!(err.position, Position::new(2, 1));

        let err = syntax_error("var x = (1 + 2;");
        assert_eq!(err.position, Position::new(1, 1));

        let err = parse_expression(&tokenize("1 2").unwrap()).unwrap_err();
        assert_eq!(err.message, "Unexpected number `2`");
        assert_eq!(err.position, Position::new(1, 3));
    }

    #[test]
    fn test_super_is_rejected() {
        assert!(parse(&tokenize("super.x;").unwrap()).is_err());
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(program(""), Vec::new());
        assert_eq!(program("// only a comment"), Vec::new());
    }
}
