use super::*;
use crate::ast::{AssignTarget, BinaryOp, Literal, UnaryOp, VarRef};
use crate::combinator::{choice, flatten, node, optional, sequence, symbol, Node, Recursive};

/// Builds the `expression` rule.
pub(super) fn expression() -> Rule {
    let expression = Recursive::new();
    let unary = Recursive::new();

    let call = call(primary(expression.rule()), expression.rule());
    let prefix = sequence(
        vec![
            choice(vec![symbol(TokenKind::Bang), symbol(TokenKind::Minus)]),
            unary.rule(),
        ],
        |mut tokens| {
            let arg = tokens.pop().map(ParseToken::into_expr);
            let op = tokens.pop().map(ParseToken::into_symbol);
            match (op, arg) {
                (Some(op), Some(arg)) => Expr::Unary {
                    op: unary_op(&op),
                    arg: Box::new(arg),
                }
                .into(),
                _ => unreachable!("invalid grammar: unary"),
            }
        },
    );
    let unary = unary.define(choice(vec![prefix, call]));

    let factor = binary(unary, &[TokenKind::Slash, TokenKind::Star]);
    let term = binary(factor, &[TokenKind::Minus, TokenKind::Plus]);
    let comparison = binary(
        term,
        &[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ],
    );
    let equality = binary(comparison, &[TokenKind::BangEqual, TokenKind::EqualEqual]);
    let logic_and = binary(equality, &[TokenKind::And]);
    let logic_or = binary(logic_and, &[TokenKind::Or]);

    // `logic_or ("=" assignment)?`, so the left-hand side is only parsed once
    let value = sequence(
        vec![symbol(TokenKind::Equal), expression.rule()],
        |mut tokens| tokens.swap_remove(1),
    );
    let assignment = sequence(vec![logic_or, optional(value)], ParseToken::Composite).try_map(
        |token| {
            let mut parts = token.into_composite().into_iter();
            let lhs = parts.next()?.into_expr();
            let value = match parts.next()?.into_optional() {
                Some(value) => Box::new(value.into_expr()),
                None => return Some(lhs.into()),
            };
            let target = match lhs {
                Expr::Variable(var) => AssignTarget::Variable(var),
                Expr::Field { object, name } => AssignTarget::Field { object, name },
                // not an assignable place
                _ => return None,
            };
            Some(Expr::Assign { target, value }.into())
        },
    );

    expression.define(assignment)
}

/// `operand (operator operand)*`, folded to the left.
fn binary(operand: Rule, operators: &[TokenKind]) -> Rule {
    let operator = choice(operators.iter().cloned().map(symbol).collect());
    sequence(
        vec![
            operand.clone(),
            zero_or_more(sequence(vec![operator, operand], flatten)),
        ],
        flatten,
    )
    .map(|token| {
        let mut parts = token.into_composite().into_iter();
        let mut lhs = match parts.next() {
            Some(first) => first.into_expr(),
            None => unreachable!("invalid grammar: binary operand"),
        };
        while let (Some(op), Some(rhs)) = (parts.next(), parts.next()) {
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op: binary_op(&op.into_symbol()),
                rhs: Box::new(rhs.into_expr()),
            };
        }
        lhs.into()
    })
}

/// `primary ("(" arguments? ")" | "." IDENTIFIER)*`
fn call(primary: Rule, expression: Rule) -> Rule {
    // argument lists are kept as `Optional` so that `zero_or_more` does not splice them
    let arguments = sequence(
        vec![
            symbol(TokenKind::LeftParen),
            optional(list(expression)),
            symbol(TokenKind::RightParen),
        ],
        |mut tokens| tokens.swap_remove(1),
    );
    let member = sequence(vec![symbol(TokenKind::Dot), identifier()], |mut tokens| {
        tokens.swap_remove(1)
    });

    sequence(
        vec![primary, zero_or_more(choice(vec![arguments, member]))],
        |mut tokens| {
            let suffixes = tokens.pop().map(ParseToken::into_composite);
            let callee = tokens.pop().map(ParseToken::into_expr);
            let (mut expr, suffixes) = match (callee, suffixes) {
                (Some(callee), Some(suffixes)) => (callee, suffixes),
                _ => unreachable!("invalid grammar: call"),
            };
            for suffix in suffixes {
                expr = match suffix {
                    ParseToken::Optional(args) => Expr::Call {
                        callee: Box::new(expr),
                        args: args
                            .map(|args| (*args).into_composite())
                            .unwrap_or_default()
                            .into_iter()
                            .map(ParseToken::into_expr)
                            .collect(),
                    },
                    member => Expr::Field {
                        object: Box::new(expr),
                        name: member.into_var().name,
                    },
                };
            }
            expr.into()
        },
    )
}

fn primary(expression: Rule) -> Rule {
    let literal = node(|token| {
        let literal = match &token.kind {
            TokenKind::Number(val) => Literal::Number(*val),
            TokenKind::Str(val) => Literal::Str(val.clone()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Nil => Literal::Nil,
            _ => return None,
        };
        Some(Node::Expr(Expr::Literal(literal)))
    });
    let this = node(|token| match token.kind {
        TokenKind::This => Some(Node::Expr(Expr::Variable(VarRef {
            name: "this".to_string(),
            position: token.position,
        }))),
        _ => None,
    });
    let grouping = sequence(
        vec![
            symbol(TokenKind::LeftParen),
            expression,
            symbol(TokenKind::RightParen),
        ],
        |mut tokens| tokens.swap_remove(1),
    );

    choice(vec![literal, this, grouping, identifier()])
}

/// An identifier, as an unresolved [`Expr::Variable`].
pub(super) fn identifier() -> Rule {
    node(|token| match &token.kind {
        TokenKind::Identifier(name) => Some(Node::Expr(Expr::Variable(VarRef {
            name: name.clone(),
            position: token.position,
        }))),
        _ => None,
    })
}

/// `item ("," item)*`, as a flat composite of items.
pub(super) fn list(item: Rule) -> Rule {
    sequence(
        vec![
            item.clone(),
            zero_or_more(sequence(vec![symbol(TokenKind::Comma), item], |mut tokens| {
                tokens.swap_remove(1)
            })),
        ],
        flatten,
    )
}

fn unary_op(token: &Token) -> UnaryOp {
    match UnaryOp::from_token(&token.kind) {
        Some(op) => op,
        None => unreachable!("invalid grammar: {} is not a unary operator", token.kind),
    }
}

fn binary_op(token: &Token) -> BinaryOp {
    match BinaryOp::from_token(&token.kind) {
        Some(op) => op,
        None => unreachable!("invalid grammar: {} is not a binary operator", token.kind),
    }
}
