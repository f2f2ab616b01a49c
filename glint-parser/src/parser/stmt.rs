use std::rc::Rc;

use super::expr::{identifier, list};
use super::*;
use crate::ast::{ClassDecl, FunctionDecl, Literal, VarDecl};
use crate::combinator::{choice, optional, sequence, symbol, Recursive};

/// Builds the `declaration` rule on top of the `expression` rule.
pub(super) fn declaration(expression: Rule) -> Rule {
    let declaration = Recursive::new();
    let statement = Recursive::new();

    let block = block(declaration.rule());
    let var = var_declaration(expression.clone());
    let fun = fn_declaration(block.clone());

    let statements = vec![
        print_stmt(expression.clone()),
        block,
        if_stmt(expression.clone(), statement.rule()),
        while_stmt(expression.clone(), statement.rule()),
        for_stmt(expression.clone(), var.clone(), statement.rule()),
        return_stmt(expression.clone()),
        expr_stmt(expression),
    ];
    let stmt = statement.define(choice(statements));
    let class = class_declaration(var.clone(), fun.clone());

    declaration.define(choice(vec![class, fun, var, stmt]))
}

/// Unwraps an `Optional` holding an expression.
fn optional_expr(token: ParseToken) -> Option<Expr<Parsed>> {
    token.into_optional().map(ParseToken::into_expr)
}

fn expr_stmt(expression: Rule) -> Rule {
    sequence(
        vec![expression, symbol(TokenKind::Semicolon)],
        |mut tokens| Stmt::ExprStmt(tokens.swap_remove(0).into_expr()).into(),
    )
}

fn print_stmt(expression: Rule) -> Rule {
    sequence(
        vec![
            symbol(TokenKind::Print),
            expression,
            symbol(TokenKind::Semicolon),
        ],
        |mut tokens| Stmt::PrintStmt(tokens.swap_remove(1).into_expr()).into(),
    )
}

fn return_stmt(expression: Rule) -> Rule {
    sequence(
        vec![
            symbol(TokenKind::Return),
            optional(expression),
            symbol(TokenKind::Semicolon),
        ],
        |mut tokens| {
            let value = optional_expr(tokens.swap_remove(1)).unwrap_or(Expr::Literal(Literal::Nil));
            Stmt::ReturnStmt(value).into()
        },
    )
}

fn block(declaration: Rule) -> Rule {
    sequence(
        vec![
            symbol(TokenKind::LeftBrace),
            zero_or_more(declaration),
            symbol(TokenKind::RightBrace),
        ],
        |mut tokens| {
            let body = tokens
                .swap_remove(1)
                .into_composite()
                .into_iter()
                .map(ParseToken::into_stmt)
                .collect();
            Stmt::Block(body).into()
        },
    )
}

fn if_stmt(expression: Rule, statement: Rule) -> Rule {
    let else_branch = sequence(
        vec![symbol(TokenKind::Else), statement.clone()],
        |mut tokens| tokens.swap_remove(1),
    );
    sequence(
        vec![
            symbol(TokenKind::If),
            symbol(TokenKind::LeftParen),
            expression,
            symbol(TokenKind::RightParen),
            statement,
            optional(else_branch),
        ],
        |tokens| {
            let mut parts = tokens.into_iter().skip(2);
            match (parts.next(), parts.nth(1), parts.next()) {
                (Some(condition), Some(then_branch), Some(else_branch)) => Stmt::If {
                    condition: condition.into_expr(),
                    then_branch: Box::new(then_branch.into_stmt()),
                    else_branch: else_branch
                        .into_optional()
                        .map(|stmt| Box::new(stmt.into_stmt())),
                }
                .into(),
                _ => unreachable!("invalid grammar: if"),
            }
        },
    )
}

fn while_stmt(expression: Rule, statement: Rule) -> Rule {
    sequence(
        vec![
            symbol(TokenKind::While),
            symbol(TokenKind::LeftParen),
            expression,
            symbol(TokenKind::RightParen),
            statement,
        ],
        |mut tokens| {
            let body = tokens.swap_remove(4).into_stmt();
            let condition = tokens.swap_remove(2).into_expr();
            Stmt::While {
                condition,
                body: Box::new(body),
            }
            .into()
        },
    )
}

/// `for (initializer condition? ; increment?) statement` where `initializer` is a variable
/// declaration, an expression statement, or a lone `;`.
fn for_stmt(expression: Rule, var: Rule, statement: Rule) -> Rule {
    let initializer = choice(vec![
        var,
        expr_stmt(expression.clone()),
        symbol(TokenKind::Semicolon).map(|_| ParseToken::Optional(None)),
    ]);
    sequence(
        vec![
            symbol(TokenKind::For),
            symbol(TokenKind::LeftParen),
            initializer,
            optional(expression.clone()),
            symbol(TokenKind::Semicolon),
            optional(expression),
            symbol(TokenKind::RightParen),
            statement,
        ],
        |tokens| {
            let mut parts = tokens.into_iter().skip(2);
            match (
                parts.next(),
                parts.next(),
                parts.nth(1),
                parts.nth(1),
            ) {
                (Some(initializer), Some(condition), Some(increment), Some(body)) => Stmt::For {
                    initializer: match initializer {
                        ParseToken::Optional(None) => None,
                        stmt => Some(Box::new(stmt.into_stmt())),
                    },
                    condition: optional_expr(condition),
                    increment: optional_expr(increment),
                    body: Box::new(body.into_stmt()),
                }
                .into(),
                _ => unreachable!("invalid grammar: for"),
            }
        },
    )
}

fn var_declaration(expression: Rule) -> Rule {
    let initializer = sequence(
        vec![symbol(TokenKind::Equal), expression],
        |mut tokens| tokens.swap_remove(1),
    );
    sequence(
        vec![
            symbol(TokenKind::Var),
            identifier(),
            optional(initializer),
            symbol(TokenKind::Semicolon),
        ],
        |mut tokens| {
            let initializer = optional_expr(tokens.swap_remove(2));
            let name = tokens.swap_remove(1).into_var().name;
            Stmt::VarDeclaration(VarDecl { name, initializer }).into()
        },
    )
}

fn fn_declaration(block: Rule) -> Rule {
    sequence(
        vec![
            symbol(TokenKind::Fun),
            identifier(),
            symbol(TokenKind::LeftParen),
            optional(list(identifier())),
            symbol(TokenKind::RightParen),
            block,
        ],
        |mut tokens| {
            let body = match tokens.swap_remove(5).into_stmt() {
                Stmt::Block(body) => body,
                other => unreachable!("invalid grammar: function body {:?}", other),
            };
            let params = tokens
                .swap_remove(3)
                .into_optional()
                .map(ParseToken::into_composite)
                .unwrap_or_default()
                .into_iter()
                .map(|param| param.into_var().name)
                .collect();
            let name = tokens.swap_remove(1).into_var().name;
            Stmt::FnDeclaration(Rc::new(FunctionDecl { name, params, body })).into()
        },
    )
}

/// Class members are `var` fields and `fun` methods. The method named after the class is its
/// constructor.
fn class_declaration(var: Rule, fun: Rule) -> Rule {
    sequence(
        vec![
            symbol(TokenKind::Class),
            identifier(),
            symbol(TokenKind::LeftBrace),
            zero_or_more(choice(vec![var, fun])),
            symbol(TokenKind::RightBrace),
        ],
        |mut tokens| {
            let members = tokens.swap_remove(3).into_composite();
            let name = tokens.swap_remove(1).into_var().name;
            let mut class = ClassDecl {
                name,
                fields: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
            };
            for member in members {
                match member.into_stmt() {
                    Stmt::VarDeclaration(field) => class.fields.push(field),
                    Stmt::FnDeclaration(method) if method.name == class.name => {
                        class.constructors.push(method)
                    }
                    Stmt::FnDeclaration(method) => class.methods.push(method),
                    other => unreachable!("invalid grammar: class member {:?}", other),
                }
            }
            Stmt::ClassDeclaration(Rc::new(class)).into()
        },
    )
}
