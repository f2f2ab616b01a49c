//! Variable resolution pass.
//!
//! Every scope pushed here corresponds to exactly one frame the evaluator creates at the same
//! point:
//! * a block gets one scope,
//! * a function gets a scope for its parameters and, nested inside, one for its body block,
//! * a `for` loop gets one scope around its initializer, condition, increment and body,
//! * a class gets one object scope holding its fields, its methods and `this`; each method and
//!   the constructor is then resolved like a function nested in that scope.

use std::collections::HashSet;
use std::rc::Rc;

use glint_parser::ast::{
    AssignTarget, ClassDecl, Expr, FunctionDecl, Parsed, Resolved, ResolvedVar, Stmt, VarDecl,
    VarRef,
};
use glint_source::SemanticError;
use glint_value::BuiltinVars;
use tracing::trace;

type Scope = HashSet<String>;

/// Variable resolution pass.
pub struct Resolver {
    /// Scopes that are currently in (lexical) scope. Index `0` is the global scope and is never
    /// popped.
    scopes: Vec<Scope>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn resolve_builtin_vars(&mut self, builtin_vars: &BuiltinVars) {
        for (ident, _value) in &builtin_vars.values {
            self.declare_global(ident);
        }
    }

    pub fn declare_global(&mut self, ident: &str) {
        self.scopes[0].insert(ident.to_string());
    }

    /// Replaces the global scope with `idents`.
    pub fn reset_globals(&mut self, idents: impl IntoIterator<Item = String>) {
        self.scopes.truncate(1);
        self.scopes[0] = idents.into_iter().collect();
    }

    /// Resolves a program. Top-level declarations are added to the global scope and stay there
    /// for subsequent calls.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(&mut self, program: &[Stmt<Parsed>]) -> Result<Vec<Stmt<Resolved>>, SemanticError> {
        let result = self.resolve_stmts(program);
        // an error may leave nested scopes behind
        self.scopes.truncate(1);
        result
    }

    /// Resolves a standalone expression in the global scope.
    pub fn resolve_expr(&mut self, expr: &Expr<Parsed>) -> Result<Expr<Resolved>, SemanticError> {
        let result = self.expr(expr);
        self.scopes.truncate(1);
        result
    }

    fn declare(&mut self, ident: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(ident.to_string());
        }
    }

    /// Runs `f` inside a fresh scope.
    fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        self.scopes.push(Scope::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Counts the scopes between the innermost one and the one declaring `var`.
    fn resolve_var(&self, var: &VarRef) -> Result<ResolvedVar, SemanticError> {
        match self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains(&var.name))
        {
            Some(depth) => {
                trace!(name = %var.name, depth, "resolved variable");
                Ok(ResolvedVar {
                    name: var.name.clone(),
                    depth,
                })
            }
            None => Err(SemanticError::UndefinedVariable {
                name: var.name.clone(),
                position: var.position,
            }),
        }
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt<Parsed>]) -> Result<Vec<Stmt<Resolved>>, SemanticError> {
        stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn stmt(&mut self, stmt: &Stmt<Parsed>) -> Result<Stmt<Resolved>, SemanticError> {
        let stmt = match stmt {
            Stmt::VarDeclaration(decl) => {
                // the initializer cannot see the variable it initializes
                let decl = self.var_decl(decl)?;
                self.declare(&decl.name);
                Stmt::VarDeclaration(decl)
            }
            Stmt::FnDeclaration(decl) => {
                self.declare(&decl.name); // declare first to allow for recursion
                Stmt::FnDeclaration(Rc::new(self.function(decl)?))
            }
            Stmt::ClassDeclaration(decl) => {
                self.declare(&decl.name);
                Stmt::ClassDeclaration(Rc::new(self.class(decl)?))
            }
            Stmt::PrintStmt(expr) => Stmt::PrintStmt(self.expr(expr)?),
            Stmt::ExprStmt(expr) => Stmt::ExprStmt(self.expr(expr)?),
            Stmt::Block(body) => Stmt::Block(self.scoped(|this| this.resolve_stmts(body))?),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => Stmt::If {
                condition: self.expr(condition)?,
                then_branch: Box::new(self.stmt(then_branch)?),
                else_branch: match else_branch {
                    Some(stmt) => Some(Box::new(self.stmt(stmt)?)),
                    None => None,
                },
            },
            Stmt::While { condition, body } => Stmt::While {
                condition: self.expr(condition)?,
                body: Box::new(self.stmt(body)?),
            },
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => self.scoped(|this| {
                Ok(Stmt::For {
                    initializer: match initializer {
                        Some(stmt) => Some(Box::new(this.stmt(stmt)?)),
                        None => None,
                    },
                    condition: this.optional_expr(condition.as_ref())?,
                    increment: this.optional_expr(increment.as_ref())?,
                    body: Box::new(this.stmt(body)?),
                })
            })?,
            Stmt::ReturnStmt(expr) => Stmt::ReturnStmt(self.expr(expr)?),
        };
        Ok(stmt)
    }

    fn var_decl(&mut self, decl: &VarDecl<Parsed>) -> Result<VarDecl<Resolved>, SemanticError> {
        Ok(VarDecl {
            name: decl.name.clone(),
            initializer: self.optional_expr(decl.initializer.as_ref())?,
        })
    }

    /// Resolves parameters and body. The function's own name is declared by the caller.
    fn function(&mut self, decl: &FunctionDecl<Parsed>) -> Result<FunctionDecl<Resolved>, SemanticError> {
        self.scoped(|this| {
            for param in &decl.params {
                this.declare(param);
            }
            let body = this.scoped(|this| this.resolve_stmts(&decl.body))?;
            Ok(FunctionDecl {
                name: decl.name.clone(),
                params: decl.params.clone(),
                body,
            })
        })
    }

    fn class(&mut self, decl: &ClassDecl<Parsed>) -> Result<ClassDecl<Resolved>, SemanticError> {
        if decl.constructors.len() > 1 {
            return Err(SemanticError::MultipleConstructors {
                class: decl.name.clone(),
            });
        }

        self.scoped(|this| {
            // every member is visible to every initializer and method body
            for field in &decl.fields {
                this.declare(&field.name);
            }
            for method in &decl.methods {
                this.declare(&method.name);
            }
            this.declare("this");

            let fields = decl
                .fields
                .iter()
                .map(|field| this.var_decl(field))
                .collect::<Result<Vec<_>, _>>()?;
            let methods = decl
                .methods
                .iter()
                .map(|method| this.function(method).map(Rc::new))
                .collect::<Result<Vec<_>, _>>()?;
            let constructor = match decl.constructor() {
                Some(constructor) => this.function(constructor)?,
                None => FunctionDecl {
                    name: decl.name.clone(),
                    params: Vec::new(),
                    body: Vec::new(),
                },
            };

            Ok(ClassDecl {
                name: decl.name.clone(),
                fields,
                methods,
                constructors: vec![Rc::new(constructor)],
            })
        })
    }

    fn optional_expr(&mut self, expr: Option<&Expr<Parsed>>) -> Result<Option<Expr<Resolved>>, SemanticError> {
        expr.map(|expr| self.expr(expr)).transpose()
    }

    fn expr(&mut self, expr: &Expr<Parsed>) -> Result<Expr<Resolved>, SemanticError> {
        let expr = match expr {
            Expr::Literal(literal) => Expr::Literal(literal.clone()),
            Expr::Variable(var) => Expr::Variable(self.resolve_var(var)?),
            Expr::Unary { op, arg } => Expr::Unary {
                op: *op,
                arg: Box::new(self.expr(arg)?),
            },
            Expr::Binary { lhs, op, rhs } => Expr::Binary {
                lhs: Box::new(self.expr(lhs)?),
                op: *op,
                rhs: Box::new(self.expr(rhs)?),
            },
            Expr::Assign { target, value } => {
                let value = Box::new(self.expr(value)?);
                let target = match target {
                    AssignTarget::Variable(var) if var.name == "this" => {
                        return Err(SemanticError::AssignToThis {
                            position: var.position,
                        })
                    }
                    AssignTarget::Variable(var) => AssignTarget::Variable(self.resolve_var(var)?),
                    AssignTarget::Field { object, name } => AssignTarget::Field {
                        object: Box::new(self.expr(object)?),
                        name: name.clone(),
                    },
                };
                Expr::Assign { target, value }
            }
            Expr::Call { callee, args } => Expr::Call {
                callee: Box::new(self.expr(callee)?),
                args: args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<Result<_, _>>()?,
            },
            // members are looked up in the receiver at runtime
            Expr::Field { object, name } => Expr::Field {
                object: Box::new(self.expr(object)?),
                name: name.clone(),
            },
        };
        Ok(expr)
    }
}
