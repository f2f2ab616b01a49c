use std::rc::Rc;

use glint_value::{Class, Closure, Function};

use super::*;

impl Interpreter {
    pub(crate) fn exec(&self, stmt: &Stmt<Resolved>, env: &Environment) -> Result<Completion, RuntimeError> {
        match stmt {
            Stmt::VarDeclaration(decl) => {
                let value = match &decl.initializer {
                    Some(initializer) => self.eval(initializer, env)?,
                    None => Value::Nil,
                };
                env.define(decl.name.as_str(), value);
            }
            Stmt::FnDeclaration(decl) => {
                let closure = Closure {
                    decl: Rc::clone(decl),
                    env: env.clone(),
                };
                env.define(
                    decl.name.as_str(),
                    Value::Function(Rc::new(Function::Closure(closure))),
                );
            }
            Stmt::ClassDeclaration(decl) => {
                let class = Class {
                    decl: Rc::clone(decl),
                    env: env.clone(),
                };
                env.define(decl.name.as_str(), Value::Class(Rc::new(class)));
            }
            Stmt::PrintStmt(expr) => {
                let value = self.eval(expr, env)?;
                self.print_handler
                    .println(&value.to_string())
                    .map_err(|err| RuntimeError::Output(err.to_string()))?;
            }
            Stmt::ExprStmt(expr) => {
                self.eval(expr, env)?;
            }
            Stmt::Block(body) => return self.exec_block(body, &env.child()),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.condition(condition, env)? {
                    return self.exec(then_branch, env);
                } else if let Some(else_branch) = else_branch {
                    return self.exec(else_branch, env);
                }
            }
            Stmt::While { condition, body } => {
                while self.condition(condition, env)? {
                    if let completion @ Completion::Return(_) = self.exec(body, env)? {
                        return Ok(completion);
                    }
                }
            }
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                let env = env.child();
                if let Some(initializer) = initializer {
                    self.exec(initializer, &env)?;
                }
                loop {
                    if let Some(condition) = condition {
                        if !self.condition(condition, &env)? {
                            break;
                        }
                    }
                    if let completion @ Completion::Return(_) = self.exec(body, &env)? {
                        return Ok(completion);
                    }
                    if let Some(increment) = increment {
                        self.eval(increment, &env)?;
                    }
                }
            }
            Stmt::ReturnStmt(expr) => return Ok(Completion::Return(self.eval(expr, env)?)),
        }
        Ok(Completion::Normal)
    }

    /// Executes `body` in `env` until a statement returns.
    pub(crate) fn exec_block(
        &self,
        body: &[Stmt<Resolved>],
        env: &Environment,
    ) -> Result<Completion, RuntimeError> {
        for stmt in body {
            if let completion @ Completion::Return(_) = self.exec(stmt, env)? {
                return Ok(completion);
            }
        }
        Ok(Completion::Normal)
    }
}
