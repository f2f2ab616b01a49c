use std::rc::Rc;

use glint_parser::ast::{AssignTarget, BinaryOp, Literal, ResolvedVar};
use glint_value::{Class, Closure, EnvError, Function, Object};
use tracing::{debug, trace};

use super::*;
use crate::operators;
use crate::InternalError;

impl Interpreter {
    pub(crate) fn eval(&self, expr: &Expr<Resolved>, env: &Environment) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Variable(var) => lookup(var, env),
            Expr::Unary { op, arg } => operators::unary(*op, &self.eval(arg, env)?),
            Expr::Binary { lhs, op, rhs } if op.is_logical() => {
                let lhs = self.condition(lhs, env)?;
                let short_circuit = if *op == BinaryOp::Or { lhs } else { !lhs };
                if short_circuit {
                    Ok(Value::Bool(lhs))
                } else {
                    Ok(Value::Bool(self.condition(rhs, env)?))
                }
            }
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.eval(lhs, env)?;
                let rhs = self.eval(rhs, env)?;
                operators::binary(*op, &lhs, &rhs)
            }
            Expr::Assign { target, value } => {
                let value = self.eval(value, env)?;
                match target {
                    AssignTarget::Variable(var) => env
                        .assign_at(var.depth, &var.name, value.clone())
                        .map_err(|source| internal(var, source))?,
                    AssignTarget::Field { object, name } => {
                        let object = self.object(object, env)?;
                        object
                            .env
                            .assign_at(0, name, value.clone())
                            .map_err(|_| RuntimeError::NoSuchField { name: name.clone() })?;
                    }
                }
                Ok(value)
            }
            // arguments left to right, then the callee
            Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                let callee = self.eval(callee, env)?;
                self.call(&callee, args)
            }
            Expr::Field { object, name } => {
                let object = self.object(object, env)?;
                object
                    .env
                    .get_at(0, name)
                    .map_err(|_| RuntimeError::NoSuchField { name: name.clone() })
            }
        }
    }

    /// Evaluates a condition or a logical operand, which must be a boolean.
    pub(crate) fn condition(&self, expr: &Expr<Resolved>, env: &Environment) -> Result<bool, RuntimeError> {
        let value = self.eval(expr, env)?;
        value.cast_to_bool().ok_or(RuntimeError::ExpectedBoolean {
            found: value.type_name(),
        })
    }

    fn object(&self, expr: &Expr<Resolved>, env: &Environment) -> Result<Rc<Object>, RuntimeError> {
        match self.eval(expr, env)? {
            Value::Object(object) => Ok(object),
            other => Err(RuntimeError::NotAnObject {
                found: other.type_name(),
            }),
        }
    }

    fn call(&self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(func) => {
                check_arity(func.name(), func.arity(), &args)?;
                match &**func {
                    Function::Closure(closure) => self.call_closure(closure, args),
                    Function::Native(native) => Ok((native.func)(&args)),
                }
            }
            Value::Class(class) => {
                check_arity(class.name(), class.arity(), &args)?;
                self.instantiate(class, args)
            }
            other => Err(RuntimeError::NotCallable {
                found: other.type_name(),
            }),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(name = %closure.decl.name))]
    fn call_closure(&self, closure: &Closure, args: Vec<Value>) -> Result<Value, RuntimeError> {
        // parameters and body get one frame each
        let env = closure.env.child();
        for (param, arg) in closure.decl.params.iter().zip(args) {
            env.define(param.as_str(), arg);
        }
        match self.exec_block(&closure.decl.body, &env.child())? {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Nil),
        }
    }

    /// Builds an object: fields are bound to nil and methods are bound before any field
    /// initializer runs, then the constructor is called with `args`.
    fn instantiate(&self, class: &Rc<Class>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        debug!(class = class.name(), "instantiating object");
        let decl = &class.decl;
        let env = class.env.child();

        for field in &decl.fields {
            env.define(field.name.as_str(), Value::Nil);
        }
        for method in &decl.methods {
            let closure = Closure {
                decl: Rc::clone(method),
                env: env.clone(),
            };
            env.define(
                method.name.as_str(),
                Value::Function(Rc::new(Function::Closure(closure))),
            );
        }
        let object = Rc::new(Object {
            class: Rc::clone(class),
            env: env.clone(),
        });
        env.define("this", Value::Object(Rc::clone(&object)));

        for field in &decl.fields {
            if let Some(initializer) = &field.initializer {
                let value = self.eval(initializer, &env)?;
                trace!(field = %field.name, ?value, "initialized field");
                env.assign_at(0, &field.name, value)
                    .map_err(|_| RuntimeError::NoSuchField {
                        name: field.name.clone(),
                    })?;
            }
        }

        if let Some(constructor) = decl.constructor() {
            let constructor = Closure {
                decl: Rc::clone(constructor),
                env,
            };
            self.call_closure(&constructor, args)?;
        }
        Ok(Value::Object(object))
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil => Value::Nil,
        Literal::Bool(val) => Value::Bool(*val),
        Literal::Number(val) => Value::Number(*val),
        Literal::Str(val) => Value::new_string(val.as_str()),
    }
}

fn check_arity(callee: &str, expected: usize, args: &[Value]) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            callee: callee.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn lookup(var: &ResolvedVar, env: &Environment) -> Result<Value, RuntimeError> {
    env.get_at(var.depth, &var.name)
        .map_err(|source| internal(var, source))
}

fn internal(var: &ResolvedVar, source: EnvError) -> RuntimeError {
    RuntimeError::Internal(InternalError {
        name: var.name.clone(),
        source,
    })
}
