use std::fmt;
use std::rc::Rc;

use glint_parser::ast::{ClassDecl, FunctionDecl, Resolved};

use crate::environment::Environment;
use crate::Value;

/// A callable value.
pub enum Function {
    Closure(Closure),
    Native(NativeFn),
}

/// A function declared in source, together with the environment it was declared in.
pub struct Closure {
    pub decl: Rc<FunctionDecl<Resolved>>,
    pub env: Environment,
}

#[derive(Clone)]
pub struct NativeFn {
    pub ident: String,
    pub arity: usize,
    pub func: Rc<dyn Fn(&[Value]) -> Value>,
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Self::Closure(closure) => &closure.decl.name,
            Self::Native(native) => &native.ident,
        }
    }

    /// Number of arguments that the function accepts.
    pub fn arity(&self) -> usize {
        match self {
            Self::Closure(closure) => closure.decl.params.len(),
            Self::Native(native) => native.arity,
        }
    }
}

pub struct Class {
    pub decl: Rc<ClassDecl<Resolved>>,
    /// Environment the class was declared in. Objects get a child of it.
    pub env: Environment,
}

impl Class {
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Number of arguments the constructor accepts.
    pub fn arity(&self) -> usize {
        self.decl
            .constructor()
            .map_or(0, |constructor| constructor.params.len())
    }
}

pub struct Object {
    pub class: Rc<Class>,
    /// Holds the fields, the methods and `this`.
    pub env: Environment,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => write!(f, "<fn {}>", self.name()),
            Self::Native(_) => write!(f, "<native fn {}>", self.name()),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name())
    }
}
