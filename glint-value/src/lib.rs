pub mod environment;
pub mod object;

use std::fmt;
use std::rc::Rc;

pub use environment::{EnvError, Environment};
pub use object::{Class, Closure, Function, NativeFn, Object};

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Object(Rc<Object>),
}

impl Value {
    pub fn new_string(str: impl Into<Rc<str>>) -> Self {
        Self::Str(str.into())
    }

    /// Name of the runtime type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Function(_) => "function",
            Self::Class(_) => "class",
            Self::Object(_) => "object",
        }
    }

    pub fn cast_to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(val) => Some(*val),
            _ => None,
        }
    }
}

/// Functions, classes and objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Number(l), Self::Number(r)) => l == r,
            (Self::Str(l), Self::Str(r)) => l == r,
            (Self::Function(l), Self::Function(r)) => Rc::ptr_eq(l, r),
            (Self::Class(l), Self::Class(r)) => Rc::ptr_eq(l, r),
            (Self::Object(l), Self::Object(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Number(val) => write!(f, "{}", val),
            Value::Str(val) => write!(f, "{}", val),
            Value::Function(func) => match &**func {
                Function::Closure(closure) => write!(f, "<fn {}>", closure.decl.name),
                Function::Native(NativeFn { ident, .. }) => write!(f, "<native fn {}>", ident),
            },
            Value::Class(class) => write!(f, "<class {}>", class.name()),
            Value::Object(obj) => write!(f, "<{} instance>", obj.class.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Variables bound in the global scope before any user code runs.
#[derive(Debug, Clone, Default)]
pub struct BuiltinVars {
    pub values: Vec<(String, Value)>,
}

impl BuiltinVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_native_fn(
        &mut self,
        ident: &str,
        func: impl Fn(&[Value]) -> Value + 'static,
        arity: usize,
    ) {
        let native = NativeFn {
            ident: ident.to_string(),
            arity,
            func: Rc::new(func),
        };
        self.values.push((
            ident.to_string(),
            Value::Function(Rc::new(Function::Native(native))),
        ));
    }
}
