//! Runtime scope chain.
//!
//! Frames are shared: a closure or an object keeps the frame it captured alive for as long as it
//! lives, and every holder observes mutations made through any other holder.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("no frame {depth} levels above the current one")]
    MissingFrame { depth: usize },
    #[error("`{name}` is not bound {depth} frames up")]
    Unbound { name: String, depth: usize },
}

struct Frame {
    values: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// A handle to a frame. Cloning the handle shares the frame.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    /// Creates a root frame.
    pub fn global() -> Self {
        Self::with_parent(None)
    }

    /// Creates an empty frame whose parent is `self`.
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    fn with_parent(parent: Option<Environment>) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            values: HashMap::new(),
            parent,
        })))
    }

    /// Binds `name` in this frame, replacing any previous binding of the same name.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().values.insert(name.into(), value);
    }

    /// Returns the frame `depth` parent links up.
    pub fn ancestor(&self, depth: usize) -> Result<Environment, EnvError> {
        let mut env = self.clone();
        for _ in 0..depth {
            let parent = env.0.borrow().parent.clone();
            env = parent.ok_or(EnvError::MissingFrame { depth })?;
        }
        Ok(env)
    }

    /// Reads `name` from the frame exactly `depth` parent links up.
    pub fn get_at(&self, depth: usize, name: &str) -> Result<Value, EnvError> {
        let env = self.ancestor(depth)?;
        let frame = env.0.borrow();
        frame
            .values
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::Unbound {
                name: name.to_string(),
                depth,
            })
    }

    /// Overwrites an existing binding of `name` in the frame exactly `depth` parent links up.
    pub fn assign_at(&self, depth: usize, name: &str, value: Value) -> Result<(), EnvError> {
        let env = self.ancestor(depth)?;
        let mut frame = env.0.borrow_mut();
        match frame.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EnvError::Unbound {
                name: name.to_string(),
                depth,
            }),
        }
    }

    /// Names bound in this frame, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().values.keys().cloned().collect()
    }
}

/// Only the names of the frame itself are printed: values may point back to the frame.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_parent", &self.0.borrow().parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_at_depth() {
        let global = Environment::global();
        global.define("a", Value::Number(1.0));
        let inner = global.child().child();
        inner.define("a", Value::Number(2.0));

        assert_eq!(inner.get_at(0, "a"), Ok(Value::Number(2.0)));
        assert_eq!(inner.get_at(2, "a"), Ok(Value::Number(1.0)));
        // the frame in between does not bind `a` and lookups never search further
        assert_eq!(
            inner.get_at(1, "a"),
            Err(EnvError::Unbound {
                name: "a".to_string(),
                depth: 1
            })
        );
        assert_eq!(
            inner.get_at(3, "a"),
            Err(EnvError::MissingFrame { depth: 3 })
        );
    }

    #[test]
    fn test_assign_requires_existing_binding() {
        let global = Environment::global();
        global.define("a", Value::Nil);
        let inner = global.child();

        assert_eq!(inner.assign_at(1, "a", Value::Bool(true)), Ok(()));
        assert_eq!(global.get_at(0, "a"), Ok(Value::Bool(true)));
        assert!(inner.assign_at(0, "a", Value::Nil).is_err());
        assert!(inner.get_at(0, "a").is_err());
    }

    #[test]
    fn test_frames_are_shared() {
        let global = Environment::global();
        let frame = global.child();
        let captured = frame.clone();
        frame.define("count", Value::Number(0.0));

        captured.assign_at(0, "count", Value::Number(1.0)).unwrap();
        assert_eq!(frame.get_at(0, "count"), Ok(Value::Number(1.0)));
        assert!(global.get_at(0, "count").is_err());

        global.define("g", Value::Bool(true));
        assert_eq!(frame.get_at(1, "g"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_names() {
        let global = Environment::global();
        global.define("b", Value::Nil);
        global.define("a", Value::Nil);
        let mut names = global.names();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
