//! Named registries the pattern DSL and the value bridge resolve against.
//!
//! `TypeRegistry` records custom types and their single parent link.
//! `GuardRegistry` holds the named predicates a `#name` guard refers to.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::{Class, Function, Value};

/// Built-in error subtypes. Each counts as a custom type with parent `Error`.
pub const ERROR_SUBTYPES: &[&str] = &[
    "AggregateError",
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
];

#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: Vec<Arc<Class>>,
    index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a type with an optional parent.
    ///
    /// Only the parent's name is recorded. Grandparents are never consulted
    /// when matching, so the parent need not be defined itself.
    pub fn define(&mut self, name: impl Into<String>, parent: Option<&str>) -> Arc<Class> {
        let name = name.into();
        let class = Arc::new(Class {
            name: name.clone(),
            parent: parent.map(str::to_string),
        });
        match self.index.get(&name) {
            Some(&idx) => self.classes[idx] = Arc::clone(&class),
            None => {
                self.index.insert(name, self.classes.len());
                self.classes.push(Arc::clone(&class));
            }
        }
        class
    }

    pub fn get(&self, name: &str) -> Option<Arc<Class>> {
        self.index.get(name).map(|&idx| Arc::clone(&self.classes[idx]))
    }

    /// Look up a type, falling back to a parentless class of that name.
    pub fn class(&self, name: &str) -> Arc<Class> {
        self.get(name).unwrap_or_else(|| {
            Arc::new(Class {
                name: name.to_string(),
                parent: None,
            })
        })
    }

    /// Whether a custom-type pattern may name `name`: a defined type, the
    /// parent of one, or a built-in error subtype.
    pub fn knows(&self, name: &str) -> bool {
        self.index.contains_key(name)
            || ERROR_SUBTYPES.contains(&name)
            || self
                .classes
                .iter()
                .any(|c| c.parent.as_deref() == Some(name))
    }

    pub fn classes(&self) -> &[Arc<Class>] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

pub struct GuardRegistry {
    guards: Vec<Function>,
    index: HashMap<String, usize>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self {
            guards: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the built-in numeric, emptiness and
    /// truthiness guards.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Function::new("positive", |v| {
            Value::Bool(v.as_number().is_some_and(|n| n > 0.0))
        }));
        registry.register(Function::new("negative", |v| {
            Value::Bool(v.as_number().is_some_and(|n| n < 0.0))
        }));
        registry.register(Function::new("zero", |v| {
            Value::Bool(v.as_number().is_some_and(|n| n == 0.0))
        }));
        registry.register(Function::new("even", |v| {
            Value::Bool(integral(v).is_some_and(|n| n % 2 == 0))
        }));
        registry.register(Function::new("odd", |v| {
            Value::Bool(integral(v).is_some_and(|n| n % 2 != 0))
        }));
        registry.register(Function::new("empty", |v| {
            Value::Bool(length(v) == Some(0))
        }));
        registry.register(Function::new("non_empty", |v| {
            Value::Bool(length(v).is_some_and(|n| n > 0))
        }));
        registry.register(Function::new("truthy", |v| Value::Bool(v.is_truthy())));
        registry.register(Function::new("falsy", |v| Value::Bool(!v.is_truthy())));
        registry
    }

    pub fn register(&mut self, guard: Function) {
        let name = guard.name().to_string();
        match self.index.get(&name) {
            Some(&idx) => self.guards[idx] = guard,
            None => {
                self.index.insert(name, self.guards.len());
                self.guards.push(guard);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.index.get(name).map(|&idx| &self.guards[idx])
    }

    pub fn names(&self) -> Vec<&str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl Default for GuardRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn integral(v: &Value) -> Option<i64> {
    match v {
        Value::Int(n) => Some(*n),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        _ => None,
    }
}

fn length(v: &Value) -> Option<usize> {
    match v {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) | Value::Set(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::Map(entries) => Some(entries.len()),
        _ => None,
    }
}
