//! Runtime values and the value classifier.
//!
//! `Value` is the dynamic input type rules are resolved against. `classify`
//! maps a value onto the fixed set of [`Kind`]s the acceptance engine
//! dispatches on.

pub mod eq;
mod json;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

pub use eq::{deep_equal, same_value};

/// A named callable from one value to another.
///
/// Used both as a `Function`-kind input value and as the predicate behind a
/// guard pattern.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    call: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
}

impl Function {
    pub fn new(
        name: impl Into<Arc<str>>,
        call: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            call: Arc::new(call),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, input: &Value) -> Value {
        (self.call)(input)
    }

    /// Two functions are the same value only if they share the closure.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// A user-defined type with at most one recorded parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub parent: Option<String>,
}

/// An instance of a [`Class`].
#[derive(Debug, Clone)]
pub struct Instance {
    pub class: Arc<Class>,
    pub fields: BTreeMap<String, Value>,
}

/// An error value. `subtype` is `"Error"` for plain errors, otherwise the
/// specific error type name (`"TypeError"`, `"RangeError"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub subtype: String,
    pub message: String,
}

impl ErrorValue {
    pub fn new(subtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subtype: subtype.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(i128),
    /// Symbols compare by description.
    Symbol(Arc<str>),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Function(Function),
    RegExp(Regex),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    Error(ErrorValue),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Instance(Instance),
}

impl Value {
    pub fn symbol(description: impl Into<Arc<str>>) -> Self {
        Value::Symbol(description.into())
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Build a plain object from `(key, value)` pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn regexp(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Value::RegExp)
    }

    pub fn instance<K: Into<String>>(
        class: Arc<Class>,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Instance(Instance {
            class,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Numeric view used by identity equality and the numeric guards.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Truthiness with the usual dynamic-language rules.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::BigInt(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// The classification of a runtime value.
///
/// `Integer` and `Float` split the numeric domain: any finite number with no
/// fractional part is an `Integer`, everything else (including `NaN` and the
/// infinities) is a `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind<'a> {
    Undefined,
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
    Function,
    RegExp,
    Date,
    Error { subtype: &'a str },
    Set,
    Map,
    Instance {
        type_name: &'a str,
        parent: Option<&'a str>,
    },
    Symbol,
    BigInt,
}

impl<'a> Kind<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Function => "function",
            Kind::RegExp => "regexp",
            Kind::Date => "date",
            Kind::Error { .. } => "error",
            Kind::Set => "set",
            Kind::Map => "map",
            Kind::Instance { .. } => "instance",
            Kind::Symbol => "symbol",
            Kind::BigInt => "bigint",
        }
    }

    /// Own type name and immediate parent name, for kinds that carry one.
    ///
    /// Errors report their subtype with `Error` as parent; a plain `Error`
    /// has no parent.
    pub fn type_names(&self) -> Option<(&'a str, Option<&'a str>)> {
        match *self {
            Kind::Instance { type_name, parent } => Some((type_name, parent)),
            Kind::Error { subtype } => {
                let parent = (subtype != "Error").then_some("Error");
                Some((subtype, parent))
            }
            _ => None,
        }
    }
}

/// Map a value onto its [`Kind`].
pub fn classify(value: &Value) -> Kind<'_> {
    match value {
        Value::Undefined => Kind::Undefined,
        Value::Null => Kind::Null,
        Value::Bool(_) => Kind::Boolean,
        Value::Int(_) => Kind::Integer,
        Value::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 {
                Kind::Integer
            } else {
                Kind::Float
            }
        }
        Value::BigInt(_) => Kind::BigInt,
        Value::Symbol(_) => Kind::Symbol,
        Value::String(_) => Kind::String,
        Value::Array(_) => Kind::Array,
        Value::Object(_) => Kind::Object,
        Value::Function(_) => Kind::Function,
        Value::RegExp(_) => Kind::RegExp,
        Value::Date(_) => Kind::Date,
        Value::Error(e) => Kind::Error {
            subtype: &e.subtype,
        },
        Value::Set(_) => Kind::Set,
        Value::Map(_) => Kind::Map,
        Value::Instance(inst) => Kind::Instance {
            type_name: &inst.class.name,
            parent: inst.class.parent.as_deref(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_numbers() {
        assert_eq!(classify(&Value::Int(4)), Kind::Integer);
        assert_eq!(classify(&Value::Float(4.0)), Kind::Integer);
        assert_eq!(classify(&Value::Float(-0.0)), Kind::Integer);
        assert_eq!(classify(&Value::Float(4.2)), Kind::Float);
        assert_eq!(classify(&Value::Float(f64::NAN)), Kind::Float);
        assert_eq!(classify(&Value::Float(f64::INFINITY)), Kind::Float);
        assert_eq!(classify(&Value::BigInt(7)), Kind::BigInt);
    }

    #[test]
    fn classify_containers() {
        assert_eq!(classify(&Value::array([])), Kind::Array);
        assert_eq!(classify(&Value::object([("a", Value::Int(1))])), Kind::Object);
        assert_eq!(classify(&Value::Set(vec![])), Kind::Set);
        assert_eq!(classify(&Value::Map(vec![])), Kind::Map);
    }

    #[test]
    fn classify_error_subtype() {
        let err = Value::Error(ErrorValue::new("TypeError", "bad"));
        let kind = classify(&err);
        assert_eq!(kind, Kind::Error { subtype: "TypeError" });
        assert_eq!(kind.type_names(), Some(("TypeError", Some("Error"))));

        let plain = Value::Error(ErrorValue::new("Error", "plain"));
        assert_eq!(classify(&plain).type_names(), Some(("Error", None)));
    }

    #[test]
    fn classify_instance_reports_single_parent() {
        let dog = Arc::new(Class {
            name: "Dog".to_string(),
            parent: Some("Animal".to_string()),
        });
        let v = Value::instance(dog, [("name", Value::from("rex"))]);
        assert_eq!(
            classify(&v),
            Kind::Instance {
                type_name: "Dog",
                parent: Some("Animal")
            }
        );
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::array([]).is_truthy());
        assert!(Value::from("x").is_truthy());
    }

    #[test]
    fn function_identity() {
        let f = Function::new("f", |_| Value::Null);
        let g = f.clone();
        let h = Function::new("f", |_| Value::Null);
        assert!(f.ptr_eq(&g));
        assert!(!f.ptr_eq(&h));
        assert_eq!(format!("{f:?}"), "Function(f)");
    }
}
