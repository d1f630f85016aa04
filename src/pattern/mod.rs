//! Pattern model, plus the description DSL that builds it.
//!
//! A `Pattern` describes what an input must look like to be accepted at one
//! rule position. Patterns are built either directly through the builder
//! functions here or from DSL text via [`Pattern::parse`].

pub mod lexer;
pub mod parser;

use std::fmt;
use std::sync::Arc;

use crate::error::PatternFault;
use crate::registry::{GuardRegistry, TypeRegistry};
use crate::value::eq::same_number;
use crate::value::{Function, Kind, Value, classify, deep_equal, same_value};

pub use lexer::{Lexer, Spanned, Token};
pub use parser::Parser;

/// A primitive value held by a literal pattern.
#[derive(Debug, Clone)]
pub enum Literal {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(i128),
    Symbol(Arc<str>),
    String(String),
}

impl Literal {
    /// Identity comparison against an input value.
    pub fn is(&self, input: &Value) -> bool {
        match (self, input) {
            (Literal::Undefined, Value::Undefined) | (Literal::Null, Value::Null) => true,
            (Literal::Bool(a), Value::Bool(b)) => a == b,
            (Literal::Int(a), Value::Int(b)) => a == b,
            (Literal::Int(a), Value::Float(b)) => same_number(*a as f64, *b),
            (Literal::Float(a), Value::Int(b)) => same_number(*a, *b as f64),
            (Literal::Float(a), Value::Float(b)) => same_number(*a, *b),
            (Literal::BigInt(a), Value::BigInt(b)) => a == b,
            (Literal::Symbol(a), Value::Symbol(b)) => a == b,
            (Literal::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::Undefined => Value::Undefined,
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(f) => Value::Float(*f),
            Literal::BigInt(n) => Value::BigInt(*n),
            Literal::Symbol(s) => Value::Symbol(Arc::clone(s)),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

impl TryFrom<&Value> for Literal {
    type Error = PatternFault;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Undefined => Literal::Undefined,
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Int(n) => Literal::Int(*n),
            Value::Float(f) => Literal::Float(*f),
            Value::BigInt(n) => Literal::BigInt(*n),
            Value::Symbol(s) => Literal::Symbol(Arc::clone(s)),
            Value::String(s) => Literal::String(s.clone()),
            other => {
                return Err(PatternFault::NonPrimitiveLiteral {
                    kind: classify(other).name(),
                });
            }
        })
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        same_value(&self.to_value(), &other.to_value())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Undefined => f.write_str("undefined"),
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) if x.is_nan() => f.write_str("NaN"),
            Literal::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Literal::Float(x) if x.fract() == 0.0 => write!(f, "{x:.1}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::BigInt(n) => write!(f, "{n}n"),
            Literal::Symbol(s) => write!(f, ":{s}"),
            Literal::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }
}

/// The closed set of built-in type names a typed-constructor pattern may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constructor {
    String,
    Number,
    Boolean,
    Function,
    Array,
    Object,
    RegExp,
    Date,
    Error,
    Set,
    Map,
    Symbol,
    BigInt,
}

impl Constructor {
    pub const ALL: [Constructor; 13] = [
        Constructor::String,
        Constructor::Number,
        Constructor::Boolean,
        Constructor::Function,
        Constructor::Array,
        Constructor::Object,
        Constructor::RegExp,
        Constructor::Date,
        Constructor::Error,
        Constructor::Set,
        Constructor::Map,
        Constructor::Symbol,
        Constructor::BigInt,
    ];

    pub fn from_name(name: &str) -> Option<Constructor> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constructor::String => "String",
            Constructor::Number => "Number",
            Constructor::Boolean => "Boolean",
            Constructor::Function => "Function",
            Constructor::Array => "Array",
            Constructor::Object => "Object",
            Constructor::RegExp => "RegExp",
            Constructor::Date => "Date",
            Constructor::Error => "Error",
            Constructor::Set => "Set",
            Constructor::Map => "Map",
            Constructor::Symbol => "Symbol",
            Constructor::BigInt => "BigInt",
        }
    }

    /// Canonical kind check, with no cross-rule specificity applied.
    ///
    /// `Number` admits integers only; non-integer numbers never satisfy it.
    pub fn admits(&self, kind: Kind<'_>) -> bool {
        match self {
            Constructor::String => kind == Kind::String,
            Constructor::Number => kind == Kind::Integer,
            Constructor::Boolean => kind == Kind::Boolean,
            Constructor::Function => kind == Kind::Function,
            Constructor::Array => kind == Kind::Array,
            Constructor::Object => kind == Kind::Object,
            Constructor::RegExp => kind == Kind::RegExp,
            Constructor::Date => kind == Kind::Date,
            Constructor::Error => matches!(kind, Kind::Error { .. }),
            Constructor::Set => kind == Kind::Set,
            Constructor::Map => kind == Kind::Map,
            Constructor::Symbol => kind == Kind::Symbol,
            Constructor::BigInt => kind == Kind::BigInt,
        }
    }
}

impl std::str::FromStr for Constructor {
    type Err = PatternFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Constructor::from_name(s).ok_or_else(|| PatternFault::UnknownConstructor {
            name: s.to_string(),
        })
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constraint on one key of an object shape or one element of an array
/// shape.
#[derive(Debug, Clone)]
pub enum ShapeConstraint {
    /// A destructured name: anything is accepted.
    Bind(String),
    /// Must deep-equal this value.
    Value(Value),
    /// Must be of this built-in kind.
    Type(Constructor),
}

impl ShapeConstraint {
    pub fn accepts(&self, input: &Value) -> bool {
        match self {
            ShapeConstraint::Bind(_) => true,
            ShapeConstraint::Value(v) => deep_equal(v, input),
            ShapeConstraint::Type(c) => c.admits(classify(input)),
        }
    }
}

impl fmt::Display for ShapeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeConstraint::Bind(name) => f.write_str(name),
            ShapeConstraint::Value(v) => fmt_value(v, f),
            ShapeConstraint::Type(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPolicy {
    /// The input must have exactly the declared number of elements.
    Exact,
    /// The input may have more elements than declared (a `...rest` tail).
    AtLeast,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// Unconstrained named parameter.
    Any,
    /// Marks the fallback rule's nominal parameter.
    Wildcard,
    Literal {
        value: Literal,
        negated: bool,
    },
    TypedConstructor {
        name: Constructor,
        negated: bool,
    },
    /// Matches an instance whose own type, or its immediate parent type, has
    /// this name. Grandparents are not consulted.
    CustomType(String),
    Guard(Function),
    ObjectShape(Vec<(String, ShapeConstraint)>),
    ArrayShape {
        elements: Vec<ShapeConstraint>,
        policy: LengthPolicy,
    },
    Union(Vec<Pattern>),
}

impl Pattern {
    pub fn any() -> Self {
        Pattern::Any
    }

    pub fn literal(value: impl Into<Value>) -> Result<Self, PatternFault> {
        Ok(Pattern::Literal {
            value: Literal::try_from(&value.into())?,
            negated: false,
        })
    }

    pub fn not_literal(value: impl Into<Value>) -> Result<Self, PatternFault> {
        Ok(Pattern::Literal {
            value: Literal::try_from(&value.into())?,
            negated: true,
        })
    }

    pub fn of(name: Constructor) -> Self {
        Pattern::TypedConstructor {
            name,
            negated: false,
        }
    }

    pub fn not_of(name: Constructor) -> Self {
        Pattern::TypedConstructor {
            name,
            negated: true,
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Pattern::CustomType(name.into())
    }

    pub fn guard(
        name: impl Into<Arc<str>>,
        predicate: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Pattern::Guard(Function::new(name, predicate))
    }

    pub fn object<K: Into<String>>(keys: impl IntoIterator<Item = (K, ShapeConstraint)>) -> Self {
        Pattern::ObjectShape(keys.into_iter().map(|(k, c)| (k.into(), c)).collect())
    }

    pub fn array(elements: impl IntoIterator<Item = ShapeConstraint>, policy: LengthPolicy) -> Self {
        Pattern::ArrayShape {
            elements: elements.into_iter().collect(),
            policy,
        }
    }

    pub fn union(alternatives: impl IntoIterator<Item = Pattern>) -> Result<Self, PatternFault> {
        let pattern = Pattern::Union(alternatives.into_iter().collect());
        pattern.validate()?;
        Ok(pattern)
    }

    /// Parse a pattern from its DSL description.
    pub fn parse(source: &str, guards: &GuardRegistry) -> Result<Self, PatternFault> {
        let tokens = Lexer::new(source).tokenize()?;
        Parser::new(source, tokens, guards).parse()
    }

    /// Check structural invariants the builders enforce, for patterns
    /// assembled by hand.
    pub fn validate(&self) -> Result<(), PatternFault> {
        if let Pattern::Union(alts) = self {
            if alts.is_empty() {
                return Err(PatternFault::EmptyUnion);
            }
            for alt in alts {
                match alt {
                    Pattern::Union(_) => return Err(PatternFault::NestedUnion),
                    Pattern::Wildcard => return Err(PatternFault::WildcardInUnion),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Reject custom-type names `types` does not know.
    pub fn check_types(&self, types: &TypeRegistry) -> Result<(), PatternFault> {
        for alt in self.alternatives() {
            if let Pattern::CustomType(name) = alt {
                if !types.knows(name) {
                    return Err(PatternFault::UnknownConstructor { name: name.clone() });
                }
            }
        }
        Ok(())
    }

    /// The pattern and, for a union, each of its alternatives.
    pub fn alternatives(&self) -> &[Pattern] {
        match self {
            Pattern::Union(alts) => alts,
            other => std::slice::from_ref(other),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => f.write_str("any"),
            Pattern::Wildcard => f.write_str("_"),
            Pattern::Literal { value, negated } => {
                if *negated {
                    f.write_str("!")?;
                }
                write!(f, "{value}")
            }
            Pattern::TypedConstructor { name, negated } => {
                if *negated {
                    f.write_str("!")?;
                }
                write!(f, "{name}")
            }
            Pattern::CustomType(name) => f.write_str(name),
            Pattern::Guard(g) => write!(f, "#{}", g.name()),
            Pattern::ObjectShape(keys) => {
                f.write_str("{")?;
                for (i, (key, c)) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt_key(key, f)?;
                    match c {
                        ShapeConstraint::Bind(name) if name == key => {}
                        _ => write!(f, ": {c}")?,
                    }
                }
                f.write_str("}")
            }
            Pattern::ArrayShape { elements, policy } => {
                f.write_str("[")?;
                for (i, c) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                if *policy == LengthPolicy::AtLeast {
                    if !elements.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("...")?;
                }
                f.write_str("]")
            }
            Pattern::Union(alts) => {
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}

/// Object keys that are not plain identifiers are written quoted.
fn fmt_key(key: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut bytes = key.bytes();
    let plain = key != "_"
        && bytes
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_' || c == b'$')
        && bytes.all(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$');
    if plain {
        f.write_str(key)
    } else {
        write!(f, "{}", Literal::String(key.to_string()))
    }
}

/// Render a value nested inside a shape in DSL form.
fn fmt_value(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Array(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                fmt_value(item, f)?;
            }
            f.write_str("]")
        }
        Value::Object(map) => {
            f.write_str("{")?;
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                fmt_key(k, f)?;
                f.write_str(": ")?;
                fmt_value(v, f)?;
            }
            f.write_str("}")
        }
        other => match Literal::try_from(other) {
            Ok(lit) => write!(f, "{lit}"),
            Err(_) => write!(f, "<{}>", classify(other).name()),
        },
    }
}
