//! Pattern DSL parser.
//!
//! Parses a token stream into a `Pattern`. Union alternatives are flattened,
//! `!` produces a negated literal or constructor, and `{..}` / `[..]` produce
//! shape patterns.

use std::collections::BTreeMap;

use super::lexer::{Spanned, Token};
use super::{Constructor, LengthPolicy, Literal, Pattern, ShapeConstraint};
use crate::error::PatternFault;
use crate::registry::GuardRegistry;
use crate::value::Value;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    guards: &'a GuardRegistry,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Spanned>, guards: &'a GuardRegistry) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            guards,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(tok)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |s| s.offset)
    }

    fn error(&self, message: impl Into<String>) -> PatternFault {
        PatternFault::Syntax {
            input: self.source.to_string(),
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), PatternFault> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    pub fn parse(&mut self) -> Result<Pattern, PatternFault> {
        if self.tokens.is_empty() {
            return Err(self.error("empty pattern"));
        }
        let pattern = self.parse_union()?;
        if self.peek().is_some() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(pattern)
    }

    fn parse_union(&mut self) -> Result<Pattern, PatternFault> {
        let first = self.parse_alternative()?;
        if self.peek() != Some(&Token::Pipe) {
            return Ok(first);
        }
        let mut alts = vec![first];
        while self.peek() == Some(&Token::Pipe) {
            self.advance();
            alts.push(self.parse_alternative()?);
        }
        Pattern::union(alts)
    }

    fn parse_alternative(&mut self) -> Result<Pattern, PatternFault> {
        if self.peek() != Some(&Token::Negation) {
            return self.parse_atom();
        }
        self.advance();
        match self.parse_atom()? {
            Pattern::Literal { value, negated: false } => Ok(Pattern::Literal {
                value,
                negated: true,
            }),
            Pattern::TypedConstructor {
                name,
                negated: false,
            } => Ok(Pattern::TypedConstructor {
                name,
                negated: true,
            }),
            Pattern::CustomType(name) => Err(PatternFault::UnknownConstructor { name }),
            _ => Err(self.error("`!` applies only to literals and constructors")),
        }
    }

    fn parse_atom(&mut self) -> Result<Pattern, PatternFault> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error("expected a pattern"));
        };

        match tok {
            Token::Wildcard => {
                self.advance();
                Ok(Pattern::Wildcard)
            }
            Token::Guard(name) => {
                self.advance();
                match self.guards.get(&name) {
                    Some(guard) => Ok(Pattern::Guard(guard.clone())),
                    None => Err(PatternFault::UnknownGuard { name }),
                }
            }
            Token::LBrace => self.parse_object_shape(),
            Token::LBracket => self.parse_array_shape(),
            Token::Ident(ref name) if keyword_literal(name).is_none() => {
                self.advance();
                if let Some(ctor) = Constructor::from_name(name) {
                    Ok(Pattern::of(ctor))
                } else if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    Ok(Pattern::CustomType(name.clone()))
                } else {
                    Ok(Pattern::Any)
                }
            }
            _ => {
                let value = self.parse_literal()?;
                Ok(Pattern::Literal {
                    value,
                    negated: false,
                })
            }
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, PatternFault> {
        let literal = match self.peek() {
            Some(Token::Int(n)) => Literal::Int(*n),
            Some(Token::BigInt(n)) => Literal::BigInt(*n),
            Some(Token::Float(f)) => Literal::Float(*f),
            Some(Token::Str(s)) => Literal::String(s.clone()),
            Some(Token::Symbol(s)) => Literal::Symbol(s.as_str().into()),
            Some(Token::Ident(name)) => match keyword_literal(name) {
                Some(lit) => lit,
                None => return Err(self.error(format!("expected a literal, found `{name}`"))),
            },
            Some(Token::Rest) => {
                return Err(self.error("`...` is only valid as the last element of an array"));
            }
            _ => return Err(self.error("expected a pattern")),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_object_shape(&mut self) -> Result<Pattern, PatternFault> {
        self.expect(&Token::LBrace, "`{`")?;
        let mut keys: Vec<(String, ShapeConstraint)> = Vec::new();

        while self.peek() != Some(&Token::RBrace) {
            let key = self.parse_key()?;
            if keys.iter().any(|(k, _)| *k == key) {
                return Err(self.error(format!("duplicate key `{key}`")));
            }
            let constraint = if self.peek() == Some(&Token::Colon) {
                self.advance();
                self.parse_constraint()?
            } else {
                ShapeConstraint::Bind(key.clone())
            };
            keys.push((key, constraint));
            if self.peek() == Some(&Token::Comma) {
                self.advance();
            } else if self.peek() != Some(&Token::RBrace) {
                return Err(self.error("expected `,` or `}`"));
            }
        }
        self.expect(&Token::RBrace, "`}`")?;
        Ok(Pattern::ObjectShape(keys))
    }

    fn parse_array_shape(&mut self) -> Result<Pattern, PatternFault> {
        self.expect(&Token::LBracket, "`[`")?;
        let mut elements = Vec::new();
        let mut policy = LengthPolicy::Exact;

        while self.peek() != Some(&Token::RBracket) {
            if self.peek() == Some(&Token::Rest) {
                self.advance();
                if matches!(self.peek(), Some(Token::Ident(_))) {
                    self.advance();
                }
                policy = LengthPolicy::AtLeast;
                if self.peek() != Some(&Token::RBracket) {
                    return Err(self.error("`...` must be the last element"));
                }
                break;
            }
            elements.push(self.parse_constraint()?);
            if self.peek() == Some(&Token::Comma) {
                self.advance();
            } else if self.peek() != Some(&Token::RBracket) {
                return Err(self.error("expected `,` or `]`"));
            }
        }
        self.expect(&Token::RBracket, "`]`")?;
        Ok(Pattern::ArrayShape { elements, policy })
    }

    fn parse_key(&mut self) -> Result<String, PatternFault> {
        match self.peek() {
            Some(Token::Ident(name)) | Some(Token::Str(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            Some(Token::Int(n)) => {
                let name = n.to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected an object key")),
        }
    }

    /// One key or element constraint inside a shape.
    fn parse_constraint(&mut self) -> Result<ShapeConstraint, PatternFault> {
        match self.peek() {
            Some(Token::Wildcard) => {
                self.advance();
                Ok(ShapeConstraint::Bind("_".to_string()))
            }
            Some(Token::Ident(name)) if keyword_literal(name).is_none() => {
                let name = name.clone();
                self.advance();
                if let Some(ctor) = Constructor::from_name(&name) {
                    Ok(ShapeConstraint::Type(ctor))
                } else if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    Err(PatternFault::UnknownConstructor { name })
                } else {
                    Ok(ShapeConstraint::Bind(name))
                }
            }
            Some(Token::LBrace | Token::LBracket) => Ok(ShapeConstraint::Value(self.parse_value()?)),
            _ => Ok(ShapeConstraint::Value(self.parse_literal()?.to_value())),
        }
    }

    /// A concrete nested value: literals, arrays and objects of literals.
    fn parse_value(&mut self) -> Result<Value, PatternFault> {
        match self.peek() {
            Some(Token::LBracket) => {
                self.advance();
                let mut items = Vec::new();
                while self.peek() != Some(&Token::RBracket) {
                    items.push(self.parse_value()?);
                    if self.peek() == Some(&Token::Comma) {
                        self.advance();
                    } else if self.peek() != Some(&Token::RBracket) {
                        return Err(self.error("expected `,` or `]`"));
                    }
                }
                self.expect(&Token::RBracket, "`]`")?;
                Ok(Value::Array(items))
            }
            Some(Token::LBrace) => {
                self.advance();
                let mut map = BTreeMap::new();
                while self.peek() != Some(&Token::RBrace) {
                    let key = self.parse_key()?;
                    self.expect(&Token::Colon, "`:` after a nested key")?;
                    let value = self.parse_value()?;
                    if map.insert(key.clone(), value).is_some() {
                        return Err(self.error(format!("duplicate key `{key}`")));
                    }
                    if self.peek() == Some(&Token::Comma) {
                        self.advance();
                    } else if self.peek() != Some(&Token::RBrace) {
                        return Err(self.error("expected `,` or `}`"));
                    }
                }
                self.expect(&Token::RBrace, "`}`")?;
                Ok(Value::Object(map))
            }
            _ => Ok(self.parse_literal()?.to_value()),
        }
    }
}

fn keyword_literal(word: &str) -> Option<Literal> {
    match word {
        "true" => Some(Literal::Bool(true)),
        "false" => Some(Literal::Bool(false)),
        "null" => Some(Literal::Null),
        "undefined" => Some(Literal::Undefined),
        "NaN" => Some(Literal::Float(f64::NAN)),
        "Infinity" => Some(Literal::Float(f64::INFINITY)),
        _ => None,
    }
}
