//! Acceptance engine: does one pattern accept one input, in the context of
//! every rule in the set?
//!
//! Most pattern kinds decide on their own. Three need the rest of the rule
//! set:
//!
//! - `Number` / `String` constructors reject any input that some rule names
//!   as a literal at the same position, wherever that rule is declared.
//! - Object patterns pick the best-fitting shape (most keys, not exceeding
//!   the input's key count) across all rules; a generic `Object` defers to
//!   any fitting shape declared after it.
//! - Array patterns: a generic `Array` defers to the first fitting
//!   destructuring rule unless that rule was declared earlier.

use tracing::{trace, warn};

use super::specificity::SpecificityIndex;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::{MatchError, PatternFault};
use crate::pattern::{Constructor, LengthPolicy, Pattern, ShapeConstraint};
use crate::ruleset::RuleSet;
use crate::value::{Function, Value, classify};

use std::collections::BTreeMap;

/// Evaluates patterns for one resolution call and collects the diagnostics
/// raised along the way.
pub(crate) struct Acceptor<'a> {
    index: &'a SpecificityIndex,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Acceptor<'a> {
    pub fn new(index: &'a SpecificityIndex) -> Self {
        Self {
            index,
            diagnostics: Vec::new(),
        }
    }

    /// The collected diagnostics, ordered by rule then position.
    pub fn into_diagnostics(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(Diagnostic::sort_key);
        self.diagnostics
    }

    pub fn accepts(
        &mut self,
        pattern: &Pattern,
        input: &Value,
        position: usize,
        rule: usize,
    ) -> Result<bool, MatchError> {
        let accepted = match pattern {
            Pattern::Any | Pattern::Wildcard => true,
            Pattern::Guard(guard) => call_guard(guard, input, position, rule)?,
            Pattern::Literal { value, negated } => value.is(input) != *negated,
            Pattern::TypedConstructor { name, negated } => {
                self.accepts_constructor(*name, *negated, input, position, rule)
            }
            Pattern::CustomType(name) => accepts_custom_type(name, input),
            Pattern::Union(alts) => {
                let mut any = false;
                for alt in alts {
                    if self.accepts(alt, input, position, rule)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            Pattern::ObjectShape(keys) => match input {
                Value::Object(map) => self.accepts_object_shape(keys, map, position, rule),
                _ => false,
            },
            Pattern::ArrayShape { elements, policy } => match input {
                Value::Array(items) => self.accepts_array_shape(elements, *policy, items),
                _ => false,
            },
        };
        trace!(rule, position, %pattern, accepted, "pattern evaluated");
        Ok(accepted)
    }

    fn accepts_constructor(
        &mut self,
        name: Constructor,
        negated: bool,
        input: &Value,
        position: usize,
        rule: usize,
    ) -> bool {
        let admitted = name.admits(classify(input));
        if negated {
            return !admitted;
        }
        if !admitted {
            return false;
        }

        match (name, input) {
            (Constructor::Number | Constructor::String, _) => {
                match self.index.literal_preempts(position, input) {
                    Some(literal_rule) => {
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticCode::LiteralPreempted,
                            rule,
                            position,
                            literal_rule,
                        ));
                        false
                    }
                    None => true,
                }
            }
            (Constructor::Object, Value::Object(map)) => {
                let later_shape = self
                    .index
                    .object_shapes(position, map.len())
                    .find(|e| e.rule > rule);
                match later_shape {
                    Some(shape) => {
                        warn!(
                            rule,
                            position,
                            shape_rule = shape.rule,
                            "generic Object pattern declared before a more specific shape rule"
                        );
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticCode::ShadowedObject,
                            rule,
                            position,
                            shape.rule,
                        ));
                        false
                    }
                    None => true,
                }
            }
            (Constructor::Array, Value::Array(items)) => {
                match self.index.first_array_shape(position, items.len()) {
                    Some(shape_rule) if shape_rule >= rule => {
                        warn!(
                            rule,
                            position,
                            shape_rule,
                            "generic Array pattern declared before a destructuring rule"
                        );
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticCode::ShadowedArray,
                            rule,
                            position,
                            shape_rule,
                        ));
                        false
                    }
                    _ => true,
                }
            }
            _ => true,
        }
    }

    fn accepts_object_shape(
        &mut self,
        keys: &[(String, ShapeConstraint)],
        map: &BTreeMap<String, Value>,
        position: usize,
        rule: usize,
    ) -> bool {
        if keys.is_empty() {
            return map.is_empty();
        }
        if keys.len() > map.len() {
            return false;
        }

        let fitting: Vec<_> = self.index.object_shapes(position, map.len()).collect();
        let Some(best) = fitting.iter().map(|e| e.len).max() else {
            return false;
        };
        let is_best_fit = fitting.iter().any(|e| e.len == best && e.rule == rule);
        if !is_best_fit {
            return false;
        }

        keys.iter()
            .all(|(key, constraint)| map.get(key).is_some_and(|v| constraint.accepts(v)))
    }

    fn accepts_array_shape(
        &self,
        elements: &[ShapeConstraint],
        policy: LengthPolicy,
        items: &[Value],
    ) -> bool {
        let declared = elements.len();
        if declared == 0 {
            return items.is_empty();
        }
        if declared > items.len() {
            return false;
        }
        if policy == LengthPolicy::Exact && declared != items.len() {
            return false;
        }

        // With a single candidate rule only the declared prefix is compared;
        // otherwise the whole input must match element for element.
        if self.index.concrete_rules() != 1 && declared != items.len() {
            return false;
        }
        elements
            .iter()
            .zip(items)
            .all(|(constraint, item)| constraint.accepts(item))
    }
}

fn call_guard(
    guard: &Function,
    input: &Value,
    position: usize,
    rule: usize,
) -> Result<bool, PatternFault> {
    match guard.call(input) {
        Value::Bool(b) => Ok(b),
        other => Err(PatternFault::GuardNotBoolean {
            guard: guard.name().to_string(),
            rule,
            position,
            returned: classify(&other).name(),
        }),
    }
}

/// Own type name or the single immediate parent; no deeper ancestors.
fn accepts_custom_type(name: &str, input: &Value) -> bool {
    match classify(input).type_names() {
        Some((own, parent)) => own == name || parent == Some(name),
        None => false,
    }
}

/// Whether `pattern` accepts `input` at `position` of rule `rule_index`,
/// taking every rule in `rules` into account for specificity.
pub fn accepts<R>(
    pattern: &Pattern,
    input: &Value,
    position: usize,
    rule_index: usize,
    rules: &RuleSet<R>,
) -> Result<bool, MatchError> {
    Acceptor::new(rules.specificity()).accepts(pattern, input, position, rule_index)
}
