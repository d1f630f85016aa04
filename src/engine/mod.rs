//! Rule resolution.
//!
//! `RuleSet::resolve` walks the non-wildcard rules in declaration order,
//! skips any whose arity differs from the number of inputs, and selects the
//! first rule whose every position accepts its input. When nothing matches
//! the wildcard body runs, or the outcome is `NoMatch`.

pub mod accept;
pub mod specificity;

pub use accept::accepts;

use tracing::{debug, trace};

use crate::diagnostic::Diagnostic;
use crate::error::{ConfigurationFault, MatchError};
use crate::ruleset::RuleSet;
use crate::value::Value;
use accept::Acceptor;

/// What a resolution selected.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    /// A non-wildcard rule accepted every input; `value` is its body's result.
    Matched { rule: usize, value: R },
    /// No rule matched and the wildcard body ran.
    Fallback { rule: usize, value: R },
    /// No rule matched and there is no wildcard. Not an error.
    NoMatch,
}

impl<R> Outcome<R> {
    pub fn into_value(self) -> Option<R> {
        match self {
            Outcome::Matched { value, .. } | Outcome::Fallback { value, .. } => Some(value),
            Outcome::NoMatch => None,
        }
    }

    pub fn value(&self) -> Option<&R> {
        match self {
            Outcome::Matched { value, .. } | Outcome::Fallback { value, .. } => Some(value),
            Outcome::NoMatch => None,
        }
    }

    /// Index of the rule whose body ran.
    pub fn rule(&self) -> Option<usize> {
        match self {
            Outcome::Matched { rule, .. } | Outcome::Fallback { rule, .. } => Some(*rule),
            Outcome::NoMatch => None,
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Outcome::NoMatch)
    }
}

/// The outcome of one resolution plus the diagnostics raised while
/// evaluating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<R> {
    pub outcome: Outcome<R>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<R> Resolution<R> {
    pub fn into_value(self) -> Option<R> {
        self.outcome.into_value()
    }
}

impl<R> RuleSet<R> {
    /// Resolve `inputs` against this rule set.
    ///
    /// Faults raised by a guard abort the resolution immediately.
    pub fn resolve(&self, inputs: &[Value]) -> Result<Resolution<R>, MatchError> {
        if inputs.is_empty() {
            return Err(ConfigurationFault::NoInputs.into());
        }

        let mut acceptor = Acceptor::new(self.specificity());

        for (index, rule) in self.rules().iter().enumerate() {
            if rule.is_wildcard() {
                continue;
            }
            if rule.arity() != inputs.len() {
                trace!(rule = index, arity = rule.arity(), inputs = inputs.len(), "arity mismatch");
                continue;
            }

            let mut accepted = true;
            for (position, (pattern, input)) in rule.positions().iter().zip(inputs).enumerate() {
                if !acceptor.accepts(pattern, input, position, index)? {
                    debug!(rule = index, position, "rule rejected");
                    accepted = false;
                    break;
                }
            }

            if accepted {
                debug!(rule = index, name = rule.name(), "rule matched");
                return Ok(Resolution {
                    outcome: Outcome::Matched {
                        rule: index,
                        value: rule.call(inputs),
                    },
                    diagnostics: acceptor.into_diagnostics(),
                });
            }
        }

        let outcome = match self.wildcard() {
            Some((index, rule)) => {
                debug!(rule = index, "falling back to wildcard");
                Outcome::Fallback {
                    rule: index,
                    value: rule.call(&[]),
                }
            }
            None => {
                debug!("no rule matched");
                Outcome::NoMatch
            }
        };
        Ok(Resolution {
            outcome,
            diagnostics: acceptor.into_diagnostics(),
        })
    }
}

/// Free-function form of [`RuleSet::resolve`].
pub fn resolve<R>(inputs: &[Value], rules: &RuleSet<R>) -> Result<Resolution<R>, MatchError> {
    rules.resolve(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;
    use crate::error::PatternFault;
    use crate::pattern::Pattern;
    use crate::registry::GuardRegistry;
    use crate::ruleset::Rule;

    /// Build a rule set from `(patterns, label)` pairs, optionally followed
    /// by a wildcard returning `fallback`.
    fn rules(entries: &[(&[&str], &'static str)], fallback: Option<&'static str>) -> RuleSet<&'static str> {
        let guards = GuardRegistry::builtin();
        let mut list: Vec<Rule<&'static str>> = entries
            .iter()
            .map(|(patterns, label)| {
                let positions = patterns
                    .iter()
                    .map(|src| Pattern::parse(src, &guards).unwrap())
                    .collect();
                let label = *label;
                Rule::new(positions, move |_| label)
            })
            .collect();
        if let Some(label) = fallback {
            list.push(Rule::wildcard(move || label));
        }
        RuleSet::new(list).unwrap()
    }

    fn run(set: &RuleSet<&'static str>, inputs: &[Value]) -> Option<&'static str> {
        set.resolve(inputs).unwrap().into_value()
    }

    fn obj(entries: &[(&str, i64)]) -> Value {
        Value::object(entries.iter().map(|(k, v)| (*k, Value::Int(*v))))
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let set = rules(&[(&["Number"], "n")], None);
        assert_eq!(
            set.resolve(&[]).unwrap_err(),
            MatchError::Configuration(ConfigurationFault::NoInputs)
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let set = rules(&[(&["Number"], "a"), (&["Number"], "b")], None);
        let res = set.resolve(&[Value::Int(1)]).unwrap();
        assert_eq!(res.outcome, Outcome::Matched { rule: 0, value: "a" });
    }

    #[test]
    fn test_arity_filter() {
        let set = rules(&[(&["Number", "Number"], "pair"), (&["Number"], "one")], Some("w"));
        assert_eq!(run(&set, &[Value::Int(1)]), Some("one"));
        assert_eq!(run(&set, &[Value::Int(1), Value::Int(2)]), Some("pair"));
        assert_eq!(run(&set, &[Value::Int(1), Value::Int(2), Value::Int(3)]), Some("w"));
    }

    #[test]
    fn test_short_circuit_stops_at_first_rejecting_position() {
        let set = RuleSet::new(vec![
            Rule::new(
                vec![
                    Pattern::of(crate::pattern::Constructor::String),
                    Pattern::guard("boom", |_| Value::Null),
                ],
                |_| "never",
            ),
            Rule::new(vec![Pattern::any(), Pattern::any()], |_| "any"),
        ])
        .unwrap();
        assert_eq!(run(&set, &[Value::Int(1), Value::Int(2)]), Some("any"));
        assert!(set.resolve(&[Value::from("s"), Value::Int(2)]).is_err());
    }

    #[test]
    fn test_fallback_and_no_match() {
        let with = rules(&[(&["String"], "s")], Some("w"));
        let res = with.resolve(&[Value::Int(1)]).unwrap();
        assert_eq!(res.outcome, Outcome::Fallback { rule: 1, value: "w" });

        let without = rules(&[(&["String"], "s")], None);
        let res = without.resolve(&[Value::Int(1)]).unwrap();
        assert!(res.outcome.is_no_match());
        assert_eq!(res.into_value(), None);
    }

    #[test]
    fn test_body_receives_inputs() {
        let set: RuleSet<Value> = RuleSet::new(vec![Rule::new(
            vec![Pattern::any(), Pattern::any()],
            |inputs| inputs[1].clone(),
        )])
        .unwrap();
        let res = set.resolve(&[Value::Int(1), Value::from("second")]).unwrap();
        assert_eq!(res.into_value(), Some(Value::from("second")));
    }

    #[test]
    fn test_literal_beats_number_in_either_order() {
        let before = rules(&[(&["5"], "lit"), (&["Number"], "num")], None);
        let after = rules(&[(&["Number"], "num"), (&["5"], "lit")], None);
        assert_eq!(run(&before, &[Value::Int(5)]), Some("lit"));
        assert_eq!(run(&after, &[Value::Int(5)]), Some("lit"));
        assert_eq!(run(&after, &[Value::Int(6)]), Some("num"));

        let res = after.resolve(&[Value::Int(5)]).unwrap();
        assert_eq!(res.diagnostics.len(), 1);
        assert_eq!(res.diagnostics[0].code, DiagnosticCode::LiteralPreempted);
    }

    #[test]
    fn test_float_exclusion() {
        let set = rules(&[(&["Number"], "num"), (&["4.2"], "lit")], Some("w"));
        assert_eq!(run(&set, &[Value::Float(4.2)]), Some("lit"));
        assert_eq!(run(&set, &[Value::Float(4.3)]), Some("w"));
        assert_eq!(run(&set, &[Value::Int(4)]), Some("num"));
        assert_eq!(run(&set, &[Value::Float(4.0)]), Some("num"));

        let only_lit = rules(&[(&["4.2"], "lit")], Some("w"));
        assert_eq!(run(&only_lit, &[Value::Float(4.0)]), Some("w"));
        assert_eq!(run(&only_lit, &[Value::Int(4)]), Some("w"));
    }

    #[test]
    fn test_object_specificity() {
        let set = rules(&[(&["{x: 1}"], "A"), (&["{x: 1, y: 2}"], "B")], Some("C"));
        assert_eq!(run(&set, &[obj(&[("x", 1), ("y", 2)])]), Some("B"));
        assert_eq!(run(&set, &[obj(&[("x", 1)])]), Some("A"));
        assert_eq!(run(&set, &[obj(&[("x", 2)])]), Some("C"));
    }

    #[test]
    fn test_object_constructor_ordering() {
        let input = obj(&[("x", 1), ("y", 2)]);

        let shape_first = rules(&[(&["{x: 1}"], "A"), (&["Object"], "B")], Some("C"));
        let res = shape_first.resolve(std::slice::from_ref(&input)).unwrap();
        assert_eq!(res.into_value(), Some("A"));

        let object_first = rules(&[(&["Object"], "B"), (&["{x: 1}"], "A")], Some("C"));
        let res = object_first.resolve(std::slice::from_ref(&input)).unwrap();
        assert_eq!(res.outcome, Outcome::Matched { rule: 1, value: "A" });
        assert_eq!(res.diagnostics.len(), 1);
        assert_eq!(res.diagnostics[0].code, DiagnosticCode::ShadowedObject);
    }

    #[test]
    fn test_array_prefix_single_rule() {
        let set = rules(&[(&["[1, ...]"], "A")], Some("B"));
        let input = Value::array([Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(run(&set, &[input]), Some("A"));
    }

    #[test]
    fn test_destructuring_head_binding() {
        let set = rules(&[(&["[h, ...]"], "A")], Some("B"));
        assert_eq!(run(&set, &[Value::array([Value::Int(9), Value::Int(8)])]), Some("A"));
        assert_eq!(run(&set, &[Value::array([])]), Some("B"));
    }

    #[test]
    fn test_empty_shape_exactness() {
        let set = rules(&[(&["{}"], "A")], Some("B"));
        assert_eq!(run(&set, &[obj(&[])]), Some("A"));
        assert_eq!(run(&set, &[obj(&[("k", 1)])]), Some("B"));
    }

    #[test]
    fn test_union_regexp_or_array() {
        let set = rules(&[(&["RegExp | Array"], "A")], Some("B"));
        assert_eq!(run(&set, &[Value::regexp("^a").unwrap()]), Some("A"));
        assert_eq!(run(&set, &[Value::array([])]), Some("A"));
        assert_eq!(run(&set, &[Value::from("^a")]), Some("B"));
        assert_eq!(run(&set, &[Value::Null]), Some("B"));
    }

    #[test]
    fn test_guard_fault_propagates() {
        let set: RuleSet<()> = RuleSet::new(vec![Rule::new(
            vec![Pattern::guard("bad", |_| Value::from("yes"))],
            |_| (),
        )])
        .unwrap();
        let err = set.resolve(&[Value::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            MatchError::Pattern(PatternFault::GuardNotBoolean { returned: "string", .. })
        ));
    }

    #[test]
    fn test_builtin_guards() {
        let set = rules(&[(&["#even"], "even"), (&["#odd"], "odd")], Some("other"));
        assert_eq!(run(&set, &[Value::Int(4)]), Some("even"));
        assert_eq!(run(&set, &[Value::Int(3)]), Some("odd"));
    }

    #[test]
    fn test_free_resolve_matches_method() {
        let set = rules(&[(&["String"], "s")], Some("w"));
        let input = [Value::from("x")];
        assert_eq!(resolve(&input, &set).unwrap(), set.resolve(&input).unwrap());
    }

    #[test]
    fn test_ruleset_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleSet<Value>>();
    }
}
