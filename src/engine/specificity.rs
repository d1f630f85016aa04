//! Cross-rule specificity index.
//!
//! Built once per `RuleSet`. For every input position it records the
//! literals, object shapes and array shapes that non-wildcard rules declare
//! there (union alternatives included), in declaration order, so the
//! acceptance engine can answer "is there a more specific rule?" without
//! rescanning the rule list on every check.

use crate::pattern::{Literal, Pattern};
use crate::ruleset::Rule;
use crate::value::Value;

/// A shape pattern declared by some rule at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeEntry {
    pub rule: usize,
    /// Key count for object shapes, element count for array shapes.
    pub len: usize,
}

#[derive(Debug, Default)]
struct PositionIndex {
    literals: Vec<(usize, Literal)>,
    objects: Vec<ShapeEntry>,
    arrays: Vec<ShapeEntry>,
}

#[derive(Debug, Default)]
pub struct SpecificityIndex {
    positions: Vec<PositionIndex>,
    concrete_rules: usize,
}

impl SpecificityIndex {
    pub fn build<R>(rules: &[Rule<R>]) -> Self {
        let mut index = SpecificityIndex::default();

        for (rule_idx, rule) in rules.iter().enumerate() {
            if rule.is_wildcard() {
                continue;
            }
            index.concrete_rules += 1;

            for (position, pattern) in rule.positions().iter().enumerate() {
                if index.positions.len() <= position {
                    index.positions.resize_with(position + 1, PositionIndex::default);
                }
                let slot = &mut index.positions[position];
                for alt in pattern.alternatives() {
                    match alt {
                        Pattern::Literal {
                            value,
                            negated: false,
                        } => slot.literals.push((rule_idx, value.clone())),
                        Pattern::ObjectShape(keys) => slot.objects.push(ShapeEntry {
                            rule: rule_idx,
                            len: keys.len(),
                        }),
                        Pattern::ArrayShape { elements, .. } => slot.arrays.push(ShapeEntry {
                            rule: rule_idx,
                            len: elements.len(),
                        }),
                        _ => {}
                    }
                }
            }
        }

        index
    }

    /// Number of non-wildcard rules.
    pub fn concrete_rules(&self) -> usize {
        self.concrete_rules
    }

    /// The first rule declaring a literal at `position` identical to `input`.
    pub fn literal_preempts(&self, position: usize, input: &Value) -> Option<usize> {
        self.positions
            .get(position)?
            .literals
            .iter()
            .find(|(_, lit)| lit.is(input))
            .map(|(rule, _)| *rule)
    }

    /// Object shapes at `position` declaring at most `key_count` keys.
    pub fn object_shapes(&self, position: usize, key_count: usize) -> impl Iterator<Item = ShapeEntry> + '_ {
        self.positions
            .get(position)
            .map(|p| p.objects.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |e| e.len <= key_count)
    }

    /// The first rule declaring an array shape at `position` no longer than
    /// `len`.
    pub fn first_array_shape(&self, position: usize, len: usize) -> Option<usize> {
        self.positions
            .get(position)?
            .arrays
            .iter()
            .find(|e| e.len <= len)
            .map(|e| e.rule)
    }
}
