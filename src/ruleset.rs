//! Rules and validated rule sets.

use std::fmt;
use std::sync::Arc;

use crate::engine::specificity::SpecificityIndex;
use crate::error::{ConfigurationFault, MatchError};
use crate::pattern::Pattern;
use crate::value::Value;

/// The body run when a rule is selected. The wildcard body is called with an
/// empty slice.
pub type Body<R> = Arc<dyn Fn(&[Value]) -> R + Send + Sync>;

/// The pattern-level description of a rule: what a pattern extractor
/// produces for one callable.
#[derive(Debug, Clone)]
pub struct RuleSignature {
    pub arity: usize,
    pub positions: Vec<Pattern>,
    pub is_wildcard: bool,
}

pub struct Rule<R> {
    signature: RuleSignature,
    name: Option<String>,
    param: Option<String>,
    body: Body<R>,
}

impl<R> Rule<R> {
    /// A regular rule with one pattern per input position.
    pub fn new(
        positions: Vec<Pattern>,
        body: impl Fn(&[Value]) -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature: RuleSignature {
                arity: positions.len(),
                positions,
                is_wildcard: false,
            },
            name: None,
            param: None,
            body: Arc::new(body),
        }
    }

    /// The fallback rule, taking no parameters.
    pub fn wildcard(body: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Self {
            signature: RuleSignature {
                arity: 0,
                positions: Vec::new(),
                is_wildcard: true,
            },
            name: None,
            param: None,
            body: Arc::new(move |_: &[Value]| body()),
        }
    }

    /// The fallback rule with its single nominal parameter. The parameter is
    /// never bound to an input.
    pub fn wildcard_named(
        param: impl Into<String>,
        body: impl Fn() -> R + Send + Sync + 'static,
    ) -> Self {
        let mut rule = Self::wildcard(body);
        rule.signature.arity = 1;
        rule.signature.positions = vec![Pattern::Wildcard];
        rule.param = Some(param.into());
        rule
    }

    /// A rule from an extracted signature, taken as-is. `RuleSet::new`
    /// reports any inconsistency in it.
    pub fn from_signature(
        signature: RuleSignature,
        body: impl Fn(&[Value]) -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            name: None,
            param: None,
            body: Arc::new(body),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The nominal parameter of a wildcard built with `wildcard_named`.
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    pub fn arity(&self) -> usize {
        self.signature.arity
    }

    pub fn positions(&self) -> &[Pattern] {
        &self.signature.positions
    }

    pub fn is_wildcard(&self) -> bool {
        self.signature.is_wildcard
    }

    pub fn signature(&self) -> &RuleSignature {
        &self.signature
    }

    pub fn call(&self, inputs: &[Value]) -> R {
        (self.body)(inputs)
    }
}

impl<R> fmt::Debug for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("param", &self.param)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// An ordered, validated, immutable list of rules.
///
/// At most one wildcard rule is allowed and it must come last. Construction
/// also builds the per-position specificity index the acceptance engine
/// consults.
pub struct RuleSet<R> {
    rules: Vec<Rule<R>>,
    wildcard: Option<usize>,
    index: SpecificityIndex,
}

impl<R> RuleSet<R> {
    pub fn new(rules: Vec<Rule<R>>) -> Result<Self, MatchError> {
        if rules.is_empty() {
            return Err(ConfigurationFault::EmptyRuleSet.into());
        }

        let mut wildcard: Option<usize> = None;
        for (index, rule) in rules.iter().enumerate() {
            let sig = &rule.signature;
            if sig.is_wildcard {
                if let Some(first) = wildcard {
                    return Err(ConfigurationFault::MultipleWildcards {
                        first,
                        second: index,
                    }
                    .into());
                }
                if sig.arity > 1 {
                    return Err(ConfigurationFault::WildcardArity {
                        index,
                        arity: sig.arity,
                    }
                    .into());
                }
                if sig.positions.iter().any(|p| !matches!(p, Pattern::Wildcard)) {
                    return Err(ConfigurationFault::WildcardWithPattern { index }.into());
                }
                if sig.positions.len() != sig.arity {
                    return Err(ConfigurationFault::ArityMismatch {
                        index,
                        arity: sig.arity,
                        positions: sig.positions.len(),
                    }
                    .into());
                }
                wildcard = Some(index);
                continue;
            }

            if sig.arity == 0 {
                return Err(ConfigurationFault::ZeroArityRule { index }.into());
            }
            if sig.positions.len() != sig.arity {
                return Err(ConfigurationFault::ArityMismatch {
                    index,
                    arity: sig.arity,
                    positions: sig.positions.len(),
                }
                .into());
            }
            for pattern in &sig.positions {
                pattern.validate()?;
            }
        }

        if let Some(index) = wildcard {
            if index != rules.len() - 1 {
                return Err(ConfigurationFault::WildcardNotLast { index }.into());
            }
        }

        let index = SpecificityIndex::build(&rules);
        Ok(Self {
            rules,
            wildcard,
            index,
        })
    }

    pub fn rules(&self) -> &[Rule<R>] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<&Rule<R>> {
        self.rules.get(index)
    }

    pub fn wildcard(&self) -> Option<(usize, &Rule<R>)> {
        self.wildcard.map(|idx| (idx, &self.rules[idx]))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn specificity(&self) -> &SpecificityIndex {
        &self.index
    }
}

impl<R> fmt::Debug for RuleSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules)
            .field("wildcard", &self.wildcard)
            .finish_non_exhaustive()
    }
}
