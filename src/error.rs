// Errors raised by rule construction and resolution.
//
// A failed match is not an error: it is `Outcome::NoMatch`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("configuration fault: {0}")]
    Configuration(#[from] ConfigurationFault),

    #[error("pattern fault: {0}")]
    Pattern(#[from] PatternFault),
}

/// Caller-side contract violations in how rules or inputs were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationFault {
    #[error("no input values were supplied")]
    NoInputs,

    #[error("the rule set is empty")]
    EmptyRuleSet,

    #[error("rule {second} is a second wildcard rule (first at rule {first})")]
    MultipleWildcards { first: usize, second: usize },

    #[error("wildcard rule {index} must be the last rule")]
    WildcardNotLast { index: usize },

    #[error("wildcard rule {index} has arity {arity}; it may take at most one nominal parameter")]
    WildcardArity { index: usize, arity: usize },

    #[error("wildcard rule {index} declares a pattern on its parameter")]
    WildcardWithPattern { index: usize },

    #[error("rule {index} has no parameters and is not the wildcard rule")]
    ZeroArityRule { index: usize },

    #[error("rule {index} declares arity {arity} but has {positions} patterns")]
    ArityMismatch {
        index: usize,
        arity: usize,
        positions: usize,
    },
}

/// Faults in a pattern itself, found while building or evaluating it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternFault {
    #[error(
        "guard `{guard}` at rule {rule}, position {position} returned {returned}, expected a boolean"
    )]
    GuardNotBoolean {
        guard: String,
        rule: usize,
        position: usize,
        returned: &'static str,
    },

    #[error("unknown constructor `{name}`")]
    UnknownConstructor { name: String },

    #[error("unknown guard `#{name}`")]
    UnknownGuard { name: String },

    #[error("a literal pattern must hold a primitive value, got {kind}")]
    NonPrimitiveLiteral { kind: &'static str },

    #[error("a union needs at least one alternative")]
    EmptyUnion,

    #[error("a union alternative may not itself be a union")]
    NestedUnion,

    #[error("a union alternative may not be the wildcard")]
    WildcardInUnion,

    #[error("syntax error in pattern `{input}` at offset {offset}: {message}")]
    Syntax {
        input: String,
        offset: usize,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wraps_category() {
        let err: MatchError = ConfigurationFault::WildcardNotLast { index: 1 }.into();
        assert_eq!(
            err.to_string(),
            "configuration fault: wildcard rule 1 must be the last rule"
        );

        let err: MatchError = PatternFault::UnknownGuard {
            name: "big".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "pattern fault: unknown guard `#big`");
    }

    #[test]
    fn guard_fault_message() {
        let fault = PatternFault::GuardNotBoolean {
            guard: "len".to_string(),
            rule: 2,
            position: 0,
            returned: "integer",
        };
        assert_eq!(
            fault.to_string(),
            "guard `len` at rule 2, position 0 returned integer, expected a boolean"
        );
    }
}
