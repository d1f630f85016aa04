use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
}

impl Severity {
    pub fn letter(&self) -> char {
        match self {
            Severity::Note => 'N',
            Severity::Warning => 'W',
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// What a resolution-time diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    /// A generic `Object` pattern was rejected because a shape rule that
    /// could also accept the input is declared after it.
    ShadowedObject,
    /// A generic `Array` pattern was rejected because a destructuring rule
    /// is declared after it.
    ShadowedArray,
    /// A `Number`/`String` pattern deferred to a literal declared elsewhere.
    LiteralPreempted,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ShadowedObject => "shadowed-object",
            DiagnosticCode::ShadowedArray => "shadowed-array",
            DiagnosticCode::LiteralPreempted => "literal-preempted",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::ShadowedObject | DiagnosticCode::ShadowedArray => Severity::Warning,
            DiagnosticCode::LiteralPreempted => Severity::Note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Rule whose pattern was evaluated.
    pub rule: usize,
    /// Input position being evaluated.
    pub position: usize,
    /// The other rule involved.
    pub related_rule: usize,
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, rule: usize, position: usize, related_rule: usize) -> Self {
        let message = match code {
            DiagnosticCode::ShadowedObject => format!(
                "generic Object pattern is shadowed by the shape pattern of rule {related_rule}; \
                 declare it after every shape rule it could shadow"
            ),
            DiagnosticCode::ShadowedArray => format!(
                "generic Array pattern is shadowed by the destructuring pattern of rule {related_rule}; \
                 declare it after every destructuring rule it could shadow"
            ),
            DiagnosticCode::LiteralPreempted => {
                format!("type pattern defers to the literal pattern of rule {related_rule}")
            }
        };
        Self {
            rule,
            position,
            related_rule,
            code,
            severity: code.severity(),
            message,
        }
    }

    pub fn sort_key(&self) -> (usize, usize, usize) {
        (self.rule, self.position, self.related_rule)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule {}:{}: {}: {}: {}",
            self.rule,
            self.position,
            self.severity,
            self.code.as_str(),
            self.message,
        )
    }
}
