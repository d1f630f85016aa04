use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::pattern::Pattern;
use crate::registry::{GuardRegistry, TypeRegistry};
use crate::ruleset::{Rule, RuleSet, RuleSignature};
use crate::value::Value;

/// A rule file loaded from YAML.
///
/// ```yaml
/// types:
///   Dog: Animal
/// rules:
///   - name: origin
///     when: ["{x: 0, y: 0}"]
///     then: origin
///   - otherwise: fallback
/// cases:
///   - [{x: 0, y: 0}]
/// ```
#[derive(Debug)]
pub struct RuleFile {
    pub rules: RuleSet<Value>,
    pub cases: Vec<Vec<Value>>,
    pub types: TypeRegistry,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleFile {
    #[serde(default)]
    types: BTreeMap<String, Option<String>>,
    #[serde(default)]
    rules: Vec<RawRule>,
    #[serde(default)]
    cases: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    when: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    then: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    otherwise: Option<serde_json::Value>,
    #[serde(default)]
    otherwise_param: Option<String>,
}

/// Distinguishes an explicit `null` from a missing key.
fn present<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(d).map(Some)
}

/// What a rule body returns.
#[derive(Debug, Clone)]
enum Body {
    Constant(Value),
    /// `"$N"`: the input at position N.
    Echo(usize),
}

impl Body {
    fn from_json(json: &serde_json::Value, types: &TypeRegistry) -> Result<Body> {
        if let Some(n) = json
            .as_str()
            .and_then(|s| s.strip_prefix('$'))
            .and_then(|n| n.parse::<usize>().ok())
        {
            return Ok(Body::Echo(n));
        }
        Ok(Body::Constant(Value::from_json(json, types)?))
    }

    fn eval(&self, inputs: &[Value]) -> Value {
        match self {
            Body::Constant(v) => v.clone(),
            Body::Echo(n) => inputs.get(*n).cloned().unwrap_or(Value::Undefined),
        }
    }
}

/// Load and validate a rule file.
pub fn load_rules(path: &Path, guards: &GuardRegistry) -> Result<RuleFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    parse_rules(&contents, guards).with_context(|| format!("invalid rule file {}", path.display()))
}

pub fn parse_rules(contents: &str, guards: &GuardRegistry) -> Result<RuleFile> {
    let raw: RawRuleFile = serde_yml::from_str(contents).context("failed to parse rule file YAML")?;

    let mut types = TypeRegistry::new();
    for (name, parent) in &raw.types {
        types.define(name.as_str(), parent.as_deref());
    }

    let mut rules = Vec::with_capacity(raw.rules.len());
    for (index, entry) in raw.rules.iter().enumerate() {
        let rule = build_rule(entry, guards, &types)
            .with_context(|| format!("rule {index}{}", label(entry)))?;
        rules.push(rule);
    }
    let rules = RuleSet::new(rules).context("invalid rule set")?;

    let cases = raw
        .cases
        .iter()
        .enumerate()
        .map(|(i, case)| case_from_json(case, &types).with_context(|| format!("case {i}")))
        .collect::<Result<Vec<_>>>()?;

    debug!(rules = rules.len(), cases = cases.len(), types = types.len(), "loaded rule file");
    Ok(RuleFile {
        rules,
        cases,
        types,
    })
}

fn label(entry: &RawRule) -> String {
    entry.name.as_ref().map(|n| format!(" ({n})")).unwrap_or_default()
}

fn build_rule(
    entry: &RawRule,
    guards: &GuardRegistry,
    types: &TypeRegistry,
) -> Result<Rule<Value>> {
    let positions = entry
        .when
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(pos, src)| {
            Pattern::parse(src, guards)
                .and_then(|pattern| pattern.check_types(types).map(|()| pattern))
                .with_context(|| format!("position {pos}: invalid pattern `{src}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    let is_wildcard = entry.otherwise.is_some() || entry.otherwise_param.is_some();
    let body_json = if is_wildcard {
        if entry.then.is_some() {
            bail!("a rule cannot have both `then` and `otherwise`");
        }
        entry.otherwise.clone().unwrap_or(serde_json::Value::Null)
    } else {
        match &entry.then {
            Some(then) => then.clone(),
            None => bail!("missing `then`"),
        }
    };
    let body = Body::from_json(&body_json, types)?;

    let rule = if is_wildcard {
        match (&entry.otherwise_param, entry.when.is_some()) {
            (Some(param), false) => {
                Rule::wildcard_named(param.as_str(), move || body.eval(&[]))
            }
            (None, false) => Rule::wildcard(move || body.eval(&[])),
            // Passed through so rule set validation reports the fault.
            (_, true) => Rule::from_signature(
                RuleSignature {
                    arity: positions.len(),
                    positions,
                    is_wildcard: true,
                },
                move |inputs| body.eval(inputs),
            ),
        }
    } else {
        Rule::new(positions, move |inputs| body.eval(inputs))
    };

    Ok(match &entry.name {
        Some(name) => rule.named(name.as_str()),
        None => rule,
    })
}

fn case_from_json(json: &serde_json::Value, types: &TypeRegistry) -> Result<Vec<Value>> {
    match json {
        serde_json::Value::Array(items) => items.iter().map(|item| Value::from_json(item, types)).collect(),
        other => bail!("a case must be an array of inputs, got {other}"),
    }
}

/// Parse one case given as JSON text, e.g. `[1, "two"]`.
pub fn parse_case(text: &str, types: &TypeRegistry) -> Result<Vec<Value>> {
    let json: serde_json::Value =
        serde_json::from_str(text).with_context(|| format!("invalid case JSON `{text}`"))?;
    case_from_json(&json, types)
}

/// Load a JSON file holding an array of cases.
pub fn load_cases(path: &Path, types: &TypeRegistry) -> Result<Vec<Vec<Value>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read cases file {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse cases file {}", path.display()))?;
    let serde_json::Value::Array(cases) = json else {
        bail!("cases file {} must hold an array of cases", path.display());
    };
    cases
        .iter()
        .enumerate()
        .map(|(i, case)| case_from_json(case, types).with_context(|| format!("case {i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Outcome;
    use crate::error::{ConfigurationFault, MatchError, PatternFault};
    use std::fs;

    fn parse(yaml: &str) -> Result<RuleFile> {
        parse_rules(yaml, &GuardRegistry::builtin())
    }

    fn fault(yaml: &str) -> MatchError {
        let err = parse(yaml).unwrap_err();
        err.chain()
            .find_map(|e| e.downcast_ref::<MatchError>().cloned())
            .unwrap_or_else(|| panic!("no MatchError in {err:#}"))
    }

    #[test]
    fn loads_rules_and_resolves() {
        let file = parse(
            "rules:\n  - name: zero\n    when: ['0']\n    then: zero\n  - when: [Number]\n    then: number\n  - otherwise: other\n",
        )
        .unwrap();
        assert_eq!(file.rules.len(), 3);
        assert_eq!(file.rules.rules()[0].name(), Some("zero"));

        let value = |input: Value| file.rules.resolve(&[input]).unwrap().into_value();
        assert_eq!(value(Value::Int(0)), Some(Value::from("zero")));
        assert_eq!(value(Value::Int(7)), Some(Value::from("number")));
        assert_eq!(value(Value::from("x")), Some(Value::from("other")));
    }

    #[test]
    fn echo_body_returns_input() {
        let file = parse("rules:\n  - when: [a, b]\n    then: $1\n").unwrap();
        let res = file.rules.resolve(&[Value::Int(1), Value::from("b")]).unwrap();
        assert_eq!(res.into_value(), Some(Value::from("b")));
    }

    #[test]
    fn structured_then_value() {
        let file = parse("rules:\n  - when: ['{x: 0, y: 0}']\n    then: {kind: origin}\n").unwrap();
        let input = Value::object([("x", Value::Int(0)), ("y", Value::Int(0))]);
        let res = file.rules.resolve(&[input]).unwrap();
        assert_eq!(
            res.outcome,
            Outcome::Matched {
                rule: 0,
                value: Value::object([("kind", Value::from("origin"))]),
            }
        );
    }

    #[test]
    fn null_otherwise_is_still_a_wildcard() {
        let file = parse("rules:\n  - when: [String]\n    then: s\n  - otherwise: null\n").unwrap();
        assert!(file.rules.wildcard().is_some());
        let res = file.rules.resolve(&[Value::Int(1)]).unwrap();
        assert_eq!(res.outcome, Outcome::Fallback { rule: 1, value: Value::Null });
    }

    #[test]
    fn named_wildcard_parameter() {
        let file = parse("rules:\n  - when: [String]\n    then: s\n  - otherwise: w\n    otherwise_param: rest\n").unwrap();
        let (_, rule) = file.rules.wildcard().unwrap();
        assert_eq!(rule.arity(), 1);
        assert_eq!(rule.param(), Some("rest"));
        assert_eq!(rule.name(), None);
    }

    #[test]
    fn named_wildcard_keeps_label_and_parameter() {
        let file = parse(
            "rules:\n  - when: [String]\n    then: s\n  - name: fallback\n    otherwise: w\n    otherwise_param: rest\n",
        )
        .unwrap();
        let (_, rule) = file.rules.wildcard().unwrap();
        assert_eq!(rule.name(), Some("fallback"));
        assert_eq!(rule.param(), Some("rest"));
    }

    #[test]
    fn unknown_custom_type_is_rejected() {
        let err = parse("types:\n  Dog: Animal\nrules:\n  - when: [Strng]\n    then: a\n  - otherwise: w\n")
            .unwrap_err();
        let fault = err.chain().find_map(|e| e.downcast_ref::<PatternFault>());
        assert_eq!(
            fault,
            Some(&PatternFault::UnknownConstructor {
                name: "Strng".to_string()
            })
        );

        let err = parse("rules:\n  - when: ['Number | Dgo']\n    then: a\n").unwrap_err();
        assert!(format!("{err:#}").contains("Dgo"), "{err:#}");
    }

    #[test]
    fn known_custom_types_are_accepted() {
        let file = parse(
            "types:\n  Dog: Animal\nrules:\n  - when: [Dog]\n    then: dog\n  - when: [Animal]\n    then: animal\n  - when: [TypeError]\n    then: type-error\n",
        )
        .unwrap();
        assert_eq!(file.rules.len(), 3);
    }

    #[test]
    fn types_and_cases() {
        let file = parse(
            "types:\n  Dog: Animal\n  Animal: ~\nrules:\n  - when: [Animal]\n    then: animal\ncases:\n  - [{$type: Dog, name: rex}]\n  - [1]\n",
        )
        .unwrap();
        assert_eq!(file.types.len(), 2);
        assert_eq!(file.cases.len(), 2);
        let res = file.rules.resolve(&file.cases[0]).unwrap();
        assert_eq!(res.into_value(), Some(Value::from("animal")));
        assert!(file.rules.resolve(&file.cases[1]).unwrap().outcome.is_no_match());
    }

    #[test]
    fn wildcard_not_last_is_fault() {
        assert_eq!(
            fault("rules:\n  - otherwise: w\n  - when: [Number]\n    then: n\n"),
            ConfigurationFault::WildcardNotLast { index: 0 }.into()
        );
    }

    #[test]
    fn wildcard_with_pattern_is_fault() {
        assert_eq!(
            fault("rules:\n  - when: [Number]\n    then: n\n  - when: [String]\n    otherwise: w\n"),
            ConfigurationFault::WildcardWithPattern { index: 1 }.into()
        );
    }

    #[test]
    fn missing_when_is_zero_arity_fault() {
        assert_eq!(
            fault("rules:\n  - then: n\n"),
            ConfigurationFault::ZeroArityRule { index: 0 }.into()
        );
    }

    #[test]
    fn empty_rules_is_fault() {
        assert_eq!(fault("cases: []\n"), ConfigurationFault::EmptyRuleSet.into());
    }

    #[test]
    fn rejects_bad_entries() {
        for yaml in [
            "rules:\n  - when: [Number]\n",
            "rules:\n  - when: [Number]\n    then: a\n    otherwise: b\n",
            "rules:\n  - when: ['{x: 1']\n    then: a\n",
            "rules:\n  - when: ['#nope']\n    then: a\n",
            "rules:\n  - when: [Number]\n    then: a\n    unknown: 1\n",
            "rules:\n  - when: [Number]\n    then: a\ncases:\n  - 5\n",
            "rules: [",
        ] {
            assert!(parse(yaml).is_err(), "expected error for {yaml:?}");
        }
    }

    #[test]
    fn error_names_rule_and_pattern() {
        let err = parse("rules:\n  - name: broken\n    when: ['[1 2]']\n    then: a\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("rule 0 (broken)"), "{msg}");
        assert!(msg.contains("`[1 2]`"), "{msg}");
    }

    #[test]
    fn load_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yml");
        fs::write(&path, "rules:\n  - when: [String]\n    then: s\n").unwrap();
        let file = load_rules(&path, &GuardRegistry::builtin()).unwrap();
        assert_eq!(file.rules.len(), 1);

        let err = load_rules(&dir.path().join("missing.yml"), &GuardRegistry::builtin()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read rule file"));
    }

    #[test]
    fn cases_file_and_inline_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, r#"[[1, "a"], [{"$regexp": "^x"}]]"#).unwrap();
        let types = TypeRegistry::new();
        let cases = load_cases(&path, &types).unwrap();
        assert_eq!(cases.len(), 2);
        assert!(matches!(cases[1][0], Value::RegExp(_)));

        assert_eq!(parse_case("[true, null]", &types).unwrap(), vec![Value::Bool(true), Value::Null]);
        assert!(parse_case("{\"a\": 1}", &types).is_err());

        fs::write(&path, "{}").unwrap();
        assert!(load_cases(&path, &types).is_err());
    }
}
