//! `--rules` command: list the rules of a loaded rule file.
//!
//! Shows index, name, arity, the pattern at each position, and whether the
//! rule is the wildcard fallback.

use std::io::Write;

use serde::Serialize;

use crate::ruleset::RuleSet;

#[derive(Debug, Serialize)]
pub struct RuleEntry {
    pub index: usize,
    pub name: Option<String>,
    pub arity: usize,
    pub patterns: Vec<String>,
    pub wildcard: bool,
}

pub fn build_rules<R>(rules: &RuleSet<R>) -> Vec<RuleEntry> {
    rules
        .rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| RuleEntry {
            index,
            name: rule.name().map(str::to_string),
            arity: rule.arity(),
            patterns: rule.positions().iter().map(|p| p.to_string()).collect(),
            wildcard: rule.is_wildcard(),
        })
        .collect()
}

pub fn write_table(rules: &[RuleEntry], out: &mut dyn Write) {
    let _ = writeln!(out, "{:<6} {:<20} {:<6} Patterns", "Index", "Name", "Arity");
    let _ = writeln!(out, "{}", "-".repeat(60));

    for rule in rules {
        let name = rule.name.as_deref().unwrap_or("-");
        let patterns = if rule.wildcard {
            "(otherwise)".to_string()
        } else {
            rule.patterns.join(", ")
        };
        let _ = writeln!(out, "{:<6} {:<20} {:<6} {}", rule.index, name, rule.arity, patterns);
    }

    let _ = writeln!(out);
    let total = rules.len();
    let wildcard = if rules.iter().any(|r| r.wildcard) {
        "with"
    } else {
        "without"
    };
    let _ = writeln!(out, "{total} rules total, {wildcard} a wildcard rule");
}

/// Print rules as a table to stdout.
pub fn print_table(rules: &[RuleEntry]) {
    let stdout = std::io::stdout();
    write_table(rules, &mut stdout.lock());
}

/// Print rules as JSON to stdout.
pub fn print_json(rules: &[RuleEntry]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(rules)?);
    Ok(())
}
