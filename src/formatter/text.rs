use std::io::Write;

use crate::batch::{CaseReport, Summary};
use crate::engine::Outcome;
use crate::formatter::{Formatter, render_inputs};

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_to(&self, reports: &[CaseReport], summary: &Summary, out: &mut dyn Write) {
        for report in reports {
            let inputs = render_inputs(&report.inputs);
            match &report.result {
                Ok(res) => {
                    let line = match &res.outcome {
                        Outcome::Matched { rule, value } => format!("rule {rule} => {}", value.to_json()),
                        Outcome::Fallback { rule, value } => {
                            format!("fallback rule {rule} => {}", value.to_json())
                        }
                        Outcome::NoMatch => "no match".to_string(),
                    };
                    let _ = writeln!(out, "case {}: {inputs}: {line}", report.index);
                    for d in &res.diagnostics {
                        let _ = writeln!(out, "  {d}");
                    }
                }
                Err(e) => {
                    let _ = writeln!(out, "case {}: {inputs}: error: {e}", report.index);
                }
            }
        }

        let case_word = if summary.cases == 1 { "case" } else { "cases" };
        let fault_word = if summary.faults == 1 { "fault" } else { "faults" };
        let _ = writeln!(
            out,
            "\n{} {case_word} resolved: {} matched, {} fallback, {} no match, {} {fault_word}",
            summary.cases, summary.matched, summary.fallback, summary.no_match, summary.faults,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::run_batch;
    use crate::pattern::Pattern;
    use crate::registry::GuardRegistry;
    use crate::ruleset::{Rule, RuleSet};
    use crate::value::Value;

    fn render(rules: &[&str], cases: Vec<Vec<Value>>) -> String {
        let guards = GuardRegistry::builtin();
        let rules = RuleSet::new(
            rules
                .iter()
                .enumerate()
                .map(|(i, src)| {
                    Rule::new(vec![Pattern::parse(src, &guards).unwrap()], move |_| Value::Int(i as i64))
                })
                .collect(),
        )
        .unwrap();
        let result = run_batch(cases, &rules);
        let mut buf = Vec::new();
        TextFormatter.format_to(&result.reports, &result.summary, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn one_line_per_case_plus_summary() {
        let out = render(&["String", "Number"], vec![vec![Value::from("a")], vec![Value::Bool(true)]]);
        assert_eq!(
            out,
            "case 0: [\"a\"]: rule 0 => 0\n\
             case 1: [true]: no match\n\
             \n2 cases resolved: 1 matched, 0 fallback, 1 no match, 0 faults\n"
        );
    }

    #[test]
    fn diagnostics_indented_under_case() {
        let out = render(&["Number", "5"], vec![vec![Value::Int(5)]]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "case 0: [5]: rule 1 => 1");
        assert!(lines[1].starts_with("  rule 0:0: N: literal-preempted:"));
        assert!(out.ends_with("1 case resolved: 1 matched, 0 fallback, 0 no match, 0 faults\n"));
    }

    #[test]
    fn fault_reported_inline() {
        let out = render(&["String"], vec![vec![]]);
        assert!(out.starts_with("case 0: []: error: configuration fault:"), "{out}");
        assert!(out.contains("1 fault\n"));
    }
}
