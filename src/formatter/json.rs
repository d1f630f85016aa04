use std::io::Write;

use serde::Serialize;

use crate::batch::{CaseReport, Summary};
use crate::diagnostic::Diagnostic;
use crate::engine::Outcome;
use crate::formatter::Formatter;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    metadata: &'a Summary,
    cases: Vec<CaseOutput<'a>>,
}

#[derive(Serialize)]
struct CaseOutput<'a> {
    index: usize,
    inputs: Vec<serde_json::Value>,
    outcome: &'static str,
    rule: Option<usize>,
    value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    diagnostics: &'a [Diagnostic],
}

impl<'a> CaseOutput<'a> {
    fn new(report: &'a CaseReport) -> Self {
        let inputs = report.inputs.iter().map(|v| v.to_json()).collect();
        match &report.result {
            Ok(res) => {
                let outcome = match res.outcome {
                    Outcome::Matched { .. } => "matched",
                    Outcome::Fallback { .. } => "fallback",
                    Outcome::NoMatch => "no-match",
                };
                CaseOutput {
                    index: report.index,
                    inputs,
                    outcome,
                    rule: res.outcome.rule(),
                    value: res.outcome.value().map(|v| v.to_json()),
                    error: None,
                    diagnostics: &res.diagnostics,
                }
            }
            Err(e) => CaseOutput {
                index: report.index,
                inputs,
                outcome: "fault",
                rule: None,
                value: None,
                error: Some(e.to_string()),
                diagnostics: &[],
            },
        }
    }
}

impl Formatter for JsonFormatter {
    fn format_to(&self, reports: &[CaseReport], summary: &Summary, out: &mut dyn Write) {
        let output = JsonOutput {
            metadata: summary,
            cases: reports.iter().map(CaseOutput::new).collect(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                let _ = writeln!(out, "{json}");
            }
            Err(e) => tracing::error!("failed to serialize results: {e}"),
        }
    }
}
