use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::engine::{Outcome, Resolution};
use crate::error::MatchError;
use crate::ruleset::RuleSet;
use crate::value::Value;

/// The result of resolving one case.
#[derive(Debug)]
pub struct CaseReport {
    pub index: usize,
    pub inputs: Vec<Value>,
    pub result: Result<Resolution<Value>, MatchError>,
}

impl CaseReport {
    pub fn is_no_match(&self) -> bool {
        matches!(&self.result, Ok(res) if res.outcome.is_no_match())
    }

    pub fn is_fault(&self) -> bool {
        self.result.is_err()
    }
}

/// Counts over a batch, by outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub cases: usize,
    pub matched: usize,
    pub fallback: usize,
    pub no_match: usize,
    pub faults: usize,
    pub diagnostics: usize,
}

pub struct BatchResult {
    /// One report per case, in input order.
    pub reports: Vec<CaseReport>,
    pub summary: Summary,
}

/// Resolve every case against `rules` in parallel.
///
/// The rule set is shared read-only across workers; each case resolves
/// independently.
pub fn run_batch(cases: Vec<Vec<Value>>, rules: &RuleSet<Value>) -> BatchResult {
    let start = Instant::now();

    let mut reports: Vec<CaseReport> = cases
        .into_par_iter()
        .enumerate()
        .map(|(index, inputs)| {
            let result = rules.resolve(&inputs);
            CaseReport {
                index,
                inputs,
                result,
            }
        })
        .collect();
    reports.sort_by_key(|r| r.index);

    let summary = summarize(&reports);
    debug!(
        cases = summary.cases,
        faults = summary.faults,
        elapsed_us = start.elapsed().as_micros() as u64,
        "batch resolved"
    );
    BatchResult { reports, summary }
}

fn summarize(reports: &[CaseReport]) -> Summary {
    let mut summary = Summary {
        cases: reports.len(),
        ..Summary::default()
    };
    for report in reports {
        match &report.result {
            Ok(res) => {
                summary.diagnostics += res.diagnostics.len();
                match res.outcome {
                    Outcome::Matched { .. } => summary.matched += 1,
                    Outcome::Fallback { .. } => summary.fallback += 1,
                    Outcome::NoMatch => summary.no_match += 1,
                }
            }
            Err(_) => summary.faults += 1,
        }
    }
    summary
}
