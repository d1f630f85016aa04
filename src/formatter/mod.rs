pub mod json;
pub mod text;

use std::io::Write;

use crate::batch::{CaseReport, Summary};

pub trait Formatter {
    fn format_to(&self, reports: &[CaseReport], summary: &Summary, out: &mut dyn Write);

    fn print(&self, reports: &[CaseReport], summary: &Summary) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.format_to(reports, summary, &mut lock);
    }
}

pub fn create_formatter(format: &str) -> Box<dyn Formatter> {
    match format {
        "json" => Box::new(json::JsonFormatter),
        _ => Box::new(text::TextFormatter),
    }
}

/// Compact JSON rendering of an input tuple, e.g. `[1, "a"]`.
pub(crate) fn render_inputs(inputs: &[crate::value::Value]) -> String {
    let parts: Vec<String> = inputs.iter().map(|v| v.to_json().to_string()).collect();
    format!("[{}]", parts.join(", "))
}
