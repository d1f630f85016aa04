pub mod batch;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod pattern;
pub mod registry;
pub mod rules;
pub mod ruleset;
pub mod value;

use std::sync::Once;

use anyhow::Result;
use tracing::{debug, warn};

use batch::run_batch;
use cli::Args;
use config::{RuleFile, load_cases, load_rules, parse_case};
use formatter::create_formatter;
use rules::{build_rules, print_json, print_table};

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use engine::{Outcome, Resolution, accepts, resolve};
pub use error::{ConfigurationFault, MatchError, PatternFault};
pub use pattern::{Constructor, LengthPolicy, Literal, Pattern, ShapeConstraint};
pub use registry::{GuardRegistry, TypeRegistry};
pub use ruleset::{Rule, RuleSet, RuleSignature};
pub use value::{Class, ErrorValue, Function, Instance, Kind, Value, classify, deep_equal, same_value};

static TRACING_INIT: Once = Once::new();

/// Install the stderr log subscriber.
///
/// `debug` forces `patmatch=debug`; otherwise `RUST_LOG` is honoured, with a
/// default of `warn`. Safe to call more than once; only the first call has
/// an effect.
pub fn init_tracing(debug: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = if debug {
            EnvFilter::new("patmatch=debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .try_init();
    });
}

/// Run the command line. Returns the exit code: 0 = all cases resolved,
/// 1 = a case matched no rule under `--fail-on-no-match`, 2 = a case raised
/// a fault.
pub fn run(args: Args) -> Result<i32> {
    init_tracing(args.debug);

    let guards = GuardRegistry::builtin();
    let RuleFile {
        rules,
        cases: file_cases,
        types,
    } = load_rules(&args.rules_file, &guards)?;
    debug!(path = %args.rules_file.display(), rules = rules.len(), "rule file loaded");

    // --rules: list the loaded rules and exit
    if args.rules {
        let entries = build_rules(&rules);
        if args.format == "json" {
            print_json(&entries)?;
        } else {
            print_table(&entries);
        }
        return Ok(0);
    }

    let mut cases = match &args.cases {
        Some(path) => load_cases(path, &types)?,
        None => file_cases,
    };
    for text in &args.inline_cases {
        cases.push(parse_case(text, &types)?);
    }
    if cases.is_empty() {
        warn!("no cases to resolve");
    }

    let result = run_batch(cases, &rules);
    let formatter = create_formatter(&args.format);
    formatter.print(&result.reports, &result.summary);

    if result.summary.faults > 0 {
        Ok(2)
    } else if args.fail_on_no_match && result.summary.no_match > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
