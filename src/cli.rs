use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "patmatch",
    version,
    about = "Resolve input tuples against an ordered set of pattern rules"
)]
pub struct Args {
    /// YAML rule file
    #[arg(value_name = "RULES")]
    pub rules_file: PathBuf,

    /// JSON file holding an array of input tuples (defaults to the rule file's `cases`)
    #[arg(value_name = "CASES")]
    pub cases: Option<PathBuf>,

    /// Additional input tuple as a JSON array (repeatable)
    #[arg(long = "case", value_name = "JSON")]
    pub inline_cases: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// List the loaded rules, then exit
    #[arg(long)]
    pub rules: bool,

    /// Exit with code 1 when any case matches no rule
    #[arg(long)]
    pub fail_on_no_match: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}
