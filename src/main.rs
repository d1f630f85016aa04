use std::process;

use clap::Parser;

use patmatch::cli::Args;

fn main() {
    let args = Args::parse();
    match patmatch::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(3);
        }
    }
}
