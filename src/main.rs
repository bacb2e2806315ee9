//! regress - regression test runner for script interpreters
//!
//! Runs a program under test against a directory of scenario scripts and
//! compares its output and exit code with the expectations stored next to
//! each script.

use clap::Parser;
use regress::commands::Args;
use regress::{cli, common::logging};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_cli(args.verbose);

    match cli::run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_configuration() {
                eprintln!("Run 'regress --help' for usage.");
            }
            std::process::exit(2);
        }
    }
}
