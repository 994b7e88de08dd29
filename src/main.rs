//! Testbed - scenario-driven test orchestration harness
//!
//! Loads the plan for a named test case, resolves its environment
//! placeholders, and runs the selected roles as independent processes.

use clap::Parser;
use testbed::cli::{self, Args};
use testbed::common::logging;

#[tokio::main]
async fn main() {
    logging::init();

    let args = Args::parse();

    if let Err(e) = cli::run(args).await {
        eprintln!("Error: {e}");
        let mut cause = std::error::Error::source(&e);
        while let Some(c) = cause {
            eprintln!("  caused by: {c}");
            cause = std::error::Error::source(c);
        }
        std::process::exit(1);
    }
}
