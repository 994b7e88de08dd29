//! CLI surface and top-level run flow
//!
//! Parses the testcase argument and role flags, then drives plan
//! loading, placeholder resolution, role startup, and the two
//! termination paths.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::common::{Error, Result};
use crate::lifecycle::{self, Lifecycle, Outcome, RunState};
use crate::orchestrator;
use crate::plan::Plan;
use crate::roles::{ProcessLauncher, RoleSet};

#[derive(Parser, Debug)]
#[command(name = "testbed", about = "Scenario-driven test orchestration harness")]
#[command(version, long_about = None)]
pub struct Args {
    /// Test case to run (directory containing plan.yaml)
    pub testcase: String,

    /// Run the codebase under test
    #[arg(short, long)]
    pub pipy: bool,

    /// Run the test client
    #[arg(short, long)]
    pub client: bool,

    /// Run the mock server
    #[arg(short, long)]
    pub server: bool,

    /// Target address handed to the client, overriding the plan
    #[arg(long)]
    pub target: Option<String>,

    /// Directory containing the test case directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

impl Args {
    /// Activation set derived from the role flags
    pub fn roles(&self) -> RoleSet {
        RoleSet::from_flags(self.pipy, self.server, self.client)
    }
}

/// Run one test case to completion.
///
/// Returns `Ok(())` only for the timed-completion path; every other
/// outcome surfaces as an error for the binary to report.
pub async fn run(args: Args) -> Result<()> {
    let base = args.root.join(&args.testcase);
    let mut plan = Plan::load(&base)?;
    plan.resolve()?;

    let roles = args.roles();
    tracing::debug!(?roles, testcase = %args.testcase, "activation set");

    let (fault_tx, fault_rx) = lifecycle::fault_channel();
    let launcher = ProcessLauncher::new(fault_tx);

    println!("{} {}", "Running:".blue().bold(), args.testcase.white().bold());

    let mut state = RunState::default();
    if let Err(e) = orchestrator::start_roles(
        &launcher,
        &mut state,
        &plan,
        roles,
        &args.testcase,
        &base,
        args.target.as_deref(),
    )
    .await
    {
        state.teardown().await;
        return Err(e);
    }

    // The timer is armed only when the client role is active and its
    // config declares a positive duration.
    let timer = if roles.client() {
        plan.client_duration()
    } else {
        None
    };

    match Lifecycle::new(state, fault_rx, timer).run().await {
        Outcome::Completed => {
            println!("Done.");
            Ok(())
        }
        Outcome::Faulted(fault) => Err(Error::Fault {
            role: fault.source,
            message: fault.error.to_string(),
        }),
    }
}
