//! Sequential role startup
//!
//! Roles start in a fixed order: the codebase first so the server and
//! client have something to talk to, then the mock server, then the
//! client. Placeholder resolution has already happened by the time this
//! runs, so a start failure can only come from the launcher itself.

use std::path::Path;

use colored::Colorize;

use crate::common::{Error, Result};
use crate::lifecycle::RunState;
use crate::plan::Plan;
use crate::roles::{Launcher, Role, RoleSet};

/// Start every activated role, populating `state` as handles appear.
///
/// The first start failure propagates immediately without starting the
/// remaining roles; handles collected so far stay in `state` so the
/// caller's failure teardown can kill them.
pub async fn start_roles(
    launcher: &dyn Launcher,
    state: &mut RunState,
    plan: &Plan,
    roles: RoleSet,
    testcase: &str,
    base: &Path,
    target: Option<&str>,
) -> Result<()> {
    for role in roles.iter() {
        match role {
            Role::Codebase => {
                let handles = launcher.start_codebase(testcase, base).await?;
                state.repo = handles.repo;
                state.worker = handles.worker;
                println!("  {} {}", "✓".green(), "codebase started".dimmed());
            }
            Role::Server => {
                let config = plan.server.as_ref().ok_or_else(|| {
                    Error::role_start(Role::Server, "plan has no 'server' section")
                })?;
                state.server = Some(launcher.start_server(config, base).await?);
                println!("  {} {}", "✓".green(), "server started".dimmed());
            }
            Role::Client => {
                let config = plan.client.as_ref().ok_or_else(|| {
                    Error::role_start(Role::Client, "plan has no 'client' section")
                })?;
                state.client = launcher.start_client(config, base, target).await?;
                let note = if state.client.is_some() {
                    "client started"
                } else {
                    "client finished"
                };
                println!("  {} {}", "✓".green(), note.dimmed());
            }
        }
    }
    Ok(())
}
