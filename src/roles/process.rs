//! Process-spawning launcher
//!
//! Each role runs as an independent child process. Server and client
//! commands come from the plan's `command` key and run through `sh -c`
//! with the test case directory as working directory. The codebase role
//! runs the conventional `repo.sh` / `worker.sh` scripts when present.
//!
//! Every spawned child is owned by a supervision task that waits on it
//! and reports abnormal exits into the fault channel; the returned
//! handle signals that task to kill the child.

use std::path::Path;

use async_trait::async_trait;
use serde_yaml::Value;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;

use super::{CodebaseHandles, Launcher, Role, RoleHandle};
use crate::common::{Error, Result};
use crate::lifecycle::FaultSender;

/// Script the codebase role runs to serve its configuration repo
const REPO_SCRIPT: &str = "repo.sh";
/// Script the codebase role runs to start the worker process
const WORKER_SCRIPT: &str = "worker.sh";

pub struct ProcessLauncher {
    faults: FaultSender,
}

impl ProcessLauncher {
    pub fn new(faults: FaultSender) -> Self {
        Self { faults }
    }

    fn shell_command(command: &str, base: &Path, target: Option<&str>) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(base);
        // The target override reaches the command line as $TARGET.
        if let Some(target) = target {
            cmd.env("TARGET", target);
        }
        cmd
    }

    fn spawn(&self, name: &str, mut cmd: Command) -> Result<RoleHandle> {
        let child = cmd.spawn().map_err(|e| Error::role_start(name, e))?;
        tracing::info!(role = name, "process started");
        Ok(self.supervise(name, child))
    }

    /// Hand the child to a supervision task and return its kill handle.
    fn supervise(&self, name: &str, mut child: Child) -> RoleHandle {
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let faults = self.faults.clone();
        let role = name.to_string();

        let supervisor = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => {
                        tracing::info!(role = %role, "process exited cleanly");
                    }
                    Ok(status) => {
                        faults.report(
                            role.clone(),
                            Error::RoleExited {
                                role,
                                status: status.to_string(),
                            },
                        );
                    }
                    Err(e) => {
                        faults.report(role, Error::Io(e));
                    }
                },
                // Fires on a kill request, or when the handle is dropped.
                _ = kill_rx => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    tracing::debug!(role = %role, "process killed");
                }
            }
        });

        RoleHandle::new(name, kill_tx).with_supervisor(supervisor)
    }

    fn spawn_script(&self, name: &str, base: &Path, script: &str) -> Result<Option<RoleHandle>> {
        let path = base.join(script);
        if !path.exists() {
            return Ok(None);
        }
        let mut cmd = Command::new("sh");
        cmd.arg(&path).current_dir(base);
        self.spawn(name, cmd).map(Some)
    }

    fn command_of(config: &Value) -> Option<&str> {
        config.get("command").and_then(Value::as_str)
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn start_codebase(&self, testcase: &str, base: &Path) -> Result<CodebaseHandles> {
        let repo = self.spawn_script("repo", base, REPO_SCRIPT)?;
        let worker = self.spawn_script("worker", base, WORKER_SCRIPT)?;
        if repo.is_none() && worker.is_none() {
            tracing::warn!(testcase, "no repo.sh or worker.sh, codebase not started");
        }
        Ok(CodebaseHandles { repo, worker })
    }

    async fn start_server(&self, config: &Value, base: &Path) -> Result<RoleHandle> {
        let command = Self::command_of(config)
            .ok_or_else(|| Error::role_start(Role::Server, "config has no 'command'"))?;
        self.spawn(Role::Server.name(), Self::shell_command(command, base, None))
    }

    async fn start_client(
        &self,
        config: &Value,
        base: &Path,
        target: Option<&str>,
    ) -> Result<Option<RoleHandle>> {
        let Some(command) = Self::command_of(config) else {
            tracing::debug!("client config has no 'command', nothing to start");
            return Ok(None);
        };

        let run_once = config
            .get("oneshot")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if run_once {
            // Synchronous client: runs to completion before any timer.
            let status = Self::shell_command(command, base, target)
                .status()
                .await
                .map_err(|e| Error::role_start(Role::Client, e))?;
            if !status.success() {
                return Err(Error::role_start(
                    Role::Client,
                    format!("command exited with {status}"),
                ));
            }
            return Ok(None);
        }

        self.spawn(
            Role::Client.name(),
            Self::shell_command(command, base, target),
        )
        .map(Some)
    }
}
