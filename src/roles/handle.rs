//! Killable handles for started role processes

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// An opaque reference to a running role process.
///
/// The child itself is owned by a supervision task; the handle holds a
/// one-shot kill signal to that task. Repeated kills, and kills after
/// the process already exited, are no-ops.
#[derive(Debug)]
pub struct RoleHandle {
    name: String,
    kill: Option<oneshot::Sender<()>>,
    supervisor: Option<JoinHandle<()>>,
}

impl RoleHandle {
    pub fn new(name: impl Into<String>, kill: oneshot::Sender<()>) -> Self {
        Self {
            name: name.into(),
            kill: Some(kill),
            supervisor: None,
        }
    }

    /// Attach the supervision task so teardown can wait for the child
    /// to be reaped before the process exits.
    pub fn with_supervisor(mut self, supervisor: JoinHandle<()>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the kill signal has not been sent yet
    pub fn is_live(&self) -> bool {
        self.kill.is_some()
    }

    /// Signal the supervision task to kill the process.
    ///
    /// The signal is sent at most once; a supervision task that already
    /// finished simply never sees it.
    pub fn kill(&mut self) {
        if let Some(kill) = self.kill.take() {
            tracing::debug!(role = %self.name, "kill requested");
            let _ = kill.send(());
        }
    }

    /// Wait for the supervision task to finish reaping the child.
    pub async fn reaped(&mut self) {
        if let Some(supervisor) = self.supervisor.take() {
            let _ = supervisor.await;
        }
    }
}
