//! Run state and termination paths
//!
//! Two independent triggers converge on one idempotent teardown: a
//! single-shot timer derived from the client's configured duration, and
//! a fault channel that role supervision tasks report into. Only one
//! trigger wins; the teardown latch makes the loser a no-op.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::common::Error;
use crate::roles::RoleHandle;

/// A fault reported from a role's asynchronous activity after startup
#[derive(Debug)]
pub struct Fault {
    /// Which role (or subsystem) raised the fault
    pub source: String,
    pub error: Error,
}

/// Sending half of the fault channel, handed out to launchers
#[derive(Clone, Debug)]
pub struct FaultSender(mpsc::UnboundedSender<Fault>);

impl FaultSender {
    pub fn report(&self, source: impl Into<String>, error: Error) {
        // A closed channel means the run is already over.
        let _ = self.0.send(Fault {
            source: source.into(),
            error,
        });
    }
}

pub fn fault_channel() -> (FaultSender, mpsc::UnboundedReceiver<Fault>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FaultSender(tx), rx)
}

/// Live handles for one invocation, one slot per role process
#[derive(Debug, Default)]
pub struct RunState {
    pub repo: Option<RoleHandle>,
    pub worker: Option<RoleHandle>,
    pub server: Option<RoleHandle>,
    pub client: Option<RoleHandle>,
    torn_down: bool,
}

impl RunState {
    /// Kill every live handle and wait for the children to be reaped.
    ///
    /// Returns false if teardown already ran; each kill is itself a
    /// no-op on a handle that was killed or already exited.
    pub async fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        for handle in self.slots() {
            handle.kill();
        }
        for handle in self.slots() {
            handle.reaped().await;
        }
        true
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn live_handles(&self) -> usize {
        [&self.repo, &self.worker, &self.server, &self.client]
            .into_iter()
            .flatten()
            .filter(|handle| handle.is_live())
            .count()
    }

    fn slots(&mut self) -> impl Iterator<Item = &mut RoleHandle> + '_ {
        [
            self.worker.as_mut(),
            self.repo.as_mut(),
            self.server.as_mut(),
            self.client.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

/// How a run ended
#[derive(Debug)]
pub enum Outcome {
    /// The timed teardown fired after the configured duration
    Completed,
    /// A fault reached the core and forced teardown
    Faulted(Fault),
}

/// Owns the run state after startup and drives it to a terminal state
pub struct Lifecycle {
    state: RunState,
    faults: mpsc::UnboundedReceiver<Fault>,
    timer: Option<Duration>,
}

impl Lifecycle {
    pub fn new(
        state: RunState,
        faults: mpsc::UnboundedReceiver<Fault>,
        timer: Option<Duration>,
    ) -> Self {
        Self {
            state,
            faults,
            timer,
        }
    }

    /// Wait for the first termination trigger, then tear down.
    ///
    /// With no timer armed and no fault sources left, this parks forever
    /// and the run relies on external termination.
    pub async fn run(mut self) -> Outcome {
        let armed = self.timer.is_some();
        if let Some(duration) = self.timer {
            tracing::info!(seconds = duration.as_secs_f64(), "timed teardown armed");
        }
        let sleep = tokio::time::sleep(self.timer.unwrap_or(Duration::ZERO));
        tokio::pin!(sleep);
        let mut faults_open = true;

        loop {
            tokio::select! {
                _ = &mut sleep, if armed => {
                    self.state.teardown().await;
                    tracing::info!("duration elapsed, all roles stopped");
                    return Outcome::Completed;
                }
                fault = self.faults.recv(), if faults_open => match fault {
                    Some(fault) => {
                        tracing::error!(
                            source = %fault.source,
                            error = %fault.error,
                            "fault reached the core, tearing down"
                        );
                        self.state.teardown().await;
                        return Outcome::Faulted(fault);
                    }
                    // All senders dropped; keep waiting on the timer alone.
                    None => faults_open = false,
                },
                else => {
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}
