//! Role identities, activation, and process handles

mod handle;
mod launcher;
mod process;

pub use handle::RoleHandle;
pub use launcher::{CodebaseHandles, Launcher};
pub use process::ProcessLauncher;

use std::fmt;

/// One of the three cooperating processes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The codebase under test
    Codebase,
    /// The mock server
    Server,
    /// The load-generating client
    Client,
}

impl Role {
    /// Startup order. The codebase must be reachable before the server
    /// and client attempt to interact with it.
    pub const IN_ORDER: [Role; 3] = [Role::Codebase, Role::Server, Role::Client];

    pub fn name(self) -> &'static str {
        match self {
            Role::Codebase => "codebase",
            Role::Server => "server",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which roles a run activates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleSet {
    codebase: bool,
    server: bool,
    client: bool,
}

impl RoleSet {
    /// Build the activation set from the CLI flags.
    ///
    /// No flag at all means "run everything"; any explicit flag restricts
    /// the run to exactly the flagged roles.
    pub fn from_flags(codebase: bool, server: bool, client: bool) -> Self {
        if !codebase && !server && !client {
            Self {
                codebase: true,
                server: true,
                client: true,
            }
        } else {
            Self {
                codebase,
                server,
                client,
            }
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Codebase => self.codebase,
            Role::Server => self.server,
            Role::Client => self.client,
        }
    }

    pub fn client(&self) -> bool {
        self.client
    }

    /// Activated roles in startup order
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::IN_ORDER.into_iter().filter(|role| self.contains(*role))
    }
}
