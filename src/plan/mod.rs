//! Plan loading and resolution
//!
//! A plan is the declarative description of one test scenario: variable
//! defaults under `env`, plus free-form config subtrees for the mock
//! server and the test client. It is loaded once per run and mutated in
//! place only by placeholder resolution.

pub mod template;

pub use template::VarTable;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_yaml::Value;

use crate::common::{Error, Result};

/// File name of the plan inside a test case directory
pub const PLAN_FILE: &str = "plan.yaml";

/// One test scenario's declarative plan
#[derive(Debug, Default, Deserialize)]
pub struct Plan {
    /// Variable defaults, overridable by same-named environment variables
    #[serde(default)]
    pub env: BTreeMap<String, Value>,

    /// Mock server config, handed to the server launcher after resolution
    #[serde(default)]
    pub server: Option<Value>,

    /// Client config, handed to the client launcher after resolution
    #[serde(default)]
    pub client: Option<Value>,
}

impl Plan {
    /// Load the plan file from a test case directory.
    pub fn load(base: &Path) -> Result<Self> {
        let path = base.join(PLAN_FILE);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::config_load(path.display(), e))?;
        serde_yaml::from_str(&content).map_err(|e| Error::config_load(path.display(), e))
    }

    /// Substitute `${NAME}` placeholders in the server and client
    /// subtrees.
    ///
    /// Must complete before any role starts, so a missing variable never
    /// leaves a partially-started scenario behind.
    pub fn resolve(&mut self) -> Result<()> {
        let vars = VarTable::from_process_env(&self.env);
        if let Some(server) = self.server.as_mut() {
            template::resolve(server, &vars)?;
        }
        if let Some(client) = self.client.as_mut() {
            template::resolve(client, &vars)?;
        }
        Ok(())
    }

    /// Client-declared run duration, if any.
    ///
    /// Zero and negative values mean "no timer".
    pub fn client_duration(&self) -> Option<Duration> {
        let secs = self.client.as_ref()?.get("duration")?.as_f64()?;
        if secs > 0.0 {
            Some(Duration::from_secs_f64(secs))
        } else {
            None
        }
    }
}
