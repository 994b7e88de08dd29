//! Start contract consumed by the orchestrator
//!
//! The concrete startup routines for the three roles live behind this
//! trait; the orchestrator only needs killable handles back.

use std::path::Path;

use async_trait::async_trait;
use serde_yaml::Value;

use super::RoleHandle;
use crate::common::Result;

/// Handles produced by starting the codebase under test.
///
/// Depending on the test case either process may be absent: some run a
/// repo service only, some a standalone worker only.
#[derive(Debug, Default)]
pub struct CodebaseHandles {
    pub repo: Option<RoleHandle>,
    pub worker: Option<RoleHandle>,
}

#[async_trait]
pub trait Launcher: Send + Sync {
    /// Start the codebase under test for `testcase`.
    async fn start_codebase(&self, testcase: &str, base: &Path) -> Result<CodebaseHandles>;

    /// Start the mock server from its resolved config subtree.
    async fn start_server(&self, config: &Value, base: &Path) -> Result<RoleHandle>;

    /// Start the test client from its resolved config subtree.
    ///
    /// Returns `None` when the client runs to completion synchronously.
    async fn start_client(
        &self,
        config: &Value,
        base: &Path,
        target: Option<&str>,
    ) -> Result<Option<RoleHandle>>;
}
