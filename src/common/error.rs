//! Error types for the harness
//!
//! Configuration and variable errors abort the run before any role
//! starts; start and runtime faults are recovered only far enough to
//! guarantee cleanup.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("failed to load plan '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    #[error("variable '{0}' not found in env")]
    VariableNotFound(String),

    // === Role Errors ===
    #[error("failed to start {role}: {reason}")]
    RoleStart { role: String, reason: String },

    #[error("{role} exited unexpectedly ({status})")]
    RoleExited { role: String, status: String },

    #[error("uncaught fault from {role}: {message}")]
    Fault { role: String, message: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a config load error for a plan path
    pub fn config_load(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::ConfigLoad {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a role start error
    pub fn role_start(role: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::RoleStart {
            role: role.to_string(),
            reason: reason.to_string(),
        }
    }
}
