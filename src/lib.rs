//! Scenario-driven test orchestration harness
//!
//! Given a named test case, loads its declarative plan, resolves
//! environment placeholders, launches the requested roles as child
//! processes, and tears everything down after a configured duration or
//! on the first uncaught fault.

pub mod cli;
pub mod common;
pub mod lifecycle;
pub mod orchestrator;
pub mod plan;
pub mod roles;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use plan::Plan;
