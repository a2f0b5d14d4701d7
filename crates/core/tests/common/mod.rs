//! Common test utilities and helpers for workflow tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (sample Types, projects, managers)
//! - Custom assertions on events and cases
//! - A repository that fails on demand

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
