//! Case state.
//!
//! This module provides:
//! - Case snapshots taken from a Type's stage templates
//! - The jump policy table and stage transitions
//! - Progress calculation
//! - Delivery and approval state
//! - CaseManager for coordinating commands on cases

pub mod delivery;
pub mod manager;
pub mod policy;
pub mod progress;
pub mod snapshot;
