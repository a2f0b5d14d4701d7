//! # lf-protocol
//!
//! Data model and protocol definitions for labflow.
//!
//! This crate defines all shared data structures used for:
//! - Type catalogs and their stage templates (YAML files under `.labflow/types/`)
//! - Runtime cases with their stage snapshot, delivery and approval state
//! - Jump policies that govern stage moves
//! - Command/event envelopes exchanged with callers of the core
//!
//! ## Modules
//!
//! - [`template_models`]: Types and stage templates
//! - [`case_models`]: Cases, stages, delivery and approval
//! - [`policy_models`]: Jump policies and the initial stage policy
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Operations and Events for callers of the core
//!
//! ## Design Principles
//!
//! - Plain data: no workflow logic lives here, only shapes and names
//! - TypeScript generation: All types derive `TS` for front-end clients
//! - Independent compilation: No dependencies on other labflow crates

pub mod case_models;
pub mod config_models;
pub mod ipc;
pub mod policy_models;
pub mod template_models;

// Re-export all public types for convenience
pub use case_models::*;
pub use config_models::*;
pub use ipc::*;
pub use policy_models::*;
pub use template_models::*;
