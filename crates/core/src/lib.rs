//! # lf-core
//!
//! Case workflow engine for labflow.
//!
//! This crate provides:
//! - Configuration loading from the `.labflow/` directory
//! - The Type catalog and its stage template commands
//! - Case snapshots, jump policies and progress calculation
//! - Delivery and doctor approval of finished cases
//! - Case persistence with optimistic versioning
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`template_store`]: Types and stage templates
//! - [`engine`]: Command evaluation on a single case
//! - [`state`]: Case state and the [`CaseManager`](state::manager::CaseManager)
//! - [`repository`]: Case storage
//! - [`init`]: Project scaffolding

pub mod config;
pub mod engine;
pub mod error;
pub mod init;
pub mod ports;
pub mod repository;
pub mod state;
pub mod template_store;

pub use error::{ValidationError, WorkflowError, WorkflowResult};
