//! Initialization module for creating .labflow directory structures.
//!
//! This module provides functionality to initialize a new labflow project
//! by generating a `.labflow/` directory with pre-configured templates for:
//! - Global configuration (`config.toml`)
//! - Type catalogs (`types/*.yaml`)
//! - An empty `cases/` directory for case files
//!
//! # Example
//!
//! ```no_run
//! use lf_core::init::{InitOptions, generate_labflow_structure};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_labflow_structure(options).await?;
//! println!("labflow initialized successfully!");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_labflow_structure, InitOptions};
pub use templates::{get_template, list_templates};
