//! Shared plumbing for the LwM2M bootstrap security workspace.
//!
//! This crate provides the error type, logging initialisation and
//! configuration loading used by the bootstrap security store and its
//! command-line front end.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{BootstrapStoreConfig, LogFormat, DEFAULT_TELEMETRY_KEY};
pub use error::{CoreError, CoreResult};
