//! Host-process service around the [`nivis`] generators: a closed set of
//! id generation algorithms, clock maintenance for the generators that
//! need it, and file-backed deployment configuration.
//!
//! The binary in this crate wires the pieces to signals and logging; hosts
//! embedding the service construct an [`IdManager`] and drive
//! [`IdManager::run`] themselves.

pub mod config;
pub mod error;
pub mod maintenance;
pub mod manager;

pub use config::{ConfigError, ConfigStore, ServiceConfig};
pub use error::{Error, Result};
pub use manager::{Algorithm, IdManager};
