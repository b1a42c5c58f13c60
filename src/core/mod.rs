//! Core functionality for fuel-log
//!
//! This module contains shared local state:
//! - Application configuration
//! - Credential storage backends
//! - The process-wide session store

pub mod config;
pub mod credentials;
pub mod session;

pub use config::{Config, CredentialBackendKind};
pub use credentials::{CredentialBackend, FileBackend, KeyringBackend, MemoryBackend};
pub use session::SessionStore;
