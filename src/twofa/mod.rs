//! Two-factor authentication core: sub-modules.

pub mod types;
pub mod core;
pub mod crypto;
pub mod storage;
pub mod config;
pub mod service;

// Re-export top-level items for convenience.
pub use types::*;
pub use config::AuthConfig;
pub use service::{AuthService, AuthServiceState};
pub use storage::{FileSeedStore, SeedStore};
