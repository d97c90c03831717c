//! Service configuration: key material location, seed storage path,
//! and the verification drift window.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::twofa::types::{AuthError, AuthErrorKind};

/// Default drift window: ±1 time step, matching the provisioning
/// service this core fronts.
pub const DEFAULT_DRIFT_WINDOW: u32 = 1;

/// Authentication core configuration.
///
/// All fields have defaults pointing into a `data/` directory next to
/// the process working directory, mirroring the deployment layout the
/// issuing tooling expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Path to the unencrypted RSA private key PEM. Loaded once at
    /// service construction, never re-read per call.
    pub private_key_path: PathBuf,
    /// Path of the seed file (64 lowercase hex chars + newline).
    pub seed_path: PathBuf,
    /// Time steps checked on either side of "now" during verification.
    pub drift_window: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            private_key_path: PathBuf::from("data/private_key.pem"),
            seed_path: PathBuf::from("data/seed.txt"),
            drift_window: DEFAULT_DRIFT_WINDOW,
        }
    }
}

impl AuthConfig {
    /// Load configuration from a JSON file. Unspecified fields fall
    /// back to their defaults.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AuthError::new(
                AuthErrorKind::Internal,
                format!("unable to read config at {}", path.display()),
            )
            .with_detail(e.to_string())
        })?;
        serde_json::from_str(&text).map_err(|e| {
            AuthError::new(AuthErrorKind::InvalidFormat, "malformed config file")
                .with_detail(e.to_string())
        })
    }
}
