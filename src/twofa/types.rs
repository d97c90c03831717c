//! Core types for the authentication core.

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Seed
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The shared secret: exactly 64 lowercase hex characters (32 bytes of
/// entropy). Exactly one seed exists per deployment at any time.
///
/// Construction goes through [`Seed::parse`], which is the single
/// canonicalisation point: input is trimmed, checked against the hex
/// alphabet and lowercased. Anything else is rejected, never coerced.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    /// Canonical seed length in hex characters.
    pub const HEX_LEN: usize = 64;
    /// Decoded secret length in bytes.
    pub const BYTE_LEN: usize = 32;

    /// Validate and canonicalise candidate seed text.
    ///
    /// Trims surrounding whitespace (tolerates a trailing newline from
    /// upstream plaintext), accepts mixed case, stores lowercase.
    pub fn parse(candidate: &str) -> Result<Self, AuthError> {
        let trimmed = candidate.trim();
        if trimmed.len() != Self::HEX_LEN {
            return Err(AuthError::new(
                AuthErrorKind::InvalidFormat,
                format!("seed must be {} hex characters", Self::HEX_LEN),
            ));
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AuthError::new(
                AuthErrorKind::InvalidFormat,
                "seed contains non-hex characters",
            ));
        }
        Ok(Seed(trimmed.to_ascii_lowercase()))
    }

    /// The canonical 64-character lowercase hex text.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// The 32 raw secret bytes fed to HMAC.
    ///
    /// The HOTP key is the decoded byte form of the seed, not the hex
    /// text itself, matching standard RFC 6238 secret handling.
    pub fn key_bytes(&self) -> [u8; Self::BYTE_LEN] {
        let mut key = [0u8; Self::BYTE_LEN];
        // Infallible: the constructor guarantees 64 hex characters.
        hex::decode_to_slice(&self.0, &mut key).expect("seed invariant holds");
        key
    }
}

impl fmt::Debug for Seed {
    /// Never prints the secret itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed(<redacted>)")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generated code result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A generated TOTP code with associated timing info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// The 6-digit zero-padded code (e.g. "042871").
    pub code: String,
    /// Seconds remaining until the code expires.
    pub valid_for: u32,
    /// Total period in seconds.
    pub period: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Verification result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of verifying a candidate code against the current seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub valid: bool,
    /// How many time-steps off the match was (0 = exact, negative =
    /// an earlier step matched). Meaningless when `valid` is false.
    pub drift: i64,
}

impl VerifyResult {
    pub fn no_match() -> Self {
        Self {
            valid: false,
            drift: 0,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error kind for this crate.
///
/// `InvalidFormat` and `DecryptionFailed` are caller faults;
/// `NotProvisioned` and `Internal` are server faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthErrorKind {
    /// Malformed base64, malformed seed text, or malformed code.
    InvalidFormat,
    /// Ciphertext/key mismatch. Always reported with a generic message.
    DecryptionFailed,
    /// No seed has ever been provisioned.
    NotProvisioned,
    /// Storage corruption or I/O failure.
    Internal,
}

/// Crate-level error.
///
/// `message` is safe to surface to callers. `detail` carries the
/// underlying cause for the operator log and never appears in
/// `Display` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn new(kind: AuthErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// True when the error was caused by caller-supplied input.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self.kind,
            AuthErrorKind::InvalidFormat | AuthErrorKind::DecryptionFailed
        )
    }
}

impl From<AuthError> for String {
    fn from(e: AuthError) -> String {
        e.to_string()
    }
}
