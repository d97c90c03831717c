//! # seedauth – Single-Principal TOTP Authentication Core
//!
//! Provisioning and verification core for a two-factor authentication
//! service holding exactly one secret seed:
//!
//! - **RFC 4226 / 6238** – HOTP & TOTP generation with HMAC-SHA1,
//!   6-digit codes, 30-second time steps, configurable drift window
//! - **RSA-OAEP provisioning** – the seed arrives as a base64 envelope
//!   encrypted to the service's public key (OAEP with SHA-256 as both
//!   digest and MGF1 hash, empty label) and is decrypted with the
//!   resident private key
//! - **Atomic seed store** – a single durable cell replaced via
//!   temp-write-then-rename, so readers never observe a torn value
//! - **Issuer-side helpers** – OAEP encryption, RSA key-pair generation
//!   and PEM serialisation for the tooling that mints envelopes

pub mod twofa;

pub use twofa::service::{AuthService, AuthServiceState};
pub use twofa::types::{AuthError, AuthErrorKind, GeneratedCode, Seed, VerifyResult};
