//! High-level orchestrator — owns the loaded private key and the seed
//! store, exposes the transport-agnostic operations the routing layer
//! consumes: provision, generate, verify.

use std::sync::Arc;

use rsa::RsaPrivateKey;

use crate::twofa::config::AuthConfig;
use crate::twofa::core;
use crate::twofa::crypto;
use crate::twofa::storage::{FileSeedStore, SeedStore};
use crate::twofa::types::*;

/// Shared service handle. All operations take `&self`; the store's
/// atomicity carries the concurrency guarantees, so no outer lock is
/// needed.
pub type AuthServiceState = Arc<AuthService>;

/// Central authentication service.
pub struct AuthService {
    store: Box<dyn SeedStore>,
    /// Loaded once at construction, resident for the process lifetime.
    private_key: RsaPrivateKey,
    drift_window: u32,
}

impl AuthService {
    /// Build the service from configuration: loads the private key PEM
    /// and attaches a file-backed store at the configured path.
    pub fn from_config(config: &AuthConfig) -> Result<AuthServiceState, AuthError> {
        let private_key = crypto::load_private_key_file(&config.private_key_path)?;
        let store = FileSeedStore::new(config.seed_path.clone());
        Ok(Arc::new(Self::with_parts(
            Box::new(store),
            private_key,
            config.drift_window,
        )))
    }

    /// Assemble a service from explicit parts. Seam for tests and for
    /// alternative store backends.
    pub fn with_parts(store: Box<dyn SeedStore>, private_key: RsaPrivateKey, drift_window: u32) -> Self {
        Self {
            store,
            private_key,
            drift_window,
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Provisioning
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Decrypt, validate and durably store a seed envelope, replacing
    /// any previously provisioned seed.
    pub fn provision_seed(&self, encrypted_seed_b64: &str) -> Result<Seed, AuthError> {
        let plaintext = crypto::decrypt_seed(encrypted_seed_b64, &self.private_key)
            .map_err(|e| {
                log::warn!("seed provisioning rejected: {}", e.detail.as_deref().unwrap_or(&e.message));
                e
            })?;
        let seed = Seed::parse(&plaintext)?;
        self.store.put(&seed)?;
        log::info!("seed provisioned");
        Ok(seed)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Code generation / verification
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Generate the current code together with its remaining validity.
    pub fn generate_code(&self) -> Result<GeneratedCode, AuthError> {
        self.generate_code_at(core::current_unix_time())
    }

    /// Generate the code for an explicit timestamp.
    pub fn generate_code_at(&self, unix_seconds: u64) -> Result<GeneratedCode, AuthError> {
        let seed = self.store.get()?;
        Ok(GeneratedCode {
            code: core::generate_at(&seed, unix_seconds),
            valid_for: core::seconds_remaining_at(unix_seconds),
            period: core::PERIOD_SECS as u32,
        })
    }

    /// Verify a candidate code against the current seed.
    ///
    /// A malformed candidate yields `valid: false`; only a missing
    /// seed (or storage failure) is an error.
    pub fn verify_code(&self, candidate: &str) -> Result<VerifyResult, AuthError> {
        self.verify_code_at(candidate, core::current_unix_time())
    }

    /// Verify against an explicit timestamp.
    pub fn verify_code_at(&self, candidate: &str, unix_seconds: u64) -> Result<VerifyResult, AuthError> {
        let seed = self.store.get()?;
        let result = core::verify_at(&seed, candidate, self.drift_window, unix_seconds);
        if !result.valid {
            log::debug!("code verification failed");
        }
        Ok(result)
    }

    /// Whether a seed has ever been provisioned.
    pub fn is_provisioned(&self) -> bool {
        self.store.get().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPublicKey;

    const HEX64: &str = "a0cad79507e3b29bb6ad4b6f2fae762f21237a5a672b97ed5389e4e1c2a18b2a";

    fn keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
        static KP: std::sync::OnceLock<(RsaPrivateKey, RsaPublicKey)> = std::sync::OnceLock::new();
        KP.get_or_init(|| crypto::generate_keypair(2048).unwrap())
    }

    fn service(dir: &std::path::Path) -> AuthService {
        let (priv_key, _) = keypair();
        AuthService::with_parts(
            Box::new(FileSeedStore::new(dir.join("seed.txt"))),
            priv_key.clone(),
            1,
        )
    }

    fn envelope_for(seed_hex: &str) -> String {
        let (_, pub_key) = keypair();
        crypto::encrypt_seed(seed_hex, pub_key).unwrap()
    }

    #[test]
    fn provision_then_generate_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());

        let seed = svc.provision_seed(&envelope_for(HEX64)).unwrap();
        assert_eq!(seed.as_hex(), HEX64);

        let t = 1_700_000_000;
        let generated = svc.generate_code_at(t).unwrap();
        assert_eq!(generated.code.len(), 6);
        assert_eq!(generated.period, 30);
        assert!(generated.valid_for >= 1 && generated.valid_for <= 30);

        let vr = svc.verify_code_at(&generated.code, t).unwrap();
        assert!(vr.valid);
        assert_eq!(vr.drift, 0);
    }

    #[test]
    fn generate_before_provision_fails() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let err = svc.generate_code().unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::NotProvisioned);
        assert!(!svc.is_provisioned());
    }

    #[test]
    fn verify_before_provision_fails() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let err = svc.verify_code("123456").unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::NotProvisioned);
    }

    #[test]
    fn verify_malformed_code_is_false_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.provision_seed(&envelope_for(HEX64)).unwrap();
        for bad in ["", "12345", "abcdef", "1234567"] {
            let vr = svc.verify_code(bad).unwrap();
            assert!(!vr.valid);
        }
    }

    #[test]
    fn verify_accepts_adjacent_step_with_default_window() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.provision_seed(&envelope_for(HEX64)).unwrap();

        let t = 1_700_000_000;
        let code = svc.generate_code_at(t).unwrap().code;
        assert!(svc.verify_code_at(&code, t + 30).unwrap().valid);
        assert!(!svc.verify_code_at(&code, t + 90).unwrap().valid);
    }

    #[test]
    fn provision_rejects_bad_base64() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let err = svc.provision_seed("%%%not-base64%%%").unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidFormat);
    }

    #[test]
    fn provision_rejects_wrong_key_ciphertext() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let (_, other_pub) = crypto::generate_keypair(2048).unwrap();
        let foreign = crypto::encrypt_seed(HEX64, &other_pub).unwrap();
        let err = svc.provision_seed(&foreign).unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::DecryptionFailed);
        assert!(!svc.is_provisioned());
    }

    #[test]
    fn provision_rejects_non_seed_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let envelope = envelope_for("definitely not sixty-four hex characters");
        let err = svc.provision_seed(&envelope).unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidFormat);
        assert!(!svc.is_provisioned());
    }

    #[test]
    fn reprovision_overwrites_seed() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let other: String = HEX64.chars().rev().collect();

        svc.provision_seed(&envelope_for(HEX64)).unwrap();
        svc.provision_seed(&envelope_for(&other)).unwrap();

        let t = 1_700_000_000;
        let code = svc.generate_code_at(t).unwrap().code;
        assert_eq!(code, core::generate_at(&Seed::parse(&other).unwrap(), t));
    }

    #[test]
    fn provision_lowercases_mixed_case_seed() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let seed = svc.provision_seed(&envelope_for(&HEX64.to_uppercase())).unwrap();
        assert_eq!(seed.as_hex(), HEX64);
    }

    #[test]
    fn from_config_wires_key_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let (priv_key, _) = keypair();
        let key_path = dir.path().join("private_key.pem");
        std::fs::write(&key_path, crypto::private_key_to_pem(priv_key).unwrap()).unwrap();

        let config = AuthConfig {
            private_key_path: key_path,
            seed_path: dir.path().join("seed.txt"),
            drift_window: 1,
        };
        let svc = AuthService::from_config(&config).unwrap();
        svc.provision_seed(&envelope_for(HEX64)).unwrap();
        assert!(svc.is_provisioned());
        assert!(dir.path().join("seed.txt").exists());
    }
}
