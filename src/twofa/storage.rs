//! Durable single-slot storage for the current seed.
//!
//! The store is one logical cell behind an abstract trait: today a file
//! replaced via temp-write-then-rename, later a database row, without
//! changing the contract. Writers and readers may run concurrently; a
//! reader sees either the complete old value or the complete new value.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::twofa::types::{AuthError, AuthErrorKind, Seed};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Atomic single-cell seed storage.
pub trait SeedStore: Send + Sync {
    /// Durably replace the current seed. Atomic with respect to `get`.
    fn put(&self, seed: &Seed) -> Result<(), AuthError>;

    /// Read the current seed.
    ///
    /// Fails `NotProvisioned` if nothing was ever written; stored text
    /// is re-validated and corruption surfaces as `Internal`.
    fn get(&self) -> Result<Seed, AuthError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  File-backed implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// File-backed seed store.
///
/// Persists the seed as 64 lowercase hex characters plus a trailing
/// newline at a well-known path. `put` writes to a temp file in the
/// same directory and renames it over the destination, so the rename
/// is the commit point.
#[derive(Debug, Clone)]
pub struct FileSeedStore {
    path: PathBuf,
}

impl FileSeedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        // `parent()` yields an empty path for a bare file name.
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl SeedStore for FileSeedStore {
    fn put(&self, seed: &Seed) -> Result<(), AuthError> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir).map_err(|e| {
            AuthError::new(
                AuthErrorKind::Internal,
                format!("unable to create seed directory {}", dir.display()),
            )
            .with_detail(e.to_string())
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            AuthError::new(AuthErrorKind::Internal, "unable to create temp seed file")
                .with_detail(e.to_string())
        })?;
        tmp.write_all(seed.as_hex().as_bytes())
            .and_then(|_| tmp.write_all(b"\n"))
            .and_then(|_| tmp.flush())
            .map_err(|e| {
                AuthError::new(AuthErrorKind::Internal, "unable to write seed file")
                    .with_detail(e.to_string())
            })?;

        // The rename is what makes the replace atomic for readers.
        tmp.persist(&self.path).map_err(|e| {
            AuthError::new(AuthErrorKind::Internal, "unable to persist seed file")
                .with_detail(e.to_string())
        })?;
        Ok(())
    }

    fn get(&self) -> Result<Seed, AuthError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::new(
                    AuthErrorKind::NotProvisioned,
                    "seed not provisioned",
                ));
            }
            Err(e) => {
                return Err(AuthError::new(
                    AuthErrorKind::Internal,
                    "unable to read seed file",
                )
                .with_detail(e.to_string()));
            }
        };

        // Stored data that no longer matches the canonical format is
        // corruption, not caller input.
        Seed::parse(&text).map_err(|e| {
            AuthError::new(AuthErrorKind::Internal, "stored seed is corrupt")
                .with_detail(e.message)
        })
    }
}
