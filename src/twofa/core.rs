//! Core OTP generation — RFC 4226 (HOTP) and RFC 6238 (TOTP).
//!
//! HMAC-SHA1 only, 6-digit codes, 30-second time steps. The HMAC key is
//! the 32 raw bytes decoded from the seed's hex text, never the hex
//! characters themselves.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::twofa::types::{Seed, VerifyResult};

/// TOTP time step in seconds.
pub const PERIOD_SECS: u64 = 30;
/// Number of digits in a generated code.
pub const CODE_DIGITS: u32 = 6;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Raw HMAC-OTP (RFC 4226 §5.3)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute an HOTP code for the given raw key bytes and counter.
pub fn hotp(key: &[u8], counter: u64) -> String {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();
    truncate(&digest)
}

/// Dynamic truncation per RFC 4226 §5.3: pick a 31-bit big-endian
/// integer at the offset named by the digest's last nibble.
fn truncate(digest: &[u8]) -> String {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);
    let code = binary % 10u32.pow(CODE_DIGITS);
    format!("{:0>width$}", code, width = CODE_DIGITS as usize)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Time steps (RFC 6238)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute the time-step counter for a given unix timestamp.
pub fn time_step_at(unix_seconds: u64) -> u64 {
    unix_seconds / PERIOD_SECS
}

/// Seconds remaining until the time step at `unix_seconds` expires.
pub fn seconds_remaining_at(unix_seconds: u64) -> u32 {
    (PERIOD_SECS - (unix_seconds % PERIOD_SECS)) as u32
}

/// Current unix timestamp in seconds.
pub fn current_unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generate the TOTP code for a seed at an explicit unix timestamp.
pub fn generate_at(seed: &Seed, unix_seconds: u64) -> String {
    hotp(&seed.key_bytes(), time_step_at(unix_seconds))
}

/// Generate the TOTP code for a seed at the current time.
pub fn generate(seed: &Seed) -> String {
    generate_at(seed, current_unix_time())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Verification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Verify a candidate code against a seed at an explicit timestamp.
///
/// `drift_window` names how many time steps to check on either side of
/// the current one (e.g. 1 checks -1, 0, +1). A candidate that is not
/// exactly six ASCII digits after trimming is simply not valid; it
/// never raises.
pub fn verify_at(seed: &Seed, candidate: &str, drift_window: u32, unix_seconds: u64) -> VerifyResult {
    let candidate = candidate.trim();
    if candidate.len() != CODE_DIGITS as usize
        || !candidate.chars().all(|c| c.is_ascii_digit())
    {
        return VerifyResult::no_match();
    }

    let key = seed.key_bytes();
    let base_step = time_step_at(unix_seconds);
    let start = base_step.saturating_sub(drift_window as u64);
    let end = base_step + drift_window as u64;

    for step in start..=end {
        let generated = hotp(&key, step);
        if constant_time_eq(generated.as_bytes(), candidate.as_bytes()) {
            return VerifyResult {
                valid: true,
                drift: step as i64 - base_step as i64,
            };
        }
    }

    VerifyResult::no_match()
}

/// Verify a candidate code at the current time.
pub fn verify(seed: &Seed, candidate: &str, drift_window: u32) -> VerifyResult {
    verify_at(seed, candidate, drift_window, current_unix_time())
}

/// Constant-time comparison (to prevent timing attacks on code verification).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
