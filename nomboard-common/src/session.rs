//! Shared-password session gate
//!
//! # Architecture
//!
//! - One process-wide secret (the operator password)
//! - `authenticate` exchanges a credential for a session token
//! - `verify` checks a token presented later (cookie value)
//! - The token is the secret itself; expiry is carried by the cookie max-age
//!
//! Failed authentication sleeps a fixed delay before returning, and a missing
//! credential is treated exactly like a wrong one.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies. Cookie handling and middleware live in
//! nomboard-dash.

use sha2::{Digest, Sha256};
use std::time::Duration;

/// Cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Session lifetime, enforced through cookie max-age (4 hours)
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 4);

/// Delay applied to every failed authentication attempt
pub const DEFAULT_FAILURE_DELAY: Duration = Duration::from_millis(100);

// ========================================
// Error Types
// ========================================

/// Authentication failure
///
/// Carries no detail: a missing credential and a wrong one look the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthFailure;

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid credential")
    }
}

impl std::error::Error for AuthFailure {}

// ========================================
// Session Token
// ========================================

/// Opaque session marker returned by a successful login
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Cookie value to hand to the client
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(**redacted**)")
    }
}

// ========================================
// Session Gate
// ========================================

/// Validates credentials and session tokens against the shared secret
#[derive(Clone)]
pub struct SessionGate {
    secret: String,
    failure_delay: Duration,
}

impl SessionGate {
    /// Create gate with the default failure delay
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_failure_delay(secret, DEFAULT_FAILURE_DELAY)
    }

    /// Create gate with a custom failure delay
    pub fn with_failure_delay(secret: impl Into<String>, failure_delay: Duration) -> Self {
        Self {
            secret: secret.into(),
            failure_delay,
        }
    }

    /// Delay applied before any failure is reported
    pub fn failure_delay(&self) -> Duration {
        self.failure_delay
    }

    /// Exchange a credential for a session token
    ///
    /// On mismatch (or no credential at all) sleeps `failure_delay` and
    /// returns `AuthFailure`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nomboard_common::session::SessionGate;
    /// use std::time::Duration;
    ///
    /// # tokio_test_block(async {
    /// let gate = SessionGate::with_failure_delay("hunter2", Duration::ZERO);
    /// let token = gate.authenticate(Some("hunter2")).await.unwrap();
    /// assert!(gate.verify(Some(token.as_str())));
    /// assert!(gate.authenticate(Some("guess")).await.is_err());
    /// # });
    /// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
    /// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
    /// # }
    /// ```
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<SessionToken, AuthFailure> {
        if self.matches(credential) {
            return Ok(SessionToken(self.secret.clone()));
        }

        self.reject_delay().await;
        Err(AuthFailure)
    }

    /// Check a session token presented by a client
    ///
    /// Same equality test as `authenticate`, without the delay.
    pub fn verify(&self, token: Option<&str>) -> bool {
        self.matches(token)
    }

    /// Sleep the fixed failure delay
    ///
    /// Used by HTTP layers for rejections that never reach `authenticate`
    /// (malformed login bodies, protected-route rejections).
    pub async fn reject_delay(&self) {
        if !self.failure_delay.is_zero() {
            tokio::time::sleep(self.failure_delay).await;
        }
    }

    fn matches(&self, candidate: Option<&str>) -> bool {
        // Compare digests so the comparison time depends on neither the
        // candidate's length nor its longest common prefix with the secret.
        let candidate = candidate.unwrap_or_default();
        let ok = constant_time_eq(&digest(candidate), &digest(&self.secret));
        ok && !self.secret.is_empty()
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("secret", &"**redacted**")
            .field("failure_delay", &self.failure_delay)
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

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

// ========================================
// Tests
// ========================================
