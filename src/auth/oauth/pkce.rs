//! PKCE (RFC 7636) and request-binding parameters.
//!
//! Everything here is generated from the operating system's CSPRNG.
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::auth::oauth::{generate_code_challenge, PkceParams};
//!
//! let params = PkceParams::generate();
//! assert_eq!(params.code_verifier.len(), 43);
//! assert_eq!(params.code_challenge, generate_code_challenge(&params.code_verifier));
//! ```

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

/// Default nonce length.
pub const DEFAULT_NONCE_LENGTH: usize = 16;

const VERIFIER_BYTES: usize = 32;
const STATE_SUFFIX_LENGTH: usize = 12;
const LOWER_ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a code verifier: 32 random bytes, base64url without padding.
///
/// The result is always 43 characters from `A-Z a-z 0-9 - _`.
#[must_use]
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; VERIFIER_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Computes the S256 code challenge: `base64url_nopad(sha256(verifier))`.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generates a state value: wall-clock milliseconds followed by 12 random
/// lowercase alphanumerics.
#[must_use]
pub fn generate_state() -> String {
    let suffix: String = (0..STATE_SUFFIX_LENGTH)
        .map(|_| char::from(LOWER_ALPHANUMERIC[OsRng.gen_range(0..LOWER_ALPHANUMERIC.len())]))
        .collect();
    format!("{}{suffix}", chrono::Utc::now().timestamp_millis())
}

/// Generates a random alphanumeric nonce of `length` characters.
#[must_use]
pub fn generate_nonce(length: usize) -> String {
    Alphanumeric.sample_string(&mut OsRng, length)
}

/// The per-login values bound to one authorize request.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceParams {
    /// Secret kept by the client until the token exchange.
    pub code_verifier: String,
    /// S256 challenge sent on the authorize request.
    pub code_challenge: String,
    /// CSRF binding echoed back on the callback.
    pub state: String,
    /// Replay binding echoed back inside the ID token.
    pub nonce: String,
}

impl PkceParams {
    /// Generates a fresh set of parameters.
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        Self {
            code_verifier,
            code_challenge,
            state: generate_state(),
            nonce: generate_nonce(DEFAULT_NONCE_LENGTH),
        }
    }
}

impl fmt::Debug for PkceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceParams")
            .field("code_verifier", &"*****")
            .field("code_challenge", &self.code_challenge)
            .field("state", &self.state)
            .field("nonce", &self.nonce)
            .finish()
    }
}
