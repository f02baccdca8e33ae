//! Cryptographic helpers for the OAuth state round-trip.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a state nonce.
const NONCE_BYTES: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a URL-safe random nonce.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Produces a signed OAuth state value of the form `nonce.signature`.
pub fn sign_state(secret: &str, nonce: &str) -> String {
    format!("{}.{}", nonce, state_signature(secret, nonce))
}

/// Verifies a signed state value and returns its nonce.
///
/// Signature comparison is constant-time.
pub fn verify_state<'a>(secret: &str, state: &'a str) -> Option<&'a str> {
    let (nonce, signature) = state.rsplit_once('.')?;
    if nonce.is_empty() {
        return None;
    }
    let expected = hex::decode(signature).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(nonce.as_bytes());
    mac.verify_slice(&expected).ok()?;

    Some(nonce)
}

fn state_signature(secret: &str, nonce: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(nonce.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
