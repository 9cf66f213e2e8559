//! Session key fingerprinting.
//!
//! Logged at startup so operators can confirm which cookie key is active
//! without exposing key material.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the SHA-256 of the signing key, lower-case hex.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use vote_backend::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_key_same_fingerprint() {
        let key = Key::derive_from(&[b'a'; 64]);
        assert_eq!(key_fingerprint(&key), key_fingerprint(&key.clone()));
    }

    #[rstest]
    fn distinct_keys_differ() {
        let fp1 = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        let fp2 = key_fingerprint(&Key::derive_from(&[b'b'; 64]));
        assert_ne!(fp1, fp2);
        assert!(fp1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
