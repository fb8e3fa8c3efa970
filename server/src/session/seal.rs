//! Authenticated encryption of cookie payloads.
//!
//! Sealed values look like `v1.<base64url(nonce || ciphertext)>`.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use thiserror::Error;

pub const SEALED_PREFIX: &str = "v1.";
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("cookie key must be base64 encoding of 32 bytes")]
    InvalidKey,

    #[error("encryption failed")]
    Encrypt,

    #[error("sealed value is malformed")]
    Malformed,

    #[error("sealed value failed authentication")]
    Tampered,
}

#[derive(Clone)]
pub struct CookieSealer {
    cipher: ChaCha20Poly1305,
}

impl std::fmt::Debug for CookieSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CookieSealer(..)")
    }
}

impl CookieSealer {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    pub fn from_base64_key(encoded: &str) -> Result<Self, SealError> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|_| SealError::InvalidKey)?;
        let key: [u8; 32] = raw.try_into().map_err(|_| SealError::InvalidKey)?;
        Ok(Self::new(&key))
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<String, SealError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| SealError::Encrypt)?;

        let mut packed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        packed.extend_from_slice(&nonce);
        packed.extend_from_slice(&ciphertext);
        Ok(format!("{}{}", SEALED_PREFIX, URL_SAFE_NO_PAD.encode(packed)))
    }

    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, SealError> {
        let encoded = sealed
            .strip_prefix(SEALED_PREFIX)
            .ok_or(SealError::Malformed)?;
        let packed = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| SealError::Malformed)?;
        if packed.len() <= NONCE_LEN {
            return Err(SealError::Malformed);
        }

        let (nonce, ciphertext) = packed.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SealError::Tampered)
    }
}

pub fn is_sealed(value: &str) -> bool {
    value.starts_with(SEALED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealer() -> CookieSealer {
        CookieSealer::new(&[7u8; 32])
    }

    #[test]
    fn sealed_value_opens() {
        let s = sealer();
        let sealed = s.seal(b"{\"token\":\"t\"}").unwrap();
        assert!(is_sealed(&sealed));
        assert_eq!(s.open(&sealed).unwrap(), b"{\"token\":\"t\"}");
    }

    #[test]
    fn nonces_differ_between_seals() {
        let s = sealer();
        assert_ne!(s.seal(b"x").unwrap(), s.seal(b"x").unwrap());
    }

    #[test]
    fn other_key_cannot_open() {
        let sealed = sealer().seal(b"x").unwrap();
        let other = CookieSealer::new(&[8u8; 32]);
        assert!(matches!(other.open(&sealed), Err(SealError::Tampered)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(sealer().open("v1.!!"), Err(SealError::Malformed)));
        assert!(matches!(sealer().open("v1.AAAA"), Err(SealError::Malformed)));
        assert!(matches!(sealer().open("plain"), Err(SealError::Malformed)));
    }

    #[test]
    fn key_must_be_32_bytes() {
        assert!(CookieSealer::from_base64_key(&STANDARD.encode([1u8; 16])).is_err());
        assert!(CookieSealer::from_base64_key("not base64").is_err());
        assert!(CookieSealer::from_base64_key(&STANDARD.encode([1u8; 32])).is_ok());
    }
}
