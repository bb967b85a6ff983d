//! # PIN-based Authenticated Encryption
//!
//! Turns a short PIN into an AES-256-GCM key and seals opaque byte payloads.
//!
//! ## Scheme
//!
//! - **KDF**: PBKDF2-HMAC-SHA256, 100,000 rounds, 32-byte key
//! - **AEAD**: AES-256-GCM, no associated data
//! - **Salt**: 16 random bytes per encryption, stored in the frame header
//! - **Nonce**: 12 random bytes per encryption, prefixed to the AEAD output
//!
//! Because every encryption draws a fresh salt, the derived key differs per
//! call even for the same PIN, and the random nonce is never reused under a key.
//!
//! Decryption failures are deliberately collapsed into a single
//! [`CryptoError::Decryption`] value: a caller cannot tell a wrong PIN from a
//! truncated or tampered ciphertext.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;
/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Errors raised by the KDF/AEAD layer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encryption,

    /// Wrong PIN, corrupted ciphertext, or malformed input.
    #[error("decryption failed")]
    Decryption,
}

/// Output of [`encrypt`]: the KDF salt and `nonce || AEAD output`.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub salt: [u8; SALT_LEN],
    pub ciphertext: Vec<u8>,
}

/// Derive the AES-256 key for a PIN and salt.
pub fn derive_key(pin: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, PBKDF2_ROUNDS, &mut *key);
    key
}

/// Encrypt `plaintext` under a key derived from `pin` and a fresh random salt.
pub fn encrypt(plaintext: &[u8], pin: &str) -> Result<Sealed, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(pin, &salt);
    let cipher = Aes256Gcm::new_from_slice(&*key).map_err(|_| CryptoError::Encryption)?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    let mut ciphertext = Vec::with_capacity(NONCE_LEN + sealed.len());
    ciphertext.extend_from_slice(&nonce_bytes);
    ciphertext.extend_from_slice(&sealed);

    Ok(Sealed { salt, ciphertext })
}

/// Decrypt `nonce || AEAD output` with the key derived from `pin` and `salt`.
pub fn decrypt(salt: &[u8], ciphertext: &[u8], pin: &str) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Decryption);
    }
    let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);

    let key = derive_key(pin, salt);
    let cipher = Aes256Gcm::new_from_slice(&*key).map_err(|_| CryptoError::Decryption)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let sealed = encrypt(b"meet at dawn", "4821").unwrap();
        let plain = decrypt(&sealed.salt, &sealed.ciphertext, "4821").unwrap();
        assert_eq!(plain, b"meet at dawn");
    }

    #[test]
    fn test_ciphertext_layout() {
        let sealed = encrypt(b"abc", "0000").unwrap();
        // nonce + 3 bytes of plaintext + tag
        assert_eq!(sealed.ciphertext.len(), NONCE_LEN + 3 + TAG_LEN);
    }

    #[test]
    fn test_wrong_pin_fails() {
        let sealed = encrypt(b"secret", "1111").unwrap();
        let result = decrypt(&sealed.salt, &sealed.ciphertext, "2222");
        assert_eq!(result, Err(CryptoError::Decryption));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut sealed = encrypt(b"secret", "1111").unwrap();
        let last = sealed.ciphertext.len() - 1;
        sealed.ciphertext[last] ^= 0x01;
        assert_eq!(
            decrypt(&sealed.salt, &sealed.ciphertext, "1111"),
            Err(CryptoError::Decryption)
        );
    }

    #[test]
    fn test_short_ciphertext_fails() {
        assert_eq!(
            decrypt(&[0u8; SALT_LEN], &[0u8; 10], "1111"),
            Err(CryptoError::Decryption)
        );
    }

    #[test]
    fn test_fresh_salt_and_nonce_per_call() {
        let a = encrypt(b"same", "1234").unwrap();
        let b = encrypt(b"same", "1234").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.ciphertext[..NONCE_LEN], b.ciphertext[..NONCE_LEN]);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [7u8; SALT_LEN];
        assert_eq!(*derive_key("1234", &salt), *derive_key("1234", &salt));
        assert_ne!(*derive_key("1234", &salt), *derive_key("1235", &salt));
    }
}
