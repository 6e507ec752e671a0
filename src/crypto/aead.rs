/// AES-256-GCM wrapping for device seeds in transit.
///
/// Wire layout is `ciphertext ‖ tag ‖ nonce` — the 12-byte nonce trails the
/// AEAD output rather than leading it. Deployed clients parse exactly this
/// layout, so it must not change.
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{ByteError, Result};

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Encrypt `plaintext`, returning `ciphertext ‖ tag ‖ nonce`.
///
/// The nonce comes from the OS CSPRNG on every call. The wrapping key is
/// reused across wraps, so a deterministic nonce source must never be
/// substituted here.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| ByteError::KdfFailure)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut out = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| ByteError::AuthFailure)?;

    out.extend_from_slice(&nonce);

    Ok(out)
}

/// Decrypt a `ciphertext ‖ tag ‖ nonce` blob produced by [`seal`].
pub fn open(key: &[u8; KEY_LEN], wrapped: &[u8]) -> Result<Vec<u8>> {
    if wrapped.len() < NONCE_LEN {
        return Err(ByteError::InvalidCiphertext);
    }

    let (body, nonce) = wrapped.split_at(wrapped.len() - NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| ByteError::KdfFailure)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), body)
        .map_err(|_| ByteError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = [0x42; KEY_LEN];
        let plaintext = [0xAB; 32];

        let wrapped = seal(&key, &plaintext).unwrap();
        let opened = open(&key, &wrapped).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn wrapped_seed_is_sixty_bytes() {
        let wrapped = seal(&[0x42; KEY_LEN], &[0u8; 32]).unwrap();
        assert_eq!(wrapped.len(), 32 + TAG_LEN + NONCE_LEN);
    }

    #[test]
    fn nonce_is_fresh_per_seal() {
        let key = [0x42; KEY_LEN];
        let a = seal(&key, &[0u8; 32]).unwrap();
        let b = seal(&key, &[0u8; 32]).unwrap();
        assert_ne!(a[a.len() - NONCE_LEN..], b[b.len() - NONCE_LEN..]);
    }

    #[test]
    fn wrong_key_fails() {
        let wrapped = seal(&[0x42; KEY_LEN], &[0u8; 32]).unwrap();
        assert!(matches!(
            open(&[0x43; KEY_LEN], &wrapped),
            Err(ByteError::AuthFailure)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [0x42; KEY_LEN];
        let mut wrapped = seal(&key, &[0u8; 32]).unwrap();
        wrapped[0] ^= 0xFF;
        assert!(matches!(open(&key, &wrapped), Err(ByteError::AuthFailure)));
    }

    #[test]
    fn short_input_is_rejected_before_decryption() {
        assert!(matches!(
            open(&[0x42; KEY_LEN], &[0u8; NONCE_LEN - 1]),
            Err(ByteError::InvalidCiphertext)
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            open(&[0x42; KEY_LEN], &[]),
            Err(ByteError::InvalidCiphertext)
        ));
    }
}
