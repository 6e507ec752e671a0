/// 32-byte root seed material, zeroized when dropped.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ByteError, Result};

/// Length of every root seed in the key hierarchy.
pub const SEED_LEN: usize = 32;

/// A root seed. Both the server seed and per-device seeds use this type;
/// the raw bytes never appear on the wire except AES-GCM-wrapped or as the
/// base64 enrollment payload handed to a brand-new device.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn new(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != SEED_LEN {
            return None;
        }
        let mut bytes = [0u8; SEED_LEN];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Encoding used in enrollment payloads (QR code / config file).
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| ByteError::InvalidClientRootKey)?;
        Self::from_slice(&bytes).ok_or(ByteError::InvalidClientRootKey)
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_exact_length() {
        assert!(Seed::from_slice(&[0u8; 32]).is_some());
        assert!(Seed::from_slice(&[0u8; 16]).is_none());
        assert!(Seed::from_slice(&[0u8; 33]).is_none());
    }

    #[test]
    fn base64_roundtrip() {
        let seed = Seed::new([0xA5; 32]);
        let encoded = seed.to_base64();
        let decoded = Seed::from_base64(&encoded).unwrap();
        assert_eq!(decoded.as_bytes(), seed.as_bytes());
    }

    #[test]
    fn from_base64_rejects_wrong_length() {
        let short = BASE64.encode([0u8; 16]);
        assert!(matches!(
            Seed::from_base64(&short),
            Err(ByteError::InvalidClientRootKey)
        ));
        assert!(Seed::from_base64("not base64 !!!").is_err());
    }
}
