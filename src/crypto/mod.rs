/// Key hierarchy and token primitives.
///
/// Everything here is deterministic given the operator secret and a device
/// id, except the AES-GCM nonces in `aead` which come from the OS CSPRNG.
pub mod aead;
pub mod chain;
pub mod kdf;
pub mod seed;
pub mod token;
