use thiserror::Error;

use crate::crypto::chain::SERVER_INPUT_KEY_MIN_LEN;
use crate::crypto::seed::SEED_LEN;

#[derive(Error, Debug)]
pub enum ByteError {
    #[error("server input key must be at least {SERVER_INPUT_KEY_MIN_LEN} bytes")]
    InvalidServerInputKey,

    #[error("invalid device id: {0:?}")]
    InvalidDeviceId(String),

    #[error("client root key must be exactly {SEED_LEN} bytes")]
    InvalidClientRootKey,

    #[error("key derivation returned an unexpected output length")]
    KdfFailure,

    #[error("cannot mint tokens from a chain without a device id")]
    ServerChainHasNoToken,

    #[error("ciphertext shorter than the trailing nonce")]
    InvalidCiphertext,

    #[error("authentication failed")]
    AuthFailure,

    #[error("device is not registered")]
    DeviceUnknown,

    #[error("registry error: {0}")]
    Registry(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("token encoding failed: {0}")]
    Token(String),

    #[error("failed to encode host key: {0}")]
    HostKey(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ByteError>;
