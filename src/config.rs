/// Configuration.
///
/// The server reads its settings from the environment. A device's own
/// credentials live in a JSON file whose payload is byte-for-byte the
/// enrollment payload (QR code body) the server emits, so scanning and
/// saving are the same format.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::chain::ClientChain;
use crate::crypto::seed::Seed;
use crate::error::{ByteError, Result};

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://byte.db";

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Operator secret the whole key hierarchy derives from. Must be at
    /// least 32 bytes.
    pub secret: String,
    /// SQLite URL for the device registry.
    pub database: String,
    /// Listen address for the API server.
    pub http_addr: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("secret", &"[REDACTED]")
            .field("database", &self.database)
            .field("http_addr", &self.http_addr)
            .finish()
    }
}

impl ServerConfig {
    /// Load from `BYTE_SECRET`, `BYTE_DATABASE`, `BYTE_HTTP_ADDR`.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("BYTE_SECRET")
            .map_err(|_| ByteError::Config("BYTE_SECRET environment variable required".into()))?;

        let database =
            std::env::var("BYTE_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());

        let http_addr =
            std::env::var("BYTE_HTTP_ADDR").unwrap_or_else(|_| DEFAULT_HTTP_ADDR.into());

        Ok(Self {
            secret,
            database,
            http_addr,
        })
    }

    /// Base URL clients should use to reach this server.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.http_addr)
    }
}

/// A device's stored credentials: where the server is, who the device is,
/// and its base64-encoded root seed.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub server_url: String,
    pub device_id: String,
    /// base64 of the 32-byte device seed
    pub secret: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("device_id", &self.device_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl ClientConfig {
    /// `$BYTE_CONFIG`, or `$HOME/.byte/config.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("BYTE_CONFIG") {
            return PathBuf::from(path);
        }

        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".byte").join("config.json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }

    /// Reconstruct this device's key chain from the stored credentials.
    pub fn chain(&self) -> Result<ClientChain> {
        let seed = Seed::from_base64(&self.secret)?;
        ClientChain::new(seed.as_bytes(), &self.device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientConfig {
        ClientConfig {
            server_url: "http://localhost:8080".into(),
            device_id: "11111111-1111-4111-8111-111111111111".into(),
            secret: Seed::new([0x5A; 32]).to_base64(),
        }
    }

    #[test]
    fn client_config_roundtrips_through_disk() {
        let path = std::env::temp_dir()
            .join(format!("byte-config-test-{}", std::process::id()))
            .join("config.json");

        let config = sample();
        config.save(&path).unwrap();
        let loaded = ClientConfig::load(&path).unwrap();

        assert_eq!(loaded.server_url, config.server_url);
        assert_eq!(loaded.device_id, config.device_id);
        assert_eq!(loaded.secret, config.secret);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn client_config_uses_enrollment_field_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"serverUrl\""));
        assert!(json.contains("\"deviceId\""));
        assert!(json.contains("\"secret\""));
    }

    #[test]
    fn chain_reconstructs_from_stored_secret() {
        let chain = sample().chain().unwrap();
        assert_eq!(chain.device_id(), "11111111-1111-4111-8111-111111111111");
        assert_eq!(chain.seed().as_bytes(), &[0x5A; 32]);
    }

    #[test]
    fn debug_never_prints_secrets() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&sample().secret));
    }
}
