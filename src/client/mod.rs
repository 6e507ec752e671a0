/// Outbound RPC client.
///
/// Every call mints a fresh 30-second token and attaches the two auth
/// headers; tokens are deliberately never pooled or reused, so a leaked
/// one is worthless within half a minute.
use reqwest::header::{HeaderMap, HeaderValue};
use zeroize::Zeroizing;

use crate::config::ClientConfig;
use crate::crypto::chain::ClientChain;
use crate::crypto::seed::Seed;
use crate::error::{ByteError, Result};
use crate::server::routes::{CreateDeviceResponse, ListDevicesResponse};

pub struct ByteClient {
    http: reqwest::Client,
    base_url: String,
    chain: ClientChain,
}

/// A freshly invited device: its id plus the seed recovered from the
/// server's wrapped response. Everything a new install needs.
pub struct NewDevice {
    pub id: String,
    pub seed: Seed,
}

impl NewDevice {
    /// The enrollment payload to hand to the new device (QR code body).
    pub fn enrollment_config(&self, server_url: &str) -> ClientConfig {
        ClientConfig {
            server_url: server_url.to_string(),
            device_id: self.id.clone(),
            secret: self.seed.to_base64(),
        }
    }
}

impl ByteClient {
    pub fn new(server_url: &str, chain: ClientChain) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: server_url.trim_end_matches('/').to_string(),
            chain,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(&config.server_url, config.chain()?))
    }

    pub fn device_id(&self) -> &str {
        self.chain.device_id()
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.chain.mint_token_now()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ByteError::Token(e.to_string()))?,
        );
        headers.insert(
            "Device-ID",
            HeaderValue::from_str(self.chain.device_id())
                .map_err(|e| ByteError::Token(e.to_string()))?,
        );

        Ok(headers)
    }

    /// Invite a new device and recover its seed locally.
    pub async fn create_device(&self) -> Result<NewDevice> {
        let created: CreateDeviceResponse = self
            .http
            .post(format!("{}/api/devices", self.base_url))
            .headers(self.auth_headers()?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let wrapped = hex::decode(&created.encrypted_device_key)
            .map_err(|_| ByteError::InvalidCiphertext)?;

        let plaintext = Zeroizing::new(self.chain.unwrap_key(&wrapped)?);
        let seed = Seed::from_slice(&plaintext).ok_or(ByteError::InvalidClientRootKey)?;

        Ok(NewDevice {
            id: created.id,
            seed,
        })
    }

    pub async fn list_devices(&self) -> Result<Vec<String>> {
        let listed: ListDevicesResponse = self
            .http
            .get(format!("{}/api/devices", self.base_url))
            .headers(self.auth_headers()?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(listed.devices.into_iter().map(|d| d.id).collect())
    }

    pub async fn delete_device(&self, id: &str) -> Result<()> {
        self.http
            .delete(format!("{}/api/devices/{id}", self.base_url))
            .headers(self.auth_headers()?)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_ID: &str = "11111111-1111-4111-8111-111111111111";

    fn client() -> ByteClient {
        let chain = ClientChain::new(&[0x5A; 32], DEVICE_ID).unwrap();
        ByteClient::new("http://localhost:8080/", chain)
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(client().base_url, "http://localhost:8080");
    }

    #[test]
    fn auth_headers_carry_a_fresh_bearer_token_and_device_id() {
        let client = client();

        let headers = client.auth_headers().unwrap();
        let auth = headers.get("Authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("Bearer v4.local."));
        assert_eq!(
            headers.get("Device-ID").unwrap().to_str().unwrap(),
            DEVICE_ID
        );

        // a second call mints a different token
        let again = client.auth_headers().unwrap();
        assert_ne!(again.get("Authorization"), headers.get("Authorization"));
    }

    #[test]
    fn enrollment_config_carries_the_recovered_seed() {
        let new_device = NewDevice {
            id: DEVICE_ID.to_string(),
            seed: Seed::new([0x5A; 32]),
        };

        let config = new_device.enrollment_config("http://localhost:8080");
        assert_eq!(config.device_id, DEVICE_ID);
        assert_eq!(
            Seed::from_base64(&config.secret).unwrap().as_bytes(),
            &[0x5A; 32]
        );
    }
}
