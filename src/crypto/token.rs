/// PASETO v4.local request tokens.
///
/// A token is minted fresh for every outbound RPC and lives for 30 seconds.
/// The device id is bound as the implicit assertion, so a token stolen from
/// one device cannot be replayed under another device's id.
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use pasetors::{local, Local};

use crate::error::{ByteError, Result};

/// Tokens are minted per-request, so the expiration window only has to
/// cover clock skew plus transit time. Keeping it short is the replay
/// mitigation; there is no revocation list.
pub const TOKEN_TTL_SECS: i64 = 30;

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Mint a token with `iat = nbf = now` and `exp = now + 30s`, encrypted
/// under `key` with the device id as implicit assertion.
pub fn mint(key: &[u8; 32], device_id: &str, now: DateTime<Utc>) -> Result<String> {
    let key = SymmetricKey::<V4>::from(key.as_slice())
        .map_err(|e| ByteError::Token(e.to_string()))?;

    let mut claims = Claims::new().map_err(|e| ByteError::Token(e.to_string()))?;
    claims
        .issued_at(&rfc3339(now))
        .map_err(|e| ByteError::Token(e.to_string()))?;
    claims
        .not_before(&rfc3339(now))
        .map_err(|e| ByteError::Token(e.to_string()))?;
    claims
        .expiration(&rfc3339(now + Duration::seconds(TOKEN_TTL_SECS)))
        .map_err(|e| ByteError::Token(e.to_string()))?;

    local::encrypt(&key, &claims, None, Some(device_id.as_bytes()))
        .map_err(|e| ByteError::Token(e.to_string()))
}

/// Validate a token against the current time and the claimed device id.
///
/// Every failure mode — wrong key, tampered payload, mismatched device id,
/// expired or not-yet-valid claims — collapses into [`ByteError::AuthFailure`].
/// Time comparison is strict; there is no skew leeway.
pub fn validate(key: &[u8; 32], token: &str, device_id: &str) -> Result<()> {
    let key =
        SymmetricKey::<V4>::from(key.as_slice()).map_err(|_| ByteError::AuthFailure)?;

    let untrusted =
        UntrustedToken::<Local, V4>::try_from(token).map_err(|_| ByteError::AuthFailure)?;

    let rules = ClaimsValidationRules::new();

    local::decrypt(&key, &untrusted, &rules, None, Some(device_id.as_bytes()))
        .map_err(|_| ByteError::AuthFailure)?;

    Ok(())
}
